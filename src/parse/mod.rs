use std::str::FromStr;

use strum::{Display, EnumString};
use thiserror::Error;

pub use self::{
    expand::expand_env,
    stage::{Pipeline, Stage},
};

pub mod expand;
pub mod stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Redirect {
    #[strum(serialize = "<")]
    Read,
    #[strum(serialize = ">")]
    Write,
    #[strum(serialize = ">>")]
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty stage in pipeline")]
    EmptyStage,
    #[error("empty command")]
    EmptyCommand,
    #[error("redirect {0} requires filename")]
    MissingTarget(Redirect),
}

/// Splits `line` on `|` and parses every segment into a [`Stage`].
///
/// Tokens are separated by whitespace only; there is no quoting, so a `|`
/// anywhere in the line always starts a new stage.
pub fn parse_pipeline(line: &str) -> Result<Pipeline, ParseError> {
    let stages = line
        .split('|')
        .map(parse_stage)
        .collect::<Result<Vec<_>, _>>()?;

    Pipeline::new(stages)
}

fn parse_stage(segment: &str) -> Result<Stage, ParseError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(ParseError::EmptyStage);
    }

    let mut arguments = Vec::new();
    let mut input_file = None;
    let mut output_file = None;

    let mut tokens = segment.split_whitespace();
    while let Some(token) = tokens.next() {
        let Ok(redirect) = token.parse::<Redirect>() else {
            arguments.push(token.to_owned());
            continue;
        };

        let target = tokens.next().ok_or(ParseError::MissingTarget(redirect))?;
        match redirect {
            Redirect::Read => input_file = Some(target),
            Redirect::Write => output_file = Some((target, false)),
            Redirect::Append => output_file = Some((target, true)),
        }
    }

    let mut stage = Stage::new(arguments)?;
    if let Some(path) = input_file {
        stage = stage.with_input(path);
    }
    if let Some((path, append)) = output_file {
        stage = stage.with_output(path, append);
    }

    Ok(stage)
}

impl FromStr for Pipeline {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pipeline(s)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::*;

    fn arguments(pipeline: &Pipeline) -> Vec<Vec<&str>> {
        pipeline
            .stages()
            .iter()
            .map(|stage| stage.arguments().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn splits_stages_on_pipe() {
        let pipeline = parse_pipeline("a | b | c").unwrap();

        assert_eq!(arguments(&pipeline), vec![vec!["a"], vec!["b"], vec!["c"]]);
        assert!(pipeline.stages().iter().all(|stage| !stage.is_redirected()));
    }

    #[test]
    fn keeps_arguments_in_order() {
        let pipeline = parse_pipeline("  grep -v   foo  | wc -l ").unwrap();

        assert_eq!(
            arguments(&pipeline),
            vec![vec!["grep", "-v", "foo"], vec!["wc", "-l"]]
        );
    }

    #[test]
    fn output_truncates_by_default() {
        let pipeline = parse_pipeline("cmd > out.txt").unwrap();
        let stage = &pipeline.stages()[0];

        assert_eq!(stage.output_file(), Some(Path::new("out.txt")));
        assert!(!stage.append_output());
    }

    #[test]
    fn double_angle_appends() {
        let pipeline = parse_pipeline("cmd >> out.txt").unwrap();
        let stage = &pipeline.stages()[0];

        assert_eq!(stage.output_file(), Some(Path::new("out.txt")));
        assert!(stage.append_output());
    }

    #[test]
    fn input_redirect_anywhere_in_stage() {
        let pipeline = parse_pipeline("sort < in.txt -r").unwrap();
        let stage = &pipeline.stages()[0];

        assert_eq!(stage.arguments(), ["sort", "-r"]);
        assert_eq!(stage.input_file(), Some(Path::new("in.txt")));
    }

    #[test]
    fn last_redirect_wins() {
        let pipeline = parse_pipeline("cmd >> a.txt > b.txt < x < y").unwrap();
        let stage = &pipeline.stages()[0];

        assert_eq!(stage.output_file(), Some(Path::new("b.txt")));
        assert!(!stage.append_output());
        assert_eq!(stage.input_file(), Some(Path::new("y")));
    }

    #[test]
    fn operators_glued_to_words_are_arguments() {
        let pipeline = parse_pipeline("echo a>b").unwrap();

        assert_eq!(pipeline.stages()[0].arguments(), ["echo", "a>b"]);
        assert!(!pipeline.stages()[0].is_redirected());
    }

    #[rstest]
    #[case("cmd <", ParseError::MissingTarget(Redirect::Read))]
    #[case("cmd >", ParseError::MissingTarget(Redirect::Write))]
    #[case("cmd >>", ParseError::MissingTarget(Redirect::Append))]
    #[case("a | | b", ParseError::EmptyStage)]
    #[case("a |", ParseError::EmptyStage)]
    #[case("", ParseError::EmptyStage)]
    #[case("   ", ParseError::EmptyStage)]
    #[case("> out.txt", ParseError::EmptyCommand)]
    #[case("a | < in.txt", ParseError::EmptyCommand)]
    fn rejects_malformed_pipelines(#[case] line: &str, #[case] expected: ParseError) {
        assert_eq!(parse_pipeline(line), Err(expected));
    }

    #[test]
    fn error_messages_name_the_operator() {
        assert_eq!(
            ParseError::MissingTarget(Redirect::Read).to_string(),
            "redirect < requires filename"
        );
        assert_eq!(
            ParseError::MissingTarget(Redirect::Append).to_string(),
            "redirect >> requires filename"
        );
    }

    #[test]
    fn from_str_matches_parse_pipeline() {
        let parsed: Pipeline = "ls -l | wc".parse().unwrap();

        assert_eq!(parsed, parse_pipeline("ls -l | wc").unwrap());
    }
}
