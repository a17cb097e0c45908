use std::path::{Path, PathBuf};

use super::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    arguments: Vec<String>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    append_output: bool,
}

impl Stage {
    pub fn new(arguments: Vec<String>) -> Result<Self, ParseError> {
        if arguments.is_empty() {
            return Err(ParseError::EmptyCommand);
        }

        Ok(Self {
            arguments,
            input_file: None,
            output_file: None,
            append_output: false,
        })
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>, append: bool) -> Self {
        self.output_file = Some(path.into());
        self.append_output = append;
        self
    }

    pub fn command(&self) -> &str {
        &self.arguments[0]
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn input_file(&self) -> Option<&Path> {
        self.input_file.as_deref()
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn append_output(&self) -> bool {
        self.append_output
    }

    pub fn is_redirected(&self) -> bool {
        self.input_file.is_some() || self.output_file.is_some()
    }
}

/// Stages connected left to right. Only the first stage's input file and the
/// last stage's output file are honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Result<Self, ParseError> {
        if stages.is_empty() {
            return Err(ParseError::EmptyStage);
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }
}
