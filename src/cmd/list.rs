use thiserror::Error;

use crate::{
    cancel::CancelToken,
    parse::{parse_pipeline, ParseError},
    process::StageFailure,
};

use super::execute::{ExecError, Executor};

#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl ListError {
    // a plain non-zero exit was already reported by the command itself
    pub fn is_quiet(&self) -> bool {
        matches!(
            self,
            Self::Exec(ExecError::Failed {
                reason: StageFailure::Exit(_),
                ..
            })
        )
    }
}

/// A line split into `||` alternatives, each a sequence of `&&`-joined
/// pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandList {
    alternatives: Vec<Vec<String>>,
}

impl CommandList {
    pub fn parse(line: &str) -> Self {
        let alternatives = line
            .split("||")
            .map(|alternative| {
                alternative
                    .split("&&")
                    .map(str::trim)
                    .filter(|pipeline| !pipeline.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .collect();

        Self { alternatives }
    }

    pub fn alternatives(&self) -> &[Vec<String>] {
        &self.alternatives
    }

    pub async fn execute<F>(&self, executor: &Executor, mut report: F) -> bool
    where
        F: FnMut(&ListError),
    {
        for alternative in &self.alternatives {
            let mut ok = true;

            for source in alternative {
                trace!("running pipeline: {source:?}");

                if let Err(err) = run_pipeline(executor, source).await {
                    debug!("pipeline {source:?} failed: {err}");
                    report(&err);
                    ok = false;
                    break;
                }
            }

            if ok {
                return true;
            }
        }

        false
    }
}

async fn run_pipeline(executor: &Executor, source: &str) -> Result<(), ListError> {
    let pipeline = parse_pipeline(source)?;

    let cancel = CancelToken::new();
    let _interrupt = cancel
        .cancel_on_interrupt()
        .map_err(|err| warn!("cannot listen for interrupts: {err}"))
        .ok();

    executor.run(pipeline, &cancel).await?;

    Ok(())
}
