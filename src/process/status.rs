use std::{io, process::ExitStatus};

use thiserror::Error;

use crate::builtins::BuiltinError;

#[derive(Debug)]
pub enum StageExit {
    Process(ExitStatus),
    Builtin(Result<(), BuiltinError>),
    /// Stopped by the executor before it finished on its own.
    Killed,
}

impl From<ExitStatus> for StageExit {
    fn from(value: ExitStatus) -> Self {
        Self::Process(value)
    }
}

impl From<Result<(), BuiltinError>> for StageExit {
    fn from(value: Result<(), BuiltinError>) -> Self {
        Self::Builtin(value)
    }
}

impl StageExit {
    pub fn success(&self) -> bool {
        match self {
            Self::Process(status) => status.success(),
            Self::Builtin(result) => result.is_ok(),
            Self::Killed => false,
        }
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Process(status) => status.code(),
            Self::Builtin(Ok(())) => Some(0),
            Self::Builtin(Err(_)) => Some(1),
            Self::Killed => None,
        }
    }

    pub fn into_failure(self) -> Option<StageFailure> {
        if self.success() {
            return None;
        }

        match self {
            Self::Process(status) => Some(StageFailure::Exit(status)),
            Self::Builtin(result) => result.err().map(StageFailure::Builtin),
            Self::Killed => Some(StageFailure::Killed),
        }
    }
}

#[derive(Debug, Error)]
pub enum StageFailure {
    #[error("{0}")]
    Exit(ExitStatus),
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error("killed")]
    Killed,
    #[error("lost track of stage: {0}")]
    Lost(#[source] io::Error),
}
