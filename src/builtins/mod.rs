use std::io;

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::process::{StageReader, StageWriter};

pub mod cd;
pub mod echo;
pub mod kill;
pub mod ps;
pub mod pwd;

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Failed(String),
    #[error("kill: {0}")]
    Signal(#[from] nix::Error),
    #[error("unknown builtin: {0}")]
    Unknown(String),
    #[error("{0}: only runs on its own")]
    NotInPipeline(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[async_trait]
#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn changes_shell(&self) -> bool {
        false
    }
    async fn execute(
        &self,
        args: &[String],
        stdin: &mut StageReader,
        stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError>;
}

#[enum_dispatch]
#[derive(EnumIter)]
pub enum BuiltinCommands {
    Cd(cd::Cd),
    Pwd(pwd::Pwd),
    Echo(echo::Echo),
    Kill(kill::Kill),
    Ps(ps::Ps),
}

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }
}

/// What the executor needs to know about builtins: which names are builtins
/// and how to run one against a pair of streams.
#[async_trait]
pub trait BuiltinRegistry: Send + Sync {
    fn is_builtin(&self, name: &str) -> bool;

    /// Builtins that act on the shell itself only run on their own. Inside a
    /// pipeline or behind a redirection they fail without doing anything.
    fn runs_in_pipeline(&self, _name: &str) -> bool {
        true
    }

    // args[0] is the builtin's name
    async fn invoke(
        &self,
        args: &[String],
        stdin: &mut StageReader,
        stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Builtins;

#[async_trait]
impl BuiltinRegistry for Builtins {
    fn is_builtin(&self, name: &str) -> bool {
        BuiltinCommands::from_name(name).is_some()
    }

    fn runs_in_pipeline(&self, name: &str) -> bool {
        BuiltinCommands::from_name(name).is_some_and(|cmd| !cmd.changes_shell())
    }

    async fn invoke(
        &self,
        args: &[String],
        stdin: &mut StageReader,
        stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError> {
        let (name, args) = args
            .split_first()
            .ok_or_else(|| BuiltinError::Unknown(String::new()))?;

        let cmd =
            BuiltinCommands::from_name(name).ok_or_else(|| BuiltinError::Unknown(name.clone()))?;

        trace!("executing {} builtin: {args:?}", cmd.name());

        cmd.execute(args, stdin, stdout).await
    }
}
