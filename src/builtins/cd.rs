use async_trait::async_trait;

use crate::process::{StageReader, StageWriter};

use super::{BuiltinCommand, BuiltinError};

#[derive(Default)]
pub struct Cd;

#[async_trait]
impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn changes_shell(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        args: &[String],
        _stdin: &mut StageReader,
        _stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError> {
        let path = args
            .first()
            .ok_or_else(|| BuiltinError::Usage("cd: missing path".into()))?;

        trace!("cd: {path:?}");

        std::env::set_current_dir(path).map_err(|err| {
            error!("failed to cd: {}", err);
            BuiltinError::Failed(format!("cd: {path}: {err}"))
        })
    }
}
