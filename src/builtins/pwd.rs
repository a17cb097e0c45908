use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::process::{StageReader, StageWriter};

use super::{BuiltinCommand, BuiltinError};

#[derive(Default)]
pub struct Pwd;

#[async_trait]
impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    async fn execute(
        &self,
        _args: &[String],
        _stdin: &mut StageReader,
        stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError> {
        let cwd = std::env::current_dir()?;

        stdout
            .write_all(format!("{}\n", cwd.to_string_lossy()).as_bytes())
            .await?;

        Ok(())
    }
}
