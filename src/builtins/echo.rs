use async_trait::async_trait;
use itertools::Itertools;
use tokio::io::AsyncWriteExt;

use crate::process::{StageReader, StageWriter};

use super::{BuiltinCommand, BuiltinError};

#[derive(Default)]
pub struct Echo;

#[async_trait]
impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn execute(
        &self,
        args: &[String],
        _stdin: &mut StageReader,
        stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError> {
        let line = format!("{}\n", args.iter().join(" "));

        stdout.write_all(line.as_bytes()).await?;

        Ok(())
    }
}
