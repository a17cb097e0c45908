use async_trait::async_trait;
use nix::{
    sys::signal::{kill, Signal},
    unistd::Pid,
};

use crate::process::{StageReader, StageWriter};

use super::{BuiltinCommand, BuiltinError};

#[derive(Default)]
pub struct Kill;

#[async_trait]
impl BuiltinCommand for Kill {
    fn name(&self) -> &'static str {
        "kill"
    }

    async fn execute(
        &self,
        args: &[String],
        _stdin: &mut StageReader,
        _stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError> {
        let pid = args
            .first()
            .ok_or_else(|| BuiltinError::Usage("kill: missing pid".into()))?;

        let pid = pid
            .parse::<i32>()
            .map_err(|err| BuiltinError::Usage(format!("kill: invalid pid: {err}")))?;

        trace!("sending SIGTERM to {pid}");

        kill(Pid::from_raw(pid), Signal::SIGTERM)?;

        Ok(())
    }
}
