use std::{io, sync::Arc};

use tokio::{
    io::AsyncWriteExt,
    process::{Child, Command},
    task::JoinHandle,
};

use crate::builtins::{BuiltinError, BuiltinRegistry};

use super::{
    pipe::{StageInput, StageOutput},
    read::StageReader,
    status::StageExit,
    write::StageWriter,
};

pub enum StageChild {
    Process(Child),
    Builtin(JoinHandle<Result<(), BuiltinError>>),
}

impl From<Child> for StageChild {
    fn from(value: Child) -> Self {
        Self::Process(value)
    }
}

impl StageChild {
    pub fn spawn_process(
        args: &[String],
        input: StageInput,
        output: StageOutput,
    ) -> io::Result<Self> {
        let mut cmd = Command::new(&args[0]);
        cmd.args(&args[1..])
            .stdin(input.into_stdio())
            .stdout(output.into_stdio())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true);

        trace!("spawning command: {:?}", cmd);

        // `cmd` holds the parent's copies of the endpoints until it is dropped
        // at the end of this function.
        cmd.spawn().map(Into::into)
    }

    pub fn spawn_builtin(
        registry: Arc<dyn BuiltinRegistry>,
        args: Vec<String>,
        input: StageInput,
        output: StageOutput,
    ) -> Self {
        trace!("spawning builtin: {args:?}");

        let mut stdin = input.into_reader();
        let mut stdout = output.into_writer();

        Self::Builtin(tokio::task::spawn(async move {
            invoke_builtin(registry.as_ref(), &args, &mut stdin, &mut stdout).await
        }))
    }

    /// Stands in for a builtin that must not run outside the fast path.
    pub fn refuse_builtin(name: &str) -> Self {
        trace!("refusing builtin {name} in a pipeline");

        let err = BuiltinError::NotInPipeline(name.to_owned());
        Self::Builtin(tokio::task::spawn(async move { Err(err) }))
    }

    pub fn id(&self) -> Option<u32> {
        match self {
            Self::Process(process) => process.id(),
            Self::Builtin(_) => None,
        }
    }

    pub async fn wait(&mut self) -> io::Result<StageExit> {
        match self {
            Self::Process(process) => process.wait().await.map(Into::into),
            Self::Builtin(handle) => match handle.await {
                Ok(result) => Ok(result.into()),
                Err(err) if err.is_cancelled() => Ok(StageExit::Killed),
                Err(err) => Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("builtin panicked: {err}"),
                )),
            },
        }
    }

    pub async fn kill(&mut self) -> io::Result<()> {
        match self {
            Self::Process(process) => process.kill().await,
            Self::Builtin(handle) => {
                handle.abort();
                // the task drops its streams once the abort lands
                let _ = handle.await;
                Ok(())
            }
        }
    }
}

/// Runs a builtin to completion and flushes whatever it wrote, so nothing is
/// left buffered when the streams are closed.
pub async fn invoke_builtin(
    registry: &dyn BuiltinRegistry,
    args: &[String],
    stdin: &mut StageReader,
    stdout: &mut StageWriter,
) -> Result<(), BuiltinError> {
    let result = registry.invoke(args, stdin, stdout).await;
    let flushed = stdout.flush().await;

    result?;
    flushed.map_err(Into::into)
}
