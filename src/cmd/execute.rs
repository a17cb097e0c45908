use std::{io, path::Path, sync::Arc};

use thiserror::Error;
use tokio::{fs::OpenOptions, select, task::JoinHandle};

use crate::{
    builtins::{BuiltinRegistry, Builtins},
    cancel::CancelToken,
    parse::{Pipeline, Stage},
    process::{
        child::invoke_builtin, Pipe, StageChild, StageExit, StageFailure, StageInput,
        StageOutput, StageReader, StageWriter,
    },
};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{command}: {source}")]
    Start {
        stage: usize,
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command}: {reason}")]
    Failed {
        stage: usize,
        command: String,
        #[source]
        reason: StageFailure,
    },
    #[error("interrupted")]
    Cancelled,
}

impl ExecError {
    fn start(stage: usize, command: &str) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Start {
            stage,
            command: command.to_owned(),
            source,
        }
    }
}

pub struct Executor {
    builtins: Arc<dyn BuiltinRegistry>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Arc::new(Builtins))
    }
}

impl Executor {
    pub fn new(builtins: Arc<dyn BuiltinRegistry>) -> Self {
        Self { builtins }
    }

    /// Runs every stage of `pipeline` concurrently and reports the first
    /// failure in stage order. Firing `cancel` kills whatever is still running
    /// and makes the result [`ExecError::Cancelled`].
    pub async fn run(&self, pipeline: Pipeline, cancel: &CancelToken) -> Result<(), ExecError> {
        if cancel.is_cancelled() {
            debug!("token already cancelled, not starting anything");
            return Err(ExecError::Cancelled);
        }

        let stages = pipeline.into_stages();

        if let [stage] = stages.as_slice() {
            if !stage.is_redirected() && self.builtins.is_builtin(stage.command()) {
                return self.run_direct(stage, cancel).await;
            }
        }

        let endpoints = wire(&stages).await?;
        let halt = CancelToken::new();

        let mut waiters = Vec::with_capacity(stages.len());
        let mut failure = None;

        for (index, (stage, (input, output))) in stages.iter().zip(endpoints).enumerate() {
            match self.start(stage, input, output) {
                Ok(child) => {
                    debug!(stage = index, pid = ?child.id(), "started {}", stage.command());
                    waiters.push(Waiter::watch(index, stage, child, halt.clone()));
                }
                Err(source) => {
                    failure = Some(ExecError::start(index, stage.command())(source));
                    break;
                }
            }
        }

        // every endpoint the loop did not hand out is closed by now
        if let Some(err) = failure {
            warn!("pipeline failed to start: {err}");
            halt.cancel();
            wait_all(&mut waiters).await;
            return Err(err);
        }

        let cancelled = select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = wait_all(&mut waiters) => false,
        };

        if cancelled {
            debug!("pipeline cancelled, killing {} stages", waiters.len());
            halt.cancel();
            wait_all(&mut waiters).await;
            return Err(ExecError::Cancelled);
        }

        waiters.into_iter().try_for_each(Waiter::into_result)
    }

    async fn run_direct(&self, stage: &Stage, cancel: &CancelToken) -> Result<(), ExecError> {
        trace!("running {} directly", stage.command());

        let mut stdin = StageReader::stdin();
        let mut stdout = StageWriter::stdout();

        let result = select! {
            biased;
            _ = cancel.cancelled() => None,
            result = invoke_builtin(self.builtins.as_ref(), stage.arguments(), &mut stdin, &mut stdout) => Some(result),
        };

        match result {
            None => Err(ExecError::Cancelled),
            Some(Ok(())) => Ok(()),
            Some(Err(err)) => Err(ExecError::Failed {
                stage: 0,
                command: stage.command().to_owned(),
                reason: err.into(),
            }),
        }
    }

    fn start(
        &self,
        stage: &Stage,
        input: StageInput,
        output: StageOutput,
    ) -> io::Result<StageChild> {
        if self.builtins.is_builtin(stage.command()) {
            if !self.builtins.runs_in_pipeline(stage.command()) {
                return Ok(StageChild::refuse_builtin(stage.command()));
            }

            Ok(StageChild::spawn_builtin(
                self.builtins.clone(),
                stage.arguments().to_vec(),
                input,
                output,
            ))
        } else {
            StageChild::spawn_process(stage.arguments(), input, output)
        }
    }
}

async fn wire(stages: &[Stage]) -> Result<Vec<(StageInput, StageOutput)>, ExecError> {
    let first = &stages[0];
    let last = &stages[stages.len() - 1];

    let input = match first.input_file() {
        Some(path) => StageInput::File(
            open_input(path)
                .await
                .map_err(ExecError::start(0, first.command()))?,
        ),
        None => StageInput::Inherit,
    };

    let mut inputs = vec![input];
    let mut outputs = Vec::with_capacity(stages.len());

    for (index, stage) in stages[..stages.len() - 1].iter().enumerate() {
        let (output, input) = Pipe::new()
            .map_err(ExecError::start(index, stage.command()))?
            .split();
        outputs.push(output);
        inputs.push(input);
    }

    let output = match last.output_file() {
        Some(path) => StageOutput::File(
            open_output(path, last.append_output())
                .await
                .map_err(ExecError::start(stages.len() - 1, last.command()))?,
        ),
        None => StageOutput::Inherit,
    };
    outputs.push(output);

    Ok(inputs.into_iter().zip(outputs).collect())
}

async fn open_input(path: &Path) -> io::Result<std::fs::File> {
    trace!("opening {path:?} for reading");

    let file = OpenOptions::new().read(true).open(path).await?;
    Ok(file.into_std().await)
}

async fn open_output(path: &Path, append: bool) -> io::Result<std::fs::File> {
    trace!(append, "opening {path:?} for writing");

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .await?;
    Ok(file.into_std().await)
}

// The watch task owns the child and kills it when `halt` fires first.
struct Waiter {
    stage: usize,
    command: String,
    handle: JoinHandle<io::Result<StageExit>>,
    exit: Option<io::Result<StageExit>>,
}

impl Waiter {
    fn watch(index: usize, stage: &Stage, mut child: StageChild, halt: CancelToken) -> Self {
        let handle = tokio::task::spawn(async move {
            let exit = select! {
                exit = child.wait() => Some(exit),
                _ = halt.cancelled() => None,
            };

            match exit {
                Some(exit) => exit,
                None => {
                    trace!(pid = ?child.id(), "killing stage");
                    child.kill().await?;
                    Ok(StageExit::Killed)
                }
            }
        });

        Self {
            stage: index,
            command: stage.command().to_owned(),
            handle,
            exit: None,
        }
    }

    async fn wait(&mut self) {
        if self.exit.is_some() {
            return;
        }

        let exit = match (&mut self.handle).await {
            Ok(exit) => exit,
            Err(err) => Err(io::Error::new(io::ErrorKind::Other, err.to_string())),
        };

        match &exit {
            Ok(exit) => trace!(stage = self.stage, code = ?exit.code(), "{} finished", self.command),
            Err(err) => warn!(stage = self.stage, "lost track of {}: {err}", self.command),
        }

        self.exit = Some(exit);
    }

    fn into_result(self) -> Result<(), ExecError> {
        let reason = match self.exit {
            Some(Ok(exit)) => exit.into_failure(),
            Some(Err(err)) => Some(StageFailure::Lost(err)),
            None => Some(StageFailure::Lost(io::Error::new(
                io::ErrorKind::Other,
                "stage was never waited on",
            ))),
        };

        match reason {
            None => Ok(()),
            Some(reason) => Err(ExecError::Failed {
                stage: self.stage,
                command: self.command,
                reason,
            }),
        }
    }
}

async fn wait_all(waiters: &mut [Waiter]) {
    for waiter in waiters.iter_mut() {
        waiter.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{builtins::BuiltinError, parse::parse_pipeline};

    async fn run(line: &str) -> Result<(), ExecError> {
        Executor::default()
            .run(parse_pipeline(line).unwrap(), &CancelToken::new())
            .await
    }

    #[tokio::test]
    async fn true_succeeds() {
        run("true").await.unwrap();
    }

    #[tokio::test]
    async fn first_failure_in_stage_order_wins() {
        let err = run("true | false | true").await.unwrap_err();

        assert!(matches!(
            err,
            ExecError::Failed {
                stage: 1,
                reason: StageFailure::Exit(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_command_is_a_start_error() {
        let err = run("pipesh-no-such-command").await.unwrap_err();

        match err {
            ExecError::Start { stage, command, source } => {
                assert_eq!(stage, 0);
                assert_eq!(command, "pipesh-no-such-command");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_input_file_is_a_start_error() {
        let err = run("cat < /definitely/not/here").await.unwrap_err();

        assert!(matches!(err, ExecError::Start { stage: 0, .. }));
    }

    #[tokio::test]
    async fn builtin_failure_in_pipeline_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let err = run(&format!("kill | cat > {}", out.display()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExecError::Failed {
                stage: 0,
                reason: StageFailure::Builtin(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn echo_feeds_external_command() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        run(&format!("echo hello pipe | tr a-z A-Z > {}", out.display()))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "HELLO PIPE\n");
    }

    #[tokio::test]
    async fn cancellation_kills_external_stages() {
        let cancel = CancelToken::new();
        tokio::task::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            }
        });

        let pipeline = parse_pipeline("sleep 30 | sleep 30").unwrap();
        let res = tokio::time::timeout(
            Duration::from_secs(10),
            Executor::default().run(pipeline, &cancel),
        )
        .await
        .expect("cancellation should unblock the run");

        assert!(matches!(res, Err(ExecError::Cancelled)));
    }

    #[tokio::test]
    async fn cancellation_while_stages_finish_wins() {
        let cancel = CancelToken::new();
        let executor = Executor::new(Arc::new(Tripwire(cancel.clone())));

        // `trip` fires the token and then succeeds, so every stage has
        // finished cleanly by the time the result is put together
        let res = tokio::time::timeout(
            Duration::from_secs(10),
            executor.run(parse_pipeline("true | trip").unwrap(), &cancel),
        )
        .await
        .expect("run should finish");

        assert!(matches!(res, Err(ExecError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelled_token_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let cancel = CancelToken::new();
        cancel.cancel();

        let pipeline = parse_pipeline(&format!("echo hi > {}", out.display())).unwrap();
        let res = Executor::default().run(pipeline, &cancel).await;

        assert!(matches!(res, Err(ExecError::Cancelled)));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn cd_in_a_pipeline_leaves_the_shell_alone() {
        let dir = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        let err = run(&format!("cd {} | true", dir.path().display()))
            .await
            .unwrap_err();

        match err {
            ExecError::Failed {
                stage: 0,
                command,
                reason: StageFailure::Builtin(BuiltinError::NotInPipeline(name)),
            } => {
                assert_eq!(command, "cd");
                assert_eq!(name, "cd");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[tokio::test]
    async fn redirected_cd_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        let err = run(&format!(
            "cd {} > {}",
            dir.path().display(),
            dir.path().join("out").display()
        ))
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "cd: cd: only runs on its own");
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    struct Tripwire(CancelToken);

    #[async_trait::async_trait]
    impl BuiltinRegistry for Tripwire {
        fn is_builtin(&self, name: &str) -> bool {
            name == "trip"
        }

        async fn invoke(
            &self,
            _args: &[String],
            _stdin: &mut StageReader,
            _stdout: &mut StageWriter,
        ) -> Result<(), BuiltinError> {
            self.0.cancel();
            Ok(())
        }
    }
}
