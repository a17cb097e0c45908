use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pipesh::{
    builtins::{BuiltinError, BuiltinRegistry},
    cmd::Executor,
    process::{StageReader, StageWriter},
};
use tokio::io::AsyncWriteExt;

/// One call into [`FakeBuiltins`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    /// Called with the shell's own stdin and stdout.
    pub direct: bool,
}

/// Builtins for exercising the executor:
///
/// - `produce N [SEED]` writes N bytes of a repeating pattern
/// - `copy` copies stdin to stdout
/// - `hang` never finishes
/// - `fail` fails immediately
/// - `record` does nothing but is remembered
///
/// Every invocation is recorded.
#[derive(Debug, Default)]
pub struct FakeBuiltins {
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeBuiltins {
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.invocations()
            .iter()
            .filter(|invocation| invocation.args[0] == name)
            .count()
    }
}

pub fn pattern(len: usize, seed: usize) -> Vec<u8> {
    (0..len).map(|i| ((i + seed) % 251) as u8).collect()
}

#[async_trait]
impl BuiltinRegistry for FakeBuiltins {
    fn is_builtin(&self, name: &str) -> bool {
        matches!(name, "produce" | "copy" | "hang" | "fail" | "record")
    }

    async fn invoke(
        &self,
        args: &[String],
        stdin: &mut StageReader,
        stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError> {
        self.invocations.lock().unwrap().push(Invocation {
            args: args.to_vec(),
            direct: matches!(stdin, StageReader::Stdin(_))
                && matches!(stdout, StageWriter::Stdout(_)),
        });

        match args[0].as_str() {
            "produce" => {
                let len = args[1].parse().unwrap();
                let seed = args.get(2).map_or(0, |seed| seed.parse().unwrap());
                for chunk in pattern(len, seed).chunks(8192) {
                    stdout.write_all(chunk).await?;
                }
                Ok(())
            }
            "copy" => {
                tokio::io::copy(stdin, stdout).await?;
                Ok(())
            }
            "hang" => std::future::pending().await,
            "fail" => Err(BuiltinError::Failed("fail: on purpose".into())),
            "record" => Ok(()),
            other => Err(BuiltinError::Unknown(other.to_owned())),
        }
    }
}

pub fn executor() -> (Executor, Arc<FakeBuiltins>) {
    let builtins = Arc::new(FakeBuiltins::default());
    (Executor::new(builtins.clone()), builtins)
}
