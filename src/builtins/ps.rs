use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::process::{StageReader, StageWriter};

use super::{BuiltinCommand, BuiltinError};

#[derive(Default)]
pub struct Ps;

#[async_trait]
impl BuiltinCommand for Ps {
    fn name(&self) -> &'static str {
        "ps"
    }

    async fn execute(
        &self,
        _args: &[String],
        _stdin: &mut StageReader,
        stdout: &mut StageWriter,
    ) -> Result<(), BuiltinError> {
        let mut entries = tokio::fs::read_dir("/proc")
            .await
            .map_err(|err| BuiltinError::Failed(format!("ps: {err}")))?;

        let mut pids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            else {
                continue;
            };

            // processes can exit while we walk the directory
            if entry.file_type().await.map_or(false, |t| t.is_dir()) {
                pids.push(pid);
            }
        }
        pids.sort_unstable();

        for pid in pids {
            let cmdline = tokio::fs::read(format!("/proc/{pid}/cmdline"))
                .await
                .unwrap_or_default();
            let cmdline = String::from_utf8_lossy(&cmdline).replace('\0', " ");

            stdout
                .write_all(format!("{pid} {}\n", cmdline.trim()).as_bytes())
                .await?;
        }

        Ok(())
    }
}
