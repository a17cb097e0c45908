use std::{io::Write, path::Path};

use color_eyre::Result;

use crate::{
    cmd::{CommandList, Executor},
    config::Config,
    parse::expand_env,
};

pub struct State {
    pub config: Config,
    pub executor: Executor,
    pub interactive: bool,
}

impl State {
    pub fn new(config: Config, executor: Executor, interactive: bool) -> Self {
        Self {
            config,
            executor,
            interactive,
        }
    }

    pub fn prompt(&self) -> String {
        let cwd = std::env::current_dir().unwrap_or_default();
        format!("{}:{}$ ", self.config.prompt, dir_name(&cwd))
    }

    pub fn render<W: Write>(&self, stdout: &mut W) -> Result<()> {
        if self.interactive {
            write!(stdout, "{}", self.prompt())?;
            stdout.flush()?;
        }

        Ok(())
    }

    pub async fn execute(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }

        let line = expand_env(line);
        trace!("executing line: {line:?}");

        CommandList::parse(&line)
            .execute(&self.executor, |err| {
                if !err.is_quiet() {
                    eprintln!("{err}");
                }
            })
            .await
    }
}

fn dir_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}
