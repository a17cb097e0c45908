use std::io;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug)]
pub enum InputMessage {
    Line(String),
    Eof,
}

/// Reads the shell's stdin one line at a time. On a terminal nothing is read
/// between calls, so commands started in the meantime can use stdin too.
pub struct LineInput {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for LineInput {
    fn default() -> Self {
        Self::new()
    }
}

impl LineInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub async fn next(&mut self) -> io::Result<InputMessage> {
        Ok(match self.lines.next_line().await? {
            Some(line) => InputMessage::Line(line),
            None => InputMessage::Eof,
        })
    }
}

pub fn is_interactive() -> bool {
    termion::is_tty(&std::io::stdin())
}
