use std::{io, pin::Pin, task};

use tokio::{
    fs::File,
    io::{AsyncWrite, Stdout},
};

pub enum StageWriter {
    Stdout(Stdout),
    File(File),
    /// In-memory output for driving builtins without a pipe.
    #[doc(hidden)]
    Buffer(Vec<u8>),
}

impl StageWriter {
    pub fn stdout() -> Self {
        Self::Stdout(tokio::io::stdout())
    }

    #[doc(hidden)]
    pub fn buffer() -> Self {
        Self::Buffer(Vec::new())
    }

    #[doc(hidden)]
    pub fn captured(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(buf) => Some(buf),
            _ => None,
        }
    }
}

impl From<std::fs::File> for StageWriter {
    fn from(value: std::fs::File) -> Self {
        Self::File(File::from_std(value))
    }
}

impl AsyncWrite for StageWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: &[u8],
    ) -> task::Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Stdout(stdout) => Pin::new(stdout).poll_write(cx, buf),
            Self::File(file) => Pin::new(file).poll_write(cx, buf),
            Self::Buffer(buffer) => Pin::new(buffer).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> task::Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Stdout(stdout) => Pin::new(stdout).poll_flush(cx),
            Self::File(file) => Pin::new(file).poll_flush(cx),
            Self::Buffer(buffer) => Pin::new(buffer).poll_flush(cx),
        }
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Stdout(stdout) => Pin::new(stdout).poll_shutdown(cx),
            Self::File(file) => Pin::new(file).poll_shutdown(cx),
            Self::Buffer(buffer) => Pin::new(buffer).poll_shutdown(cx),
        }
    }
}
