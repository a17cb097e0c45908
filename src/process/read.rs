use std::{
    io::{self, Cursor},
    pin::Pin,
    task,
};

use tokio::{
    fs::File,
    io::{AsyncRead, ReadBuf, Stdin},
};

pub enum StageReader {
    Stdin(Stdin),
    File(File),
    /// In-memory input for driving builtins without a pipe.
    #[doc(hidden)]
    Canned(Cursor<Vec<u8>>),
}

impl StageReader {
    pub fn stdin() -> Self {
        Self::Stdin(tokio::io::stdin())
    }

    #[doc(hidden)]
    pub fn canned(data: impl Into<Vec<u8>>) -> Self {
        Self::Canned(Cursor::new(data.into()))
    }
}

impl From<std::fs::File> for StageReader {
    fn from(value: std::fs::File) -> Self {
        Self::File(File::from_std(value))
    }
}

impl AsyncRead for StageReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> task::Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Stdin(stdin) => Pin::new(stdin).poll_read(cx, buf),
            Self::File(file) => Pin::new(file).poll_read(cx, buf),
            Self::Canned(canned) => Pin::new(canned).poll_read(cx, buf),
        }
    }
}
