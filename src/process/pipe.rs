use std::{
    fs::File,
    io::{self, PipeReader, PipeWriter},
    os::fd::OwnedFd,
    process::Stdio,
};

use super::{read::StageReader, write::StageWriter};

/// A pipe between two adjacent stages. Splitting it hands the write side to
/// the upstream stage and the read side to the downstream one; nothing else
/// ever holds either end.
#[derive(Debug)]
pub struct Pipe {
    reader: PipeReader,
    writer: PipeWriter,
}

impl Pipe {
    pub fn new() -> io::Result<Self> {
        let (reader, writer) = io::pipe()?;
        Ok(Self { reader, writer })
    }

    pub fn split(self) -> (StageOutput, StageInput) {
        (
            StageOutput::Pipe(self.writer),
            StageInput::Pipe(self.reader),
        )
    }
}

#[derive(Debug)]
pub enum StageInput {
    Inherit,
    Pipe(PipeReader),
    File(File),
}

impl StageInput {
    pub fn into_stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Pipe(reader) => reader.into(),
            Self::File(file) => file.into(),
        }
    }

    pub fn into_reader(self) -> StageReader {
        match self {
            Self::Inherit => StageReader::stdin(),
            Self::Pipe(reader) => File::from(OwnedFd::from(reader)).into(),
            Self::File(file) => file.into(),
        }
    }
}

#[derive(Debug)]
pub enum StageOutput {
    Inherit,
    Pipe(PipeWriter),
    File(File),
}

impl StageOutput {
    pub fn into_stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Pipe(writer) => writer.into(),
            Self::File(file) => file.into(),
        }
    }

    pub fn into_writer(self) -> StageWriter {
        match self {
            Self::Inherit => StageWriter::stdout(),
            Self::Pipe(writer) => File::from(OwnedFd::from(writer)).into(),
            Self::File(file) => file.into(),
        }
    }
}
