pub use self::{
    child::StageChild,
    pipe::{Pipe, StageInput, StageOutput},
    read::StageReader,
    status::{StageExit, StageFailure},
    write::StageWriter,
};

pub mod child;
pub mod pipe;
pub mod read;
pub mod status;
pub mod write;
