pub use self::{
    execute::{ExecError, Executor},
    list::{CommandList, ListError},
};

pub mod execute;
pub mod list;
