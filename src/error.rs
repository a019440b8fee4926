use thiserror::Error;

use crate::Slot;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no candidate words left for {0}")]
    UnsatisfiableDomain(Slot),

    #[error("no solution")]
    NoSolution,

    #[error("structure has no rows")]
    EmptyStructure,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
