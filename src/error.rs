use thiserror::Error;

/// Everything that can go wrong while reading an MFS volume.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open backing store: {0}")]
    NotOpenable(#[source] std::io::Error),

    #[error("malformed volume structure: {0}")]
    BadFormat(String),

    #[error("volume has {0} fork(s) still open")]
    Busy(usize),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("file claims physical size larger than its allocation chain ({expected} blocks, chain length {actual})")]
    FileTooLarge { expected: usize, actual: usize },

    #[error("corrupt allocation chain at block {0}")]
    CorruptChain(u16),

    #[error("operation on a closed or invalid fork handle")]
    BadHandle,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
