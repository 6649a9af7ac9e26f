mod keygen_error;

pub use keygen_error::{KeyStep, KeygenError};
pub type Result<T> = std::result::Result<T, KeygenError>;
