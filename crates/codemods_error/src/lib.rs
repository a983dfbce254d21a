mod error;
pub use error::*;
mod error_kind;
pub use error_kind::*;
mod errors;
pub use errors::*;

pub type Result<T> = std::result::Result<T, Error>;
