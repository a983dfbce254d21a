mod comments;
mod feature_flags;
pub use feature_flags::*;
mod rewrite_site;
pub use rewrite_site::*;
mod source_edits;
pub use source_edits::*;
mod verify;
pub use verify::*;
mod utils;
pub use utils::*;

#[cfg(test)]
pub(crate) mod test_utils;
