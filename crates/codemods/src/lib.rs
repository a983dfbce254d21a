mod options;
mod remove_feature_flags;
pub use {
  codemods_error::{Error, ErrorKind, Result},
  options::{default_warning_handler, RemoveFeatureFlagsOptions, WarningHandler},
  remove_feature_flags::{remove_feature_flags, TransformOutput},
};
