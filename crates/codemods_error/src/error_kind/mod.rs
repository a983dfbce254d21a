use std::{fmt::Display, path::PathBuf};

pub mod error_code;

/// Zero-based column and one-based line of a node in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
  pub line: usize,
  pub column: usize,
}

impl Display for Location {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.line, self.column)
  }
}

fn display_location(location: &Option<Location>) -> String {
  location
    .map(|loc| format!(" at {loc}"))
    .unwrap_or_default()
}

#[derive(Debug)]
pub enum ErrorKind {
  // --- Warnings
  /// No flag names were configured, the transform returned the source untouched.
  EmptyFlagSet,
  /// An object literal lost all of its entries while spreads were cleaned up.
  EmptyObjectLiteral {
    location: Option<Location>,
  },
  /// The normalizer hit its pass cap while the tree could still be simplified.
  NormalizationIncomplete {
    passes: usize,
  },

  // --- Errors
  ParseJsFailed {
    filename: String,
    message: String,
    location: Option<Location>,
  },
  /// A rewrite site could not be located in its parent, or a moved-out slot
  /// was never refilled. The tree was mutated inconsistently.
  StructuralInconsistency {
    node_kind: &'static str,
    reason: String,
    location: Option<Location>,
  },
  InvalidOption {
    name: &'static str,
    reason: String,
  },

  /// This error means that the codemod panics because unrecoverable error happens.
  ///
  /// We also use this to replace `panic!()` in the code for graceful shutdown.
  /// But this is not recommended.
  Panic {
    source: anyhow::Error,
  },

  // --- Driver
  IoError {
    path: Option<PathBuf>,
    source: std::io::Error,
  },
}

impl Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ErrorKind::EmptyFlagSet => write!(f, "No flag names provided. Please specify --flag-names=FLAG1,FLAG2"),
      ErrorKind::EmptyObjectLiteral { location } => write!(
        f,
        "Object literal{} became empty after removing feature flag spreads.",
        display_location(location)
      ),
      ErrorKind::NormalizationIncomplete { passes } => write!(
        f,
        "Spread normalization did not reach a fixpoint within {passes} passes. Increase \"maxNormalizePasses\" to fully inline nested spreads."
      ),
      ErrorKind::ParseJsFailed { filename, message, location } => {
        write!(f, "Parse failed: {filename}{}: {message}", display_location(location))
      }
      ErrorKind::StructuralInconsistency { node_kind, reason, location } => write!(
        f,
        "Structural inconsistency on {node_kind}{}: {reason}",
        display_location(location)
      ),
      ErrorKind::InvalidOption { name, reason } => write!(f, r#"Invalid option "{name}": {reason}"#),
      ErrorKind::Panic { source } => source.fmt(f),
      ErrorKind::IoError { path: Some(path), source } => write!(f, "{}: {source}", path.display()),
      ErrorKind::IoError { path: None, source } => source.fmt(f),
    }
  }
}

impl ErrorKind {
  pub fn code(&self) -> &'static str {
    match self {
      ErrorKind::EmptyFlagSet => error_code::EMPTY_FLAG_SET,
      ErrorKind::EmptyObjectLiteral { .. } => error_code::EMPTY_OBJECT_LITERAL,
      ErrorKind::NormalizationIncomplete { .. } => error_code::NORMALIZATION_INCOMPLETE,
      ErrorKind::ParseJsFailed { .. } => error_code::PARSE_ERROR,
      ErrorKind::StructuralInconsistency { .. } => error_code::STRUCTURAL_INCONSISTENCY,
      ErrorKind::InvalidOption { .. } => error_code::INVALID_OPTION,
      ErrorKind::Panic { .. } => error_code::PANIC,
      ErrorKind::IoError { .. } => error_code::IO_ERROR,
    }
  }

  /// Warnings are reported alongside a successful transform and never abort it.
  pub fn is_warning(&self) -> bool {
    matches!(
      self,
      ErrorKind::EmptyFlagSet
        | ErrorKind::EmptyObjectLiteral { .. }
        | ErrorKind::NormalizationIncomplete { .. }
    )
  }
}
