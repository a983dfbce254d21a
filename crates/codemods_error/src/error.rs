use std::{fmt::Display, path::Path};

use crate::{ErrorKind, Location};

#[derive(Debug)]
pub struct Error {
  contexts: Vec<String>,
  pub kind: ErrorKind,
}

impl Error {
  fn with_kind(kind: ErrorKind) -> Self {
    Self {
      contexts: vec![],
      kind,
    }
  }

  pub fn context(mut self, context: String) -> Self {
    self.contexts.push(context);
    self
  }

  pub fn code(&self) -> &'static str {
    self.kind.code()
  }

  pub fn is_warning(&self) -> bool {
    self.kind.is_warning()
  }

  // --- Warnings

  pub fn empty_flag_set() -> Self {
    Self::with_kind(ErrorKind::EmptyFlagSet)
  }

  pub fn empty_object_literal(location: Option<Location>) -> Self {
    Self::with_kind(ErrorKind::EmptyObjectLiteral { location })
  }

  pub fn normalization_incomplete(passes: usize) -> Self {
    Self::with_kind(ErrorKind::NormalizationIncomplete { passes })
  }

  // --- Errors

  pub fn parse_js_failed(
    filename: impl Into<String>,
    message: impl Into<String>,
    location: Option<Location>,
  ) -> Self {
    Self::with_kind(ErrorKind::ParseJsFailed {
      filename: filename.into(),
      message: message.into(),
      location,
    })
  }

  pub fn structural_inconsistency(
    node_kind: &'static str,
    reason: impl Into<String>,
    location: Option<Location>,
  ) -> Self {
    Self::with_kind(ErrorKind::StructuralInconsistency {
      node_kind,
      reason: reason.into(),
      location,
    })
  }

  pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
    Self::with_kind(ErrorKind::InvalidOption {
      name,
      reason: reason.into(),
    })
  }

  pub fn io_error(path: Option<&Path>, source: std::io::Error) -> Self {
    Self::with_kind(ErrorKind::IoError {
      path: path.map(Path::to_path_buf),
      source,
    })
  }
}

impl std::convert::From<anyhow::Error> for Error {
  fn from(value: anyhow::Error) -> Self {
    Self::with_kind(ErrorKind::Panic { source: value })
  }
}

impl std::convert::From<std::io::Error> for Error {
  fn from(value: std::io::Error) -> Self {
    Self::io_error(None, value)
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match &self.kind {
      ErrorKind::Panic { source, .. } => Some(source.as_ref()),
      ErrorKind::IoError { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for ctx in self.contexts.iter().rev() {
      writeln!(f, "{}: {}", ansi_term::Color::Yellow.paint("context"), ctx)?;
    }

    self.kind.fmt(f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn warnings_are_classified() {
    assert!(Error::empty_flag_set().is_warning());
    assert!(Error::normalization_incomplete(2).is_warning());
    assert!(!Error::structural_inconsistency("IfStmt", "gone", None).is_warning());
  }

  #[test]
  fn display_includes_location_and_contexts() {
    let err = Error::structural_inconsistency(
      "Stmt",
      "splice index 4 is out of bounds for a list of 2",
      Some(Location { line: 3, column: 2 }),
    )
    .context("remove-feature-flags".to_string());
    let message = err.to_string();
    assert!(message.contains("remove-feature-flags"));
    assert!(message.ends_with("Structural inconsistency on Stmt at 3:2: splice index 4 is out of bounds for a list of 2"));
    assert_eq!(err.code(), "STRUCTURAL_INCONSISTENCY");
  }

  #[test]
  fn anyhow_errors_become_panics() {
    let err: Error = anyhow::format_err!("boom").into();
    assert_eq!(err.code(), "PANIC");
    assert_eq!(err.to_string(), "boom");
  }
}
