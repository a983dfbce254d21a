use std::sync::Arc;

use codemods_error::{Error, Result};
use codemods_swc_visitors::DEFAULT_MAX_NORMALIZE_PASSES;
use derivative::Derivative;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

pub type WarningHandler = Arc<dyn Fn(&Error) + Send + Sync>;

pub const DEFAULT_FLAG_PATTERN: &str = r"^FF_\d+_[A-Z0-9_]+$";

static DEFAULT_FLAG_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new(DEFAULT_FLAG_PATTERN).expect("default flag pattern is valid"));

pub fn default_warning_handler() -> WarningHandler {
  Arc::new(|err: &Error| {
    eprintln!("{}", err);
  })
}

fn max_normalize_passes_default() -> usize {
  DEFAULT_MAX_NORMALIZE_PASSES
}

#[derive(Derivative, Deserialize, Clone)]
#[derivative(Debug)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFeatureFlagsOptions {
  #[serde(default, alias = "flags")]
  pub flag_names: Vec<String>,
  /// Naming convention flag names are expected to follow. Names that don't
  /// match are still removed, a mismatch is only logged.
  #[serde(default)]
  pub flag_pattern: Option<String>,
  #[serde(default = "max_normalize_passes_default")]
  pub max_normalize_passes: usize,
  #[serde(skip, default = "default_warning_handler")]
  #[derivative(Debug = "ignore")]
  pub on_warn: WarningHandler,
}

impl Default for RemoveFeatureFlagsOptions {
  fn default() -> Self {
    Self {
      flag_names: vec![],
      flag_pattern: None,
      max_normalize_passes: DEFAULT_MAX_NORMALIZE_PASSES,
      on_warn: default_warning_handler(),
    }
  }
}

impl RemoveFeatureFlagsOptions {
  /// `"FF_1_A, FF_2_B,"` as accepted on the command line.
  pub fn from_flag_list(list: &str) -> Self {
    Self {
      flag_names: list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect(),
      ..Default::default()
    }
  }

  pub(crate) fn validate(&self) -> Result<()> {
    if self.max_normalize_passes == 0 {
      return Err(Error::invalid_option(
        "maxNormalizePasses",
        "at least one normalization pass is required",
      ));
    }
    self.flag_regex()?;
    Ok(())
  }

  pub(crate) fn flag_regex(&self) -> Result<Regex> {
    match &self.flag_pattern {
      Some(pattern) => {
        Regex::new(pattern).map_err(|err| Error::invalid_option("flagPattern", err.to_string()))
      }
      None => Ok(DEFAULT_FLAG_REGEX.clone()),
    }
  }
}
