use std::path::Path;

use codemods::RemoveFeatureFlagsOptions;
use serde::Deserialize;

fn input_default() -> String {
  "input.js".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedError {
  pub code: String,
  #[serde(default)]
  pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
  #[serde(flatten)]
  pub options: RemoveFeatureFlagsOptions,
  /// Input file name next to `config.json`. The expected output is the file
  /// named `output` with the same extension.
  #[serde(default = "input_default")]
  pub input: String,
  /// Codes of the warnings the transform has to report, in order.
  #[serde(default)]
  pub expected_warnings: Vec<String>,
  #[serde(default)]
  pub expected_error: Option<ExpectedError>,
  /// Compare the output with `output.*` byte for byte instead of after a
  /// parse and print of both.
  #[serde(default)]
  pub exact_output: bool,
}

impl TestConfig {
  pub fn from_config_path(filepath: &Path) -> Self {
    let test_config: TestConfig =
      serde_json::from_str(&std::fs::read_to_string(filepath).unwrap_or_else(|_| "{}".to_string()))
        .unwrap();
    test_config
  }
}
