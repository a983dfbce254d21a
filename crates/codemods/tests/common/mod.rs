use std::path::Path;

use codemods::remove_feature_flags;
use codemods_test_utils::{normalize_code, tester::Tester};

pub fn run_test(config_path: &Path) {
  let tester = Tester::from_config_path(config_path);
  let input = std::fs::read_to_string(tester.input_path()).unwrap();

  let output = remove_feature_flags(&input, &tester.config.input, &tester.options());

  // If the test config has an expected error, assert that the error matches
  if let Some(expected_error) = &tester.config.expected_error {
    let error = output.expect_err("Expected error but got success");
    assert_eq!(error.code(), expected_error.code);
    if let Some(message) = &expected_error.message {
      assert!(
        error.to_string().contains(message.as_str()),
        "`{error}` does not mention `{message}`"
      );
    }
    return;
  }

  let output = output.unwrap_or_else(|err| panic!("{err}"));
  let expected = std::fs::read_to_string(tester.output_path()).unwrap();
  if tester.config.exact_output {
    assert_eq!(output.code, expected, "fixture {}", tester.fixture_dir.display());
  }
  assert_eq!(
    normalize_code(&output.code, &tester.config.input),
    normalize_code(&expected, &tester.config.input),
    "fixture {}",
    tester.fixture_dir.display()
  );

  let warnings = tester.warnings.lock().unwrap();
  assert_eq!(*warnings, tester.config.expected_warnings);
  assert_eq!(
    output.warnings.iter().map(|w| w.code()).collect::<Vec<_>>(),
    *warnings
  );
}
