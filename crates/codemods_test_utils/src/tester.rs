use std::{
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
};

use codemods::{Error, RemoveFeatureFlagsOptions};

use crate::test_config::TestConfig;

pub struct Tester {
  pub config: TestConfig,
  pub fixture_dir: PathBuf,
  /// Codes of the warnings reported through `on_warn`.
  pub warnings: Arc<Mutex<Vec<&'static str>>>,
}

impl Tester {
  pub fn from_config_path(filepath: &Path) -> Self {
    let fixture_dir = filepath
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();
    Self {
      config: TestConfig::from_config_path(filepath),
      fixture_dir,
      warnings: Default::default(),
    }
  }

  pub fn options(&self) -> RemoveFeatureFlagsOptions {
    let warning_collector = self.warnings.clone();
    RemoveFeatureFlagsOptions {
      on_warn: Arc::new(move |err: &Error| {
        warning_collector.lock().unwrap().push(err.code());
      }),
      ..self.config.options.clone()
    }
  }

  pub fn input_path(&self) -> PathBuf {
    self.fixture_dir.join(&self.config.input)
  }

  pub fn output_path(&self) -> PathBuf {
    let input = Path::new(&self.config.input);
    match input.extension() {
      Some(ext) => self.fixture_dir.join("output").with_extension(ext),
      None => self.fixture_dir.join("output"),
    }
  }
}
