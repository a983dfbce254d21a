use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use codemods::{remove_feature_flags, RemoveFeatureFlagsOptions};
use codemods_error::{Error, Errors, Result};
use sugar_path::SugarPath;

#[derive(Parser)]
#[command(name = "codemods", version, about = "Source-to-source codemods for JavaScript and TypeScript")]
struct Cli {
  /// Log every rewrite decision
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Inline feature flags that are permanently enabled
  RemoveFeatureFlags(RemoveFeatureFlagsArgs),
}

#[derive(Args)]
struct RemoveFeatureFlagsArgs {
  /// Flag names to remove (comma-separated)
  #[arg(long, alias = "flags", value_delimiter = ',')]
  flag_names: Vec<String>,

  /// Naming convention flag names are checked against
  #[arg(long)]
  flag_pattern: Option<String>,

  /// Upper bound of spread normalization passes
  #[arg(long, default_value_t = 2)]
  max_normalize_passes: usize,

  /// Don't write changed files back
  #[arg(long)]
  dry: bool,

  /// Print the transformed source of every changed file
  #[arg(long)]
  print: bool,

  /// Files to transform
  #[arg(required = true)]
  files: Vec<PathBuf>,
}

impl RemoveFeatureFlagsArgs {
  fn options(&self) -> RemoveFeatureFlagsOptions {
    RemoveFeatureFlagsOptions {
      flag_names: self.flag_names.clone(),
      flag_pattern: self.flag_pattern.clone(),
      max_normalize_passes: self.max_normalize_passes,
      ..Default::default()
    }
  }
}

#[derive(Default)]
struct Summary {
  changed: usize,
  unchanged: usize,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  codemods_tracing::init(cli.verbose);

  let result = match &cli.command {
    Command::RemoveFeatureFlags(args) => run_remove_feature_flags(args),
  };
  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(errors) => {
      for err in errors.iter() {
        eprintln!("{err}");
      }
      ExitCode::FAILURE
    }
  }
}

fn run_remove_feature_flags(args: &RemoveFeatureFlagsArgs) -> std::result::Result<(), Errors> {
  let options = args.options();
  let cwd = std::env::current_dir().map_err(Error::from)?;
  let mut summary = Summary::default();
  let mut errors: Option<Errors> = None;

  for path in &args.files {
    let display_path = path.relative(&cwd);
    match transform_file(path, &display_path, args, &options) {
      Ok(true) => summary.changed += 1,
      Ok(false) => summary.unchanged += 1,
      Err(err) => {
        let err = err.context(format!("while transforming {}", display_path.display()));
        match &mut errors {
          Some(errors) => errors.push(err),
          None => errors = Some(Errors::new(err)),
        }
      }
    }
  }

  tracing::info!(
    changed = summary.changed,
    unchanged = summary.unchanged,
    failed = errors.as_ref().map_or(0, Errors::len),
    "remove-feature-flags finished"
  );
  match errors {
    Some(errors) => Err(errors),
    None => Ok(()),
  }
}

fn transform_file(
  path: &Path,
  display_path: &Path,
  args: &RemoveFeatureFlagsArgs,
  options: &RemoveFeatureFlagsOptions,
) -> Result<bool> {
  let source = std::fs::read_to_string(path).map_err(|err| Error::io_error(Some(path), err))?;
  let output = remove_feature_flags(&source, &display_path.to_string_lossy(), options)?;
  if !output.changed {
    tracing::debug!("{} unchanged", display_path.display());
    return Ok(false);
  }

  if args.print {
    println!("{}", output.code);
  }
  if !args.dry {
    std::fs::write(path, &output.code).map_err(|err| Error::io_error(Some(path), err))?;
  }
  tracing::info!("{} transformed", display_path.display());
  Ok(true)
}

#[cfg(test)]
mod tests {
  use std::ffi::OsString;

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn flag_names_are_comma_separated() {
    let cli = Cli::parse_from([
      "codemods",
      "remove-feature-flags",
      "--flag-names",
      "FF_1_A,FF_2_B",
      "--dry",
      "src/a.js",
      "src/b.ts",
    ]);
    let Command::RemoveFeatureFlags(args) = cli.command;
    assert_eq!(args.flag_names, vec!["FF_1_A", "FF_2_B"]);
    assert!(args.dry);
    assert_eq!(args.files.len(), 2);
    assert_eq!(args.options().max_normalize_passes, 2);
  }

  #[test]
  fn transforms_files_in_place() {
    let dir = std::env::temp_dir().join(format!("codemods-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let changed = dir.join("changed.js");
    let untouched = dir.join("untouched.js");
    std::fs::write(&changed, "if (FF_1_A) { run(); } else { legacy(); }\n").unwrap();
    std::fs::write(&untouched, "if (other)  run();\n").unwrap();

    let cli = Cli::parse_from([
      OsString::from("codemods"),
      OsString::from("remove-feature-flags"),
      OsString::from("--flag-names=FF_1_A"),
      changed.clone().into_os_string(),
      untouched.clone().into_os_string(),
      dir.join("missing.js").into_os_string(),
    ]);
    let Command::RemoveFeatureFlags(args) = cli.command;
    let errors = run_remove_feature_flags(&args).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.iter().next().unwrap().code(), "IO_ERROR");
    assert_eq!(std::fs::read_to_string(&changed).unwrap(), "run();\n");
    assert_eq!(std::fs::read_to_string(&untouched).unwrap(), "if (other)  run();\n");
    std::fs::remove_dir_all(&dir).unwrap();
  }
}
