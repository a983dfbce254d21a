use codemods_compiler::Compiler;
use codemods_error::{Error, Result};
use codemods_swc_visitors::{FeatureFlagConfig, FlagSet, SourceEdits};
use swc_core::common::{comments::SingleThreadedComments, SourceFile};
use tracing::instrument;

use crate::RemoveFeatureFlagsOptions;

#[derive(Debug)]
pub struct TransformOutput {
  pub code: String,
  /// When false, `code` is the input source byte for byte.
  pub changed: bool,
  pub warnings: Vec<Error>,
}

impl TransformOutput {
  fn unchanged(source: &str, warnings: Vec<Error>) -> Self {
    Self {
      code: source.to_string(),
      changed: false,
      warnings,
    }
  }
}

/// Remove the feature flags named in `options` from `source`, treating each of
/// them as permanently enabled.
///
/// The parser syntax is picked from the extension of `filename`. Warnings are
/// handed to `options.on_warn` and returned in the output as well. Code the
/// transform does not change is copied from `source` as written.
#[instrument(skip(source, options))]
pub fn remove_feature_flags(
  source: &str,
  filename: &str,
  options: &RemoveFeatureFlagsOptions,
) -> Result<TransformOutput> {
  options.validate()?;

  let flags = FlagSet::new(&options.flag_names);
  if flags.is_empty() {
    let warnings = vec![Error::empty_flag_set()];
    warnings.iter().for_each(|warning| (options.on_warn)(warning));
    return Ok(TransformOutput::unchanged(source, warnings));
  }
  check_flag_names(&flags, options)?;

  let compiler = Compiler::default();
  let comments = SingleThreadedComments::default();
  let source_file = compiler.create_source_file(filename, source.to_string());
  let mut module = compiler.parse_with_comments(
    source_file.clone(),
    Compiler::syntax_for(filename),
    Some(&comments),
  )?;

  let report = codemods_swc_visitors::remove_feature_flags(
    &mut module,
    &flags,
    Some(&comments),
    &compiler,
    &FeatureFlagConfig {
      max_normalize_passes: options.max_normalize_passes,
    },
  )?;
  report.warnings.iter().for_each(|warning| (options.on_warn)(warning));

  if !report.changed() {
    return Ok(TransformOutput::unchanged(source, report.warnings));
  }
  let code = match splice_edits(&report.edits, &source_file, &compiler, filename) {
    Ok(code) => code,
    Err(err) => {
      tracing::warn!("{err}, printing the whole module instead");
      compiler.print(&module, Some(&comments))?
    }
  };
  Ok(TransformOutput {
    code,
    changed: true,
    warnings: report.warnings,
  })
}

/// The original text with the edits applied. It has to parse again.
fn splice_edits(
  edits: &SourceEdits,
  source_file: &SourceFile,
  compiler: &Compiler,
  filename: &str,
) -> Result<String> {
  let code = edits.render(source_file, compiler)?;
  let spliced = compiler.create_source_file(filename, code.clone());
  compiler.parse(spliced, Compiler::syntax_for(filename))?;
  Ok(code)
}

fn check_flag_names(flags: &FlagSet, options: &RemoveFeatureFlagsOptions) -> Result<()> {
  let regex = options.flag_regex()?;
  for name in flags.sorted_names() {
    if !regex.is_match(name) {
      tracing::warn!(
        "Flag name \"{name}\" does not follow the naming convention {}",
        regex.as_str()
      );
    }
  }
  Ok(())
}
