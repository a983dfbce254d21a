use codemods_compiler::Compiler;
use codemods_error::{Error, Result};
use rustc_hash::FxHashSet;
use swc_core::{
  common::{comments::Comments, Span},
  ecma::{
    ast::{Expr, Module},
    visit::{noop_visit_type, Visit, VisitMutWith, VisitWith},
  },
};
use tracing::instrument;

mod evaluate;
pub use evaluate::*;
mod flag_set;
pub use flag_set::*;
mod normalize;
pub use normalize::*;
mod rewrite;
pub use rewrite::*;

use crate::{comments::PrintedNodeComments, Piece, SourceEdits, StructureVerifier};

#[derive(Debug, Clone)]
pub struct FeatureFlagConfig {
  pub max_normalize_passes: usize,
}

impl Default for FeatureFlagConfig {
  fn default() -> Self {
    Self {
      max_normalize_passes: DEFAULT_MAX_NORMALIZE_PASSES,
    }
  }
}

#[derive(Debug, Default)]
pub struct FeatureFlagReport {
  /// If-statements, ternaries and logical expressions replaced.
  pub rewrites: usize,
  pub normalize: NormalizeReport,
  /// Every change as a replacement of the original source text.
  pub edits: SourceEdits,
  pub warnings: Vec<Error>,
}

impl FeatureFlagReport {
  pub fn changed(&self) -> bool {
    self.rewrites > 0 || self.normalize.changes > 0
  }
}

/// Resolve every construct decided by `flags` in `module`, in place.
///
/// The spread normalizer only runs when something was rewritten, so a module
/// without decidable flag checks is never touched. Hard failures are
/// structural inconsistencies only; everything else is a warning in the report.
///
/// Besides mutating `module`, the report carries the same changes as
/// [SourceEdits], so callers can keep the formatting of untouched code.
#[instrument(skip_all)]
pub fn remove_feature_flags(
  module: &mut Module,
  flags: &FlagSet,
  comments: Option<&dyn Comments>,
  compiler: &Compiler,
  config: &FeatureFlagConfig,
) -> Result<FeatureFlagReport> {
  let mut report = FeatureFlagReport::default();
  if flags.is_empty() {
    report.warnings.push(Error::empty_flag_set());
    return Ok(report);
  }
  tracing::debug!(flags = ?flags.sorted_names(), "removing feature flags");

  let mut rewriter = FlagRewriter::new(flags, comments, compiler);
  module.visit_mut_with(&mut rewriter);
  report.rewrites = rewriter.rewrites;
  first_error(rewriter.errors)?;
  report.edits = rewriter.edits;

  if report.rewrites == 0 {
    return Ok(report);
  }

  report.normalize = normalize_spreads(
    module,
    compiler,
    &rewriter.results,
    config.max_normalize_passes,
  );
  first_error(std::mem::take(&mut report.normalize.errors))?;

  first_error(StructureVerifier::verify(module, compiler))?;

  if !report.normalize.changed_containers.is_empty() {
    let mut printer = ContainerPrinter {
      containers: &report.normalize.changed_containers,
      comments,
      compiler,
      edits: SourceEdits::default(),
      errors: vec![],
    };
    module.visit_with(&mut printer);
    first_error(printer.errors)?;
    report.edits.extend(printer.edits);
  }

  if !report.normalize.fixpoint_reached {
    report
      .warnings
      .push(Error::normalization_incomplete(report.normalize.passes));
  }
  report.warnings.extend(
    report
      .normalize
      .emptied_objects
      .iter()
      .map(|span| Error::empty_object_literal(compiler.location(*span))),
  );

  tracing::debug!(
    rewrites = report.rewrites,
    normalized = report.normalize.changes,
    warnings = report.warnings.len(),
    "removed feature flags"
  );
  Ok(report)
}

/// Prints the outermost containers whose entries the normalizer changed, as
/// edits over their original range.
struct ContainerPrinter<'a> {
  containers: &'a FxHashSet<Span>,
  comments: Option<&'a dyn Comments>,
  compiler: &'a Compiler,
  edits: SourceEdits,
  errors: Vec<Error>,
}

impl<'a> ContainerPrinter<'a> {
  fn print(&mut self, span: Span, expr: &Expr) {
    let printed = match self.comments {
      Some(comments) => {
        let comments = PrintedNodeComments::new(comments, span);
        self.compiler.print_node(expr, Some(&comments))
      }
      None => self.compiler.print_node(expr, None),
    };
    match printed {
      Ok(code) => self.edits.replace(span, vec![Piece::Printed(code)]),
      Err(err) => self.errors.push(err.into()),
    }
  }
}

impl<'a> Visit for ContainerPrinter<'a> {
  noop_visit_type!();

  fn visit_expr(&mut self, expr: &Expr) {
    let span = match expr {
      Expr::Object(obj) => Some(obj.span),
      Expr::Array(arr) => Some(arr.span),
      Expr::Call(call) => Some(call.span),
      Expr::New(new) => Some(new.span),
      _ => None,
    };
    match span.filter(|span| self.containers.contains(span)) {
      Some(span) => self.print(span, expr),
      None => expr.visit_children_with(self),
    }
  }
}

fn first_error(errors: Vec<Error>) -> Result<()> {
  let mut errors = errors.into_iter();
  match errors.next() {
    Some(err) => {
      for rest in errors {
        tracing::debug!("{rest}");
      }
      Err(err)
    }
    None => Ok(()),
  }
}
