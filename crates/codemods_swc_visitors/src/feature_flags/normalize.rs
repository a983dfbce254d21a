use codemods_compiler::Compiler;
use codemods_error::Error;
use rustc_hash::FxHashSet;
use swc_core::{
  common::{Span, Spanned},
  ecma::{
    ast::{
      ArrayLit, Bool, CallExpr, Expr, ExprOrSpread, Lit, Module, NewExpr, ObjectLit, Prop,
      PropName, PropOrSpread,
    },
    visit::{noop_visit_mut_type, noop_visit_type, Visit, VisitMut, VisitMutWith, VisitWith},
  },
};
use tracing::instrument;

use crate::{unparen, unparen_mut, RewriteSite};

/// Default cap of [normalize_spreads]. One bottom-up pass inlines nested
/// spreads, the second one confirms the fixpoint.
pub const DEFAULT_MAX_NORMALIZE_PASSES: usize = 2;

#[derive(Debug, Default)]
pub struct NormalizeReport {
  pub passes: usize,
  /// Spreads removed or inlined over all passes.
  pub changes: usize,
  pub fixpoint_reached: bool,
  /// Object literals that still exist and were emptied by the normalizer.
  pub emptied_objects: Vec<Span>,
  /// Object and array literals, calls and `new` expressions whose entries
  /// changed.
  pub changed_containers: FxHashSet<Span>,
  pub errors: Vec<Error>,
}

/// Inline spreads of literal collections into the literal containing them and
/// drop `...false` markers, pass after pass, until nothing changes or
/// `max_passes` is spent. `fixpoint_reached` is false only when the cap was
/// hit and the tree can still be simplified.
///
/// Only spreads whose argument is or contains one of the rewrite `results`
/// are touched. Spreads the rewriter had no part in stay as written.
#[instrument(skip_all, level = "debug")]
pub fn normalize_spreads(
  module: &mut Module,
  compiler: &Compiler,
  results: &[Span],
  max_passes: usize,
) -> NormalizeReport {
  let mut report = NormalizeReport::default();
  let mut emptied = FxHashSet::default();

  while report.passes < max_passes {
    report.passes += 1;
    let mut normalizer = SpreadNormalizer::new(compiler, results);
    module.visit_mut_with(&mut normalizer);
    report.changes += normalizer.changes;
    emptied.extend(normalizer.emptied_objects);
    report.changed_containers.extend(normalizer.changed_containers);
    if !normalizer.errors.is_empty() {
      report.errors = normalizer.errors;
      return report;
    }
    if normalizer.changes == 0 {
      report.fixpoint_reached = true;
      break;
    }
  }

  if !report.fixpoint_reached {
    let mut finder = PendingSpreadFinder {
      results,
      found: false,
    };
    module.visit_with(&mut finder);
    report.fixpoint_reached = !finder.found;
  }

  if !emptied.is_empty() {
    let mut collector = EmptyObjectCollector {
      emptied: &emptied,
      found: vec![],
    };
    module.visit_with(&mut collector);
    report.emptied_objects = collector.found;
  }

  tracing::debug!(
    passes = report.passes,
    changes = report.changes,
    fixpoint_reached = report.fixpoint_reached,
    "normalized spreads"
  );
  report
}

enum SpreadAction<T> {
  Keep,
  Remove,
  Inline(Vec<T>),
}

fn is_false_literal(expr: &Expr) -> bool {
  matches!(expr, Expr::Lit(Lit::Bool(Bool { value: false, .. })))
}

/// The spread argument was produced by the rewriter, or holds something that was.
fn involves_rewrite(expr: &Expr, results: &[Span]) -> bool {
  let span = expr.span();
  results
    .iter()
    .any(|result| !result.is_dummy() && span.lo <= result.lo && result.hi <= span.hi)
}

/// Spreading an object literal is the same as writing its properties in
/// place, except for accessors (spread reads them once) and `__proto__`
/// (spread defines an own property, a literal sets the prototype).
fn is_inlinable_object(obj: &ObjectLit) -> bool {
  obj.props.iter().all(|prop| match prop {
    PropOrSpread::Spread(_) => true,
    PropOrSpread::Prop(prop) => match &**prop {
      Prop::Getter(_) | Prop::Setter(_) => false,
      Prop::KeyValue(kv) => !is_proto_key(&kv.key),
      _ => true,
    },
  })
}

fn is_proto_key(key: &PropName) -> bool {
  match key {
    PropName::Ident(ident) => &*ident.sym == "__proto__",
    PropName::Str(name) => &*name.value == "__proto__",
    _ => false,
  }
}

/// Holes have no argument-list equivalent and read as `undefined` once spread.
fn is_inlinable_array(arr: &ArrayLit) -> bool {
  arr.elems.iter().all(Option::is_some)
}

/// An entry of an array literal or an argument list.
trait SpreadSlot: Sized + Spanned {
  fn spread_argument(&self) -> Option<&Expr>;

  fn spread_argument_mut(&mut self) -> Option<&mut Expr>;

  fn from_element(element: ExprOrSpread) -> Self;
}

impl SpreadSlot for ExprOrSpread {
  fn spread_argument(&self) -> Option<&Expr> {
    self.spread.map(|_| &*self.expr)
  }

  fn spread_argument_mut(&mut self) -> Option<&mut Expr> {
    match self.spread {
      Some(_) => Some(&mut self.expr),
      None => None,
    }
  }

  fn from_element(element: ExprOrSpread) -> Self {
    element
  }
}

impl SpreadSlot for Option<ExprOrSpread> {
  fn spread_argument(&self) -> Option<&Expr> {
    self.as_ref()?.spread_argument()
  }

  fn spread_argument_mut(&mut self) -> Option<&mut Expr> {
    self.as_mut()?.spread_argument_mut()
  }

  fn from_element(element: ExprOrSpread) -> Self {
    Some(element)
  }
}

struct SpreadNormalizer<'a> {
  compiler: &'a Compiler,
  results: &'a [Span],
  changes: usize,
  emptied_objects: Vec<Span>,
  changed_containers: Vec<Span>,
  errors: Vec<Error>,
}

impl<'a> SpreadNormalizer<'a> {
  fn new(compiler: &'a Compiler, results: &'a [Span]) -> Self {
    Self {
      compiler,
      results,
      changes: 0,
      emptied_objects: vec![],
      changed_containers: vec![],
      errors: vec![],
    }
  }

  fn normalize_props(&mut self, props: &mut Vec<PropOrSpread>) {
    let mut index = 0;
    while index < props.len() {
      let site = RewriteSite::new(index, props[index].span(), "SpreadElement");
      let action = match &mut props[index] {
        PropOrSpread::Spread(spread) => match unparen_mut(&mut spread.expr) {
          expr if !involves_rewrite(expr, self.results) => SpreadAction::Keep,
          expr if is_false_literal(expr) => SpreadAction::Remove,
          Expr::Object(inner) if is_inlinable_object(inner) => {
            SpreadAction::Inline(std::mem::take(&mut inner.props))
          }
          _ => SpreadAction::Keep,
        },
        PropOrSpread::Prop(_) => SpreadAction::Keep,
      };
      index = match self.apply(props, site, action) {
        Some(next) => next,
        None => return,
      };
    }
  }

  fn normalize_elements<T: SpreadSlot>(&mut self, elements: &mut Vec<T>) {
    let mut index = 0;
    while index < elements.len() {
      let site = RewriteSite::new(index, elements[index].span(), "ExprOrSpread");
      let action = match elements[index].spread_argument_mut().map(unparen_mut) {
        Some(expr) if !involves_rewrite(expr, self.results) => SpreadAction::Keep,
        Some(expr) if is_false_literal(expr) => SpreadAction::Remove,
        Some(Expr::Array(inner)) if is_inlinable_array(inner) => SpreadAction::Inline(
          std::mem::take(&mut inner.elems)
            .into_iter()
            .flatten()
            .map(T::from_element)
            .collect(),
        ),
        _ => SpreadAction::Keep,
      };
      index = match self.apply(elements, site, action) {
        Some(next) => next,
        None => return,
      };
    }
  }

  /// Returns the index to continue from, `None` once the list can't be
  /// trusted anymore. `site` is recorded before the entry is inspected.
  fn apply<T: Spanned>(
    &mut self,
    list: &mut Vec<T>,
    site: RewriteSite,
    action: SpreadAction<T>,
  ) -> Option<usize> {
    let replacement = match action {
      SpreadAction::Keep => return Some(site.index + 1),
      SpreadAction::Remove => vec![],
      SpreadAction::Inline(entries) => entries,
    };
    match site.splice(list, replacement, self.compiler) {
      Ok(inserted) => {
        self.changes += 1;
        // Inlined entries are not examined again in this pass
        Some(site.index + inserted)
      }
      Err(err) => {
        self.errors.push(err);
        None
      }
    }
  }

  fn track_container(&mut self, span: Span, changes_before: usize) {
    if self.changes > changes_before {
      self.changed_containers.push(span);
    }
  }
}

impl<'a> VisitMut for SpreadNormalizer<'a> {
  noop_visit_mut_type!();

  fn visit_mut_object_lit(&mut self, obj: &mut ObjectLit) {
    obj.visit_mut_children_with(self);
    let (had_entries, changes) = (!obj.props.is_empty(), self.changes);
    self.normalize_props(&mut obj.props);
    if had_entries && obj.props.is_empty() {
      self.emptied_objects.push(obj.span);
    }
    self.track_container(obj.span, changes);
  }

  fn visit_mut_array_lit(&mut self, arr: &mut ArrayLit) {
    arr.visit_mut_children_with(self);
    let changes = self.changes;
    self.normalize_elements(&mut arr.elems);
    self.track_container(arr.span, changes);
  }

  fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
    call.visit_mut_children_with(self);
    let changes = self.changes;
    self.normalize_elements(&mut call.args);
    self.track_container(call.span, changes);
  }

  fn visit_mut_new_expr(&mut self, new: &mut NewExpr) {
    new.visit_mut_children_with(self);
    let changes = self.changes;
    if let Some(args) = &mut new.args {
      self.normalize_elements(args);
    }
    self.track_container(new.span, changes);
  }
}

/// Read-only check for anything [SpreadNormalizer] would still change.
struct PendingSpreadFinder<'a> {
  results: &'a [Span],
  found: bool,
}

impl<'a> PendingSpreadFinder<'a> {
  fn check_elements<T: SpreadSlot>(&mut self, elements: &[T]) {
    self.found |= elements.iter().any(|element| {
      element.spread_argument().map(unparen).map_or(false, |expr| {
        let inlinable = matches!(expr, Expr::Array(inner) if is_inlinable_array(inner));
        involves_rewrite(expr, self.results) && (is_false_literal(expr) || inlinable)
      })
    });
  }
}

impl<'a> Visit for PendingSpreadFinder<'a> {
  noop_visit_type!();

  fn visit_object_lit(&mut self, obj: &ObjectLit) {
    self.found |= obj.props.iter().any(|prop| match prop {
      PropOrSpread::Spread(spread) => {
        let expr = unparen(&spread.expr);
        let inlinable = matches!(expr, Expr::Object(inner) if is_inlinable_object(inner));
        involves_rewrite(expr, self.results) && (is_false_literal(expr) || inlinable)
      }
      PropOrSpread::Prop(_) => false,
    });
    obj.visit_children_with(self);
  }

  fn visit_array_lit(&mut self, arr: &ArrayLit) {
    self.check_elements(&arr.elems);
    arr.visit_children_with(self);
  }

  fn visit_call_expr(&mut self, call: &CallExpr) {
    self.check_elements(&call.args);
    call.visit_children_with(self);
  }

  fn visit_new_expr(&mut self, new: &NewExpr) {
    if let Some(args) = &new.args {
      self.check_elements(args);
    }
    new.visit_children_with(self);
  }
}

struct EmptyObjectCollector<'a> {
  emptied: &'a FxHashSet<Span>,
  found: Vec<Span>,
}

impl<'a> Visit for EmptyObjectCollector<'a> {
  noop_visit_type!();

  fn visit_object_lit(&mut self, obj: &ObjectLit) {
    if obj.props.is_empty() && self.emptied.contains(&obj.span) {
      self.found.push(obj.span);
    }
    obj.visit_children_with(self);
  }
}
