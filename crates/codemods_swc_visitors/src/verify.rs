use codemods_compiler::Compiler;
use codemods_error::Error;
use swc_core::{
  common::{Span, Spanned},
  ecma::{
    ast::{Expr, Invalid, Module, Pat, Stmt},
    visit::{noop_visit_type, Visit, VisitWith},
  },
};

/// Walks a rewritten module looking for nodes a rewrite left half-moved: the
/// `Invalid` placeholders swc puts behind a taken expression or pattern, and
/// span-less empty statements standing in for a taken statement.
pub struct StructureVerifier<'a> {
  compiler: &'a Compiler,
  enclosing_stmt: Option<Span>,
  pub errors: Vec<Error>,
}

impl<'a> StructureVerifier<'a> {
  pub fn new(compiler: &'a Compiler) -> Self {
    Self {
      compiler,
      enclosing_stmt: None,
      errors: vec![],
    }
  }

  pub fn verify(module: &Module, compiler: &'a Compiler) -> Vec<Error> {
    let mut verifier = Self::new(compiler);
    module.visit_with(&mut verifier);
    verifier.errors
  }

  fn report(&mut self, node_kind: &'static str, reason: &str, span: Span) {
    let span = if span.is_dummy() {
      self.enclosing_stmt.unwrap_or(span)
    } else {
      span
    };
    self.errors.push(Error::structural_inconsistency(
      node_kind,
      reason.to_string(),
      self.compiler.location(span),
    ));
  }
}

impl<'a> Visit for StructureVerifier<'a> {
  noop_visit_type!();

  fn visit_stmt(&mut self, stmt: &Stmt) {
    if let Stmt::Empty(empty) = stmt {
      if empty.span.is_dummy() {
        self.report("Stmt", "a statement was taken out of the tree and never replaced", empty.span);
      }
    }
    let parent = self.enclosing_stmt.replace(stmt.span());
    stmt.visit_children_with(self);
    self.enclosing_stmt = parent;
  }

  fn visit_expr(&mut self, expr: &Expr) {
    if let Expr::Invalid(Invalid { span }) = expr {
      self.report("Expr", "an expression was taken out of the tree and never replaced", *span);
      return;
    }
    expr.visit_children_with(self);
  }

  fn visit_pat(&mut self, pat: &Pat) {
    if let Pat::Invalid(Invalid { span }) = pat {
      self.report("Pat", "a pattern was taken out of the tree and never replaced", *span);
      return;
    }
    pat.visit_children_with(self);
  }
}
