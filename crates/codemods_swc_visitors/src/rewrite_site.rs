use codemods_compiler::Compiler;
use codemods_error::{Error, Result};
use swc_core::common::{Span, Spanned};

/// A position in a parent's child list that is about to be replaced by zero,
/// one or many nodes.
///
/// The site remembers the span of the node it was recorded for, so splicing
/// into a list that no longer holds that node at `index` is reported instead
/// of silently rewriting a neighbour.
#[derive(Debug, Clone, Copy)]
pub struct RewriteSite {
  pub index: usize,
  pub span: Span,
  pub node_kind: &'static str,
}

impl RewriteSite {
  pub fn new(index: usize, span: Span, node_kind: &'static str) -> Self {
    Self {
      index,
      span,
      node_kind,
    }
  }

  /// Replace the node at this site with `replacement`, returning how many
  /// nodes were inserted.
  pub fn splice<T: Spanned>(
    &self,
    list: &mut Vec<T>,
    replacement: Vec<T>,
    compiler: &Compiler,
  ) -> Result<usize> {
    let Some(current) = list.get(self.index) else {
      return Err(self.inconsistency(
        format!(
          "rewrite site {} is out of bounds for a list of {}",
          self.index,
          list.len()
        ),
        compiler,
      ));
    };
    if !self.span.is_dummy() && current.span() != self.span {
      return Err(self.inconsistency(
        format!("the node at index {} is not the one being rewritten", self.index),
        compiler,
      ));
    }

    let inserted = replacement.len();
    list.splice(self.index..=self.index, replacement);
    Ok(inserted)
  }

  fn inconsistency(&self, reason: String, compiler: &Compiler) -> Error {
    Error::structural_inconsistency(self.node_kind, reason, compiler.location(self.span))
  }
}

#[cfg(test)]
mod tests {
  use swc_core::{
    common::{BytePos, DUMMY_SP},
    ecma::ast::{EmptyStmt, Stmt},
  };

  use super::*;

  fn empty(lo: u32, hi: u32) -> Stmt {
    Stmt::Empty(EmptyStmt {
      span: Span::new(BytePos(lo), BytePos(hi), Default::default()),
    })
  }

  #[test]
  fn splices_zero_one_or_many() {
    let compiler = Compiler::default();
    let mut list = vec![empty(1, 2), empty(2, 3), empty(3, 4)];

    let site = RewriteSite::new(1, list[1].span(), "Stmt");
    let inserted = site
      .splice(&mut list, vec![empty(10, 11), empty(11, 12)], &compiler)
      .unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(
      list.iter().map(|stmt| stmt.span().lo.0).collect::<Vec<_>>(),
      vec![1, 10, 11, 3]
    );

    let site = RewriteSite::new(0, list[0].span(), "Stmt");
    assert_eq!(site.splice(&mut list, vec![], &compiler).unwrap(), 0);
    assert_eq!(list.len(), 3);
  }

  #[test]
  fn out_of_bounds_site_is_an_error() {
    let compiler = Compiler::default();
    let mut list = vec![empty(1, 2)];
    let err = RewriteSite::new(3, DUMMY_SP, "Stmt")
      .splice(&mut list, vec![], &compiler)
      .unwrap_err();
    assert_eq!(err.code(), "STRUCTURAL_INCONSISTENCY");
    assert_eq!(list.len(), 1);
  }

  #[test]
  fn moved_node_is_an_error() {
    let compiler = Compiler::default();
    let mut list = vec![empty(1, 2), empty(2, 3)];
    let site = RewriteSite::new(0, list[1].span(), "Stmt");
    let err = site.splice(&mut list, vec![], &compiler).unwrap_err();
    assert!(err.to_string().contains("not the one being rewritten"));
  }
}
