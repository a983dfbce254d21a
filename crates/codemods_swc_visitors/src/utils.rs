use swc_core::ecma::ast::{Expr, ModuleItem, Stmt};
use swc_core::common::Spanned;

/// Look through any number of parentheses, `((a))` -> `a`.
pub fn unparen(expr: &Expr) -> &Expr {
  match expr {
    Expr::Paren(paren) => unparen(&paren.expr),
    _ => expr,
  }
}

pub fn unparen_mut(expr: &mut Expr) -> &mut Expr {
  match expr {
    Expr::Paren(paren) => unparen_mut(&mut paren.expr),
    _ => expr,
  }
}

/// An entry of a statement list: either a plain `Stmt` (block and function
/// bodies) or a `ModuleItem` (module top level).
pub trait StmtListItem: Sized + Spanned {
  fn as_stmt_mut(&mut self) -> Option<&mut Stmt>;

  fn from_stmt(stmt: Stmt) -> Self;
}

impl StmtListItem for Stmt {
  fn as_stmt_mut(&mut self) -> Option<&mut Stmt> {
    Some(self)
  }

  fn from_stmt(stmt: Stmt) -> Self {
    stmt
  }
}

impl StmtListItem for ModuleItem {
  fn as_stmt_mut(&mut self) -> Option<&mut Stmt> {
    match self {
      ModuleItem::Stmt(stmt) => Some(stmt),
      ModuleItem::ModuleDecl(_) => None,
    }
  }

  fn from_stmt(stmt: Stmt) -> Self {
    ModuleItem::Stmt(stmt)
  }
}

/// Unwrap a block into its statements, any other statement is a list of one.
pub fn into_stmts(stmt: Stmt) -> Vec<Stmt> {
  match stmt {
    Stmt::Block(block) => block.stmts,
    stmt => vec![stmt],
  }
}
