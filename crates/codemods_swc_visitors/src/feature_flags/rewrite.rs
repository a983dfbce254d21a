use codemods_compiler::Compiler;
use codemods_error::Error;
use rustc_hash::FxHashSet;
use swc_core::{
  common::{comments::Comments, util::take::Take, BytePos, Span, Spanned},
  ecma::{
    ast::{
      ArrowExpr, BinaryOp, BlockStmt, BlockStmtOrExpr, Bool, EmptyStmt, Expr, ExprStmt, Lit, Module,
      ModuleItem, ParenExpr, Stmt,
    },
    visit::{noop_visit_mut_type, VisitMut, VisitMutWith},
  },
};

use crate::{
  comments::{
    move_leading_comments, move_leading_comments_to_trailing, move_trailing_comments_to_leading,
  },
  evaluate, into_stmts, FlagSet, Piece, RewriteSite, SourceEdits, StmtListItem, Verdict,
};

/// Replaces every decidable `if`, `?:`, `&&` and `||` with the branch its
/// verdict selects. Undecidable constructs are left untouched.
///
/// The walk is top-down and a replacement is visited again, so a decidable
/// construct exposed by a replacement is resolved in the same walk. Every
/// replacement is also recorded in `edits` against the original source text.
pub struct FlagRewriter<'a> {
  flags: &'a FlagSet,
  comments: Option<&'a dyn Comments>,
  compiler: &'a Compiler,
  pub rewrites: usize,
  pub edits: SourceEdits,
  /// Spans of the expressions that took the place of a decided construct.
  pub results: Vec<Span>,
  pub errors: Vec<Error>,
  /// Leading comments of deleted statements that had no neighbour to move to.
  orphaned_comments: Vec<BytePos>,
  /// Where an expression starts a statement or an arrow body. An object
  /// literal moved there would read as a block.
  statement_starts: FxHashSet<BytePos>,
}

struct ResolvedIf {
  span: Span,
  stmts: Vec<Stmt>,
}

impl<'a> FlagRewriter<'a> {
  pub fn new(flags: &'a FlagSet, comments: Option<&'a dyn Comments>, compiler: &'a Compiler) -> Self {
    Self {
      flags,
      comments,
      compiler,
      rewrites: 0,
      edits: SourceEdits::default(),
      results: vec![],
      errors: vec![],
      orphaned_comments: vec![],
      statement_starts: FxHashSet::default(),
    }
  }

  /// `if` statement sitting in a statement list: a block branch is unwrapped
  /// into its statements, a missing branch removes the statement.
  fn resolve_if_in_list(&mut self, stmt: &mut Stmt) -> Option<ResolvedIf> {
    let Stmt::If(if_stmt) = stmt else {
      return None;
    };
    let branch = match evaluate(&if_stmt.test, self.flags) {
      Verdict::True => Some(*if_stmt.cons.take()),
      Verdict::False => if_stmt.alt.take().map(|alt| *alt),
      Verdict::Unknown => return None,
    };
    match &branch {
      Some(Stmt::Block(block)) if block.stmts.is_empty() => self.edits.remove_statement(if_stmt.span),
      Some(Stmt::Block(block)) => self.edits.replace(
        if_stmt.span,
        vec![Piece::BlockBody {
          block: block.span,
          target: if_stmt.span.lo,
        }],
      ),
      Some(kept) => self.edits.replace(if_stmt.span, vec![Piece::Source(kept.span())]),
      None => self.edits.remove_statement(if_stmt.span),
    }
    let stmts = branch.map(into_stmts).unwrap_or_default();
    tracing::debug!(
      kept = stmts.len(),
      "resolved if statement at {:?}",
      self.compiler.location(if_stmt.span)
    );
    Some(ResolvedIf {
      span: if_stmt.span,
      stmts,
    })
  }

  /// `if` statement in a single statement slot (`if (a) if (FLAG) ...`,
  /// loop bodies, labels): the branch is kept as is, a missing branch becomes
  /// an empty statement.
  fn resolve_if_in_slot(&mut self, stmt: &mut Stmt) -> Option<Stmt> {
    let Stmt::If(if_stmt) = stmt else {
      return None;
    };
    let replacement = match evaluate(&if_stmt.test, self.flags) {
      Verdict::True => *if_stmt.cons.take(),
      Verdict::False => match if_stmt.alt.take() {
        Some(alt) => *alt,
        None => Stmt::Empty(EmptyStmt { span: if_stmt.span }),
      },
      Verdict::Unknown => return None,
    };
    let piece = match &replacement {
      Stmt::Empty(_) => Piece::Text(";".into()),
      kept => Piece::Source(kept.span()),
    };
    self.edits.replace(if_stmt.span, vec![piece]);
    move_leading_comments(self.comments, if_stmt.span.lo, replacement.span().lo);
    Some(replacement)
  }

  fn resolve_expr(&mut self, expr: &mut Expr) -> Option<Expr> {
    let span = expr.span();
    let (replacement, piece) = match expr {
      Expr::Cond(cond) => match evaluate(&cond.test, self.flags) {
        Verdict::True => kept(cond.cons.take()),
        Verdict::False => kept(cond.alt.take()),
        Verdict::Unknown => return None,
      },
      Expr::Bin(bin) if bin.op == BinaryOp::LogicalAnd => match evaluate(&bin.left, self.flags) {
        Verdict::True => kept(bin.right.take()),
        // Keeps the span so a spread of it can be recognized and dropped later
        Verdict::False => (
          Expr::Lit(Lit::Bool(Bool {
            span: bin.span,
            value: false,
          })),
          Piece::Text("false".into()),
        ),
        Verdict::Unknown => return None,
      },
      Expr::Bin(bin) if bin.op == BinaryOp::LogicalOr => match evaluate(&bin.left, self.flags) {
        Verdict::True => kept(bin.left.take()),
        Verdict::False => kept(bin.right.take()),
        Verdict::Unknown => return None,
      },
      _ => return None,
    };

    let at_statement_start = self.statement_starts.contains(&span.lo);
    let (replacement, pieces) = if at_statement_start
      && matches!(replacement, Expr::Object(_) | Expr::Fn(_) | Expr::Class(_))
    {
      let wrapped = Expr::Paren(ParenExpr {
        span: replacement.span(),
        expr: Box::new(replacement),
      });
      (wrapped, vec![Piece::Text("(".into()), piece, Piece::Text(")".into())])
    } else {
      (replacement, vec![piece])
    };
    if at_statement_start {
      self.statement_starts.insert(replacement.span().lo);
    }
    self.edits.replace(span, pieces);
    self.results.push(replacement.span());
    Some(replacement)
  }

  fn rewrite_stmt_list<T>(&mut self, items: &mut Vec<T>)
  where
    T: StmtListItem + VisitMutWith<Self>,
  {
    let mut index = 0;
    while index < items.len() {
      let resolved = items[index]
        .as_stmt_mut()
        .and_then(|stmt| self.resolve_if_in_list(stmt));

      let Some(ResolvedIf { span, stmts }) = resolved else {
        items[index].visit_mut_with(self);
        index += 1;
        continue;
      };

      if let Some(first) = stmts.first() {
        move_leading_comments(self.comments, span.lo, first.span().lo);
      }
      let replacement = stmts.into_iter().map(T::from_stmt).collect();
      match RewriteSite::new(index, span, "IfStmt").splice(items, replacement, self.compiler) {
        Ok(0) => {
          if let Some(next) = items.get(index) {
            move_leading_comments(self.comments, span.lo, next.span().lo);
          } else if let Some(previous) = index.checked_sub(1).and_then(|i| items.get(i)) {
            move_leading_comments_to_trailing(self.comments, span.lo, previous.span().hi);
          } else {
            // Handed to the enclosing block or module once it is visited
            self.orphaned_comments.push(span.lo);
          }
          self.rewrites += 1;
        }
        // The index is not advanced, the spliced statements are examined next
        Ok(_) => self.rewrites += 1,
        Err(err) => {
          self.errors.push(err);
          return;
        }
      }
    }
  }
}

fn kept(expr: Box<Expr>) -> (Expr, Piece) {
  let piece = Piece::Source(expr.span());
  (*expr, piece)
}

impl<'a> VisitMut for FlagRewriter<'a> {
  noop_visit_mut_type!();

  fn visit_mut_module(&mut self, module: &mut Module) {
    module.visit_mut_children_with(self);
    for pos in std::mem::take(&mut self.orphaned_comments) {
      move_leading_comments_to_trailing(self.comments, pos, module.span.hi);
    }
  }

  fn visit_mut_block_stmt(&mut self, block: &mut BlockStmt) {
    let orphaned = self.orphaned_comments.len();
    block.visit_mut_children_with(self);
    if self.orphaned_comments.len() == orphaned || block.span.is_dummy() {
      return;
    }
    // The code generator prints comments leading the closing brace inside the block
    let closing = block.span.hi - BytePos(1);
    for pos in self.orphaned_comments.drain(orphaned..).rev() {
      move_leading_comments(self.comments, pos, closing);
    }
    if block.stmts.is_empty() {
      move_trailing_comments_to_leading(self.comments, block.span.lo + BytePos(1), closing);
    }
  }

  fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
    self.rewrite_stmt_list(items);
  }

  fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
    self.rewrite_stmt_list(stmts);
  }

  fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
    while let Some(replacement) = self.resolve_if_in_slot(stmt) {
      *stmt = replacement;
      self.rewrites += 1;
    }
    stmt.visit_mut_children_with(self);
  }

  fn visit_mut_expr_stmt(&mut self, stmt: &mut ExprStmt) {
    self.statement_starts.insert(stmt.expr.span().lo);
    stmt.visit_mut_children_with(self);
  }

  fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
    if let BlockStmtOrExpr::Expr(body) = &*arrow.body {
      self.statement_starts.insert(body.span().lo);
    }
    arrow.visit_mut_children_with(self);
  }

  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    while let Some(replacement) = self.resolve_expr(expr) {
      move_leading_comments(self.comments, expr.span().lo, replacement.span().lo);
      tracing::trace!("resolved expression at {:?}", self.compiler.location(expr.span()));
      *expr = replacement;
      self.rewrites += 1;
    }
    expr.visit_mut_children_with(self);
  }
}

#[cfg(test)]
mod tests {
  use crate::test_utils::{assert_rewritten, assert_unchanged, rewrite_with_flags, splice_with_flags};

  #[test]
  fn if_statements() {
    assert_rewritten(
      "if (flags.FF_1_A) execute(); else fallback();",
      "execute();",
    );
    assert_rewritten(
      "if (!process.env.FF_1_A) { executeLegacy() } else { execute() }",
      "execute()",
    );
    assert_rewritten("if (!FF_1_A) { legacy(); }\nafter();", "after();");
    assert_rewritten(
      "if (FF_1_A) { one(); two(); } else { three(); }",
      "one(); two();",
    );
  }

  #[test]
  fn else_if_chains_resolve_in_one_walk() {
    assert_rewritten(
      "if (!FF_1_A) a(); else if (FF_1_A === 'false') b(); else c();",
      "c();",
    );
    assert_rewritten(
      "if (!FF_1_A) a(); else if (other) b(); else c();",
      "if (other) b(); else c();",
    );
  }

  #[test]
  fn if_in_single_statement_slot() {
    assert_rewritten(
      "if (a) if (FF_1_A) { b(); c(); }",
      "if (a) { b(); c(); }",
    );
    assert_rewritten("while (a) if (!FF_1_A) b();", "while (a) ;");
    assert_rewritten("for (;;) if (FF_1_A) break;", "for (;;) break;");
  }

  #[test]
  fn nested_decidable_statements() {
    assert_rewritten(
      "function f() { if (FF_1_A) { if (FF_1_A) { return a; } return b; } else { return c; } }",
      "function f() { return a; return b; }",
    );
    assert_rewritten(
      "function f() { if (FF_1_A) { if (other) { return a; } return b; } else { return c; } }",
      "function f() { if (other) { return a; } return b; }",
    );
  }

  #[test]
  fn ternaries_and_logical_expressions() {
    assert_rewritten("const x = flags.FF_1_A ? 1 : 2;", "const x = 1;");
    assert_rewritten("const x = !flags.FF_1_A ? 1 : 2;", "const x = 2;");
    assert_rewritten("const x = context.FF_1_A && { a: 1 };", "const x = { a: 1 };");
    assert_rewritten("const x = !context.FF_1_A && { a: 1 };", "const x = false;");
    assert_rewritten("const z = !config.FF_1_A || fallback();", "const z = fallback();");
    assert_rewritten("const z = config.FF_1_A || fallback();", "const z = config.FF_1_A;");
  }

  #[test]
  fn undecidable_left_side_still_rewrites_inner_operands() {
    assert_rewritten("if (FF_1_A && other) run();", "if (other) run();");
    assert_rewritten("x = a ? (FF_1_A ? b : c) : d;", "x = a ? (b) : d;");
  }

  #[test]
  fn unknown_verdicts_leave_code_alone() {
    assert_unchanged("if (otherCondition) execute();");
    assert_unchanged("status.code = status.code._ || status.code;");
    assert_unchanged("const regularFlag = isEnabled ? a : b;");
    assert_unchanged("const underscore = someObj._ && something;");
    assert_unchanged("if (flags.FF_1234) { doSomething(); }");
  }

  #[test]
  fn comments_of_replaced_if_statements_are_kept() {
    let output = rewrite_with_flags(
      "before();\n// keep me\nif (FF_1_A) {\n  execute();\n}\n/* and me */\nif (!FF_1_A) legacy();\nafter();\n",
      &["FF_1_A"],
    );
    let keep = output.find("// keep me").expect("leading comment of kept branch");
    let execute = output.find("execute();").unwrap();
    let and_me = output.find("/* and me */").expect("leading comment of removed statement");
    let after = output.find("after();").unwrap();
    assert!(keep < execute);
    assert!(execute < and_me && and_me < after);
    assert!(!output.contains("legacy"));
  }

  #[test]
  fn comments_of_a_lone_deleted_statement_are_kept() {
    let code = "function f() {\n  // lonely comment\n  if (!FF_1_A) a();\n}\n";
    for output in [rewrite_with_flags(code, &["FF_1_A"]), splice_with_flags(code, &["FF_1_A"])] {
      assert!(output.contains("// lonely comment"), "{output}");
      assert!(!output.contains("a()"), "{output}");
    }
    assert_eq!(
      splice_with_flags(code, &["FF_1_A"]),
      "function f() {\n  // lonely comment\n}\n"
    );

    let code = "while (x) { // slot\n if (!FF_1_A) a(); }";
    for output in [rewrite_with_flags(code, &["FF_1_A"]), splice_with_flags(code, &["FF_1_A"])] {
      assert!(output.contains("// slot"), "{output}");
      assert!(!output.contains("a()"), "{output}");
    }

    let output = rewrite_with_flags("after();\n/* last */\nif (!FF_1_A) a();\n", &["FF_1_A"]);
    assert!(output.contains("/* last */"), "{output}");
  }

  #[test]
  fn replacements_at_a_statement_start_keep_their_meaning() {
    assert_rewritten(
      "const f = () => FF_1_A ? { a: 1 } : null;",
      "const f = () => ({ a: 1 });",
    );
    assert_rewritten("FF_1_A && function () {};", "(function () {});");
    assert_rewritten("const g = () => FF_1_A && h;", "const g = () => h;");
  }
}
