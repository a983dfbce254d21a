use codemods_compiler::Compiler;
use swc_core::{
  common::comments::SingleThreadedComments,
  ecma::ast::{Expr, ModuleItem, Stmt},
};

use crate::{remove_feature_flags, FeatureFlagConfig, FlagSet};

pub fn parse_expr(code: &str) -> Box<Expr> {
  let compiler = Compiler::default();
  let fm = compiler.create_source_file("expr.js", format!("{code};"));
  let module = compiler.parse(fm, Compiler::syntax_for("expr.js")).unwrap();
  match module.body.into_iter().next() {
    Some(ModuleItem::Stmt(Stmt::Expr(stmt))) => stmt.expr,
    other => panic!("`{code}` is not an expression statement: {other:?}"),
  }
}

/// Parse and print `code`, so it can be compared with printed output.
pub fn normalize_code(code: &str) -> String {
  let compiler = Compiler::default();
  let comments = SingleThreadedComments::default();
  let fm = compiler.create_source_file("expected.js", code.to_string());
  let module = compiler
    .parse_with_comments(fm, Compiler::syntax_for("expected.js"), Some(&comments))
    .unwrap();
  compiler.print(&module, Some(&comments)).unwrap()
}

/// Runs the engine over `code`, returning the printed tree and the original
/// text with the recorded edits spliced in.
fn run(code: &str, flags: &[&str]) -> (String, String) {
  let compiler = Compiler::default();
  let comments = SingleThreadedComments::default();
  let fm = compiler.create_source_file("input.js", code.to_string());
  let mut module = compiler
    .parse_with_comments(fm.clone(), Compiler::syntax_for("input.js"), Some(&comments))
    .unwrap();
  let report = remove_feature_flags(
    &mut module,
    &FlagSet::new(flags),
    Some(&comments),
    &compiler,
    &FeatureFlagConfig::default(),
  )
  .unwrap();
  let spliced = report.edits.render(&fm, &compiler).unwrap();
  (compiler.print(&module, Some(&comments)).unwrap(), spliced)
}

pub fn rewrite_with_flags(code: &str, flags: &[&str]) -> String {
  run(code, flags).0
}

pub fn splice_with_flags(code: &str, flags: &[&str]) -> String {
  run(code, flags).1
}

/// Checks the printed tree and the spliced source against `expected`.
#[track_caller]
pub fn assert_rewritten(input: &str, expected: &str) {
  let (printed, spliced) = run(input, &["FF_1_A"]);
  let expected = normalize_code(expected);
  assert_eq!(printed, expected, "input: {input}");
  assert_eq!(normalize_code(&spliced), expected, "spliced: {spliced}");
}

#[track_caller]
pub fn assert_unchanged(input: &str) {
  assert_rewritten(input, input);
}
