use swc_core::ecma::ast::{BinExpr, BinaryOp, Expr, Lit, UnaryExpr, UnaryOp};

use crate::{unparen, FlagSet};

/// Result of statically evaluating a condition while every configured flag is
/// assumed to be `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  True,
  False,
  Unknown,
}

impl Verdict {
  pub fn negate(self) -> Self {
    match self {
      Verdict::True => Verdict::False,
      Verdict::False => Verdict::True,
      Verdict::Unknown => Verdict::Unknown,
    }
  }
}

impl From<bool> for Verdict {
  fn from(value: bool) -> Self {
    if value {
      Verdict::True
    } else {
      Verdict::False
    }
  }
}

/// Three-valued evaluation of `expr`. The first matching rule wins:
///
/// 1. a flag reference is `True`
/// 2. `!flag` is `False`
/// 3. `flag === literal` / `flag !== literal` (either side) compares the literal
///    with `true`, `"true"` or `1`
/// 4. `a && b` short-circuits on a `False` left side, otherwise takes the
///    verdict of `b` when `a` is `True`
/// 5. `a || b` short-circuits on a `True` left side, otherwise takes the
///    verdict of `b` when `a` is `False`
/// 6. everything else is `Unknown`
///
/// The right operand of `&&`/`||` is never looked at to rescue an `Unknown`
/// left operand, and it is assumed to be free of side effects when skipped.
pub fn evaluate(expr: &Expr, flags: &FlagSet) -> Verdict {
  let expr = unparen(expr);

  if flags.is_flag(expr) {
    return Verdict::True;
  }

  match expr {
    Expr::Unary(UnaryExpr {
      op: UnaryOp::Bang,
      arg,
      ..
    }) if flags.is_flag(arg) => Verdict::False,
    Expr::Bin(bin) => evaluate_bin(bin, flags),
    _ => Verdict::Unknown,
  }
}

fn evaluate_bin(bin: &BinExpr, flags: &FlagSet) -> Verdict {
  match bin.op {
    BinaryOp::EqEq | BinaryOp::EqEqEq => evaluate_comparison(bin, flags),
    BinaryOp::NotEq | BinaryOp::NotEqEq => evaluate_comparison(bin, flags).negate(),
    BinaryOp::LogicalAnd => match evaluate(&bin.left, flags) {
      Verdict::False => Verdict::False,
      Verdict::True => evaluate(&bin.right, flags),
      Verdict::Unknown => Verdict::Unknown,
    },
    BinaryOp::LogicalOr => match evaluate(&bin.left, flags) {
      Verdict::True => Verdict::True,
      Verdict::False => evaluate(&bin.right, flags),
      Verdict::Unknown => Verdict::Unknown,
    },
    _ => Verdict::Unknown,
  }
}

/// Verdict of `flag == value`, with exactly one flag side.
fn evaluate_comparison(bin: &BinExpr, flags: &FlagSet) -> Verdict {
  let value = match (flags.is_flag(&bin.left), flags.is_flag(&bin.right)) {
    (true, false) => &bin.right,
    (false, true) => &bin.left,
    _ => return Verdict::Unknown,
  };

  match unparen(value) {
    Expr::Lit(Lit::Bool(value)) => value.value.into(),
    Expr::Lit(Lit::Str(value)) => (&*value.value == "true").into(),
    Expr::Lit(Lit::Num(value)) => (value.value == 1.0).into(),
    _ => Verdict::Unknown,
  }
}
