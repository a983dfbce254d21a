use rustc_hash::FxHashSet;
use swc_core::ecma::ast::{ComputedPropName, Expr, Lit, MemberExpr, MemberProp, OptChainBase};

use crate::unparen;

/// The configured flag names of one run. Every flag in the set is treated as
/// permanently enabled.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
  names: FxHashSet<String>,
}

impl FlagSet {
  /// Names are trimmed, empty names are dropped.
  pub fn new<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      names: names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.contains(name)
  }

  /// Names in a stable order, for logging.
  pub fn sorted_names(&self) -> Vec<&str> {
    let mut names = self.names.iter().map(String::as_str).collect::<Vec<_>>();
    names.sort_unstable();
    names
  }

  /// Whether `expr` reads a configured flag: `FLAG`, `anything.FLAG`,
  /// `anything["FLAG"]` or `anything?.FLAG`.
  pub fn is_flag(&self, expr: &Expr) -> bool {
    match unparen(expr) {
      Expr::Ident(ident) => self.contains(&ident.sym),
      Expr::Member(member) => self.is_flag_member(member),
      Expr::OptChain(opt_chain) => match &*opt_chain.base {
        OptChainBase::Member(member) => self.is_flag_member(member),
        _ => false,
      },
      _ => false,
    }
  }

  fn is_flag_member(&self, member: &MemberExpr) -> bool {
    match &member.prop {
      MemberProp::Ident(ident) => self.contains(&ident.sym),
      MemberProp::Computed(ComputedPropName { expr, .. }) => match &**expr {
        Expr::Lit(Lit::Str(name)) => self.contains(&name.value),
        _ => false,
      },
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::parse_expr;

  fn flags() -> FlagSet {
    FlagSet::new(["FF_1234_STORY", " FF_5678_STORY ", ""])
  }

  #[test]
  fn names_are_trimmed_and_empty_names_dropped() {
    let flags = flags();
    assert_eq!(flags.len(), 2);
    assert_eq!(flags.sorted_names(), vec!["FF_1234_STORY", "FF_5678_STORY"]);
    assert!(FlagSet::new(Vec::<String>::new()).is_empty());
  }

  #[test]
  fn bare_identifiers_and_member_accesses_are_flags() {
    let flags = flags();
    for code in [
      "FF_1234_STORY",
      "process.env.FF_1234_STORY",
      "context.FF_5678_STORY",
      "flags.FF_1234_STORY",
      "flags['FF_1234_STORY']",
      "flags?.FF_1234_STORY",
      "(config.FF_1234_STORY)",
    ] {
      assert!(flags.is_flag(&parse_expr(code)), "{code} should be a flag");
    }
  }

  #[test]
  fn other_shapes_are_not_flags() {
    let flags = flags();
    for code in [
      "OTHER_FLAG",
      "flags.FF_1234",
      "FF_1234_STORY.enabled",
      "flags[FF_1234_STORY]",
      "getFlag('FF_1234_STORY')",
      "'FF_1234_STORY'",
      "!FF_1234_STORY",
    ] {
      assert!(!flags.is_flag(&parse_expr(code)), "{code} should not be a flag");
    }
  }
}
