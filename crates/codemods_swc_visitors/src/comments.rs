use std::cell::RefCell;

use rustc_hash::FxHashSet;
use swc_core::common::{
  comments::{Comment, Comments},
  BytePos, Span,
};

/// Re-attach the leading comments found at `from` in front of `to`, ahead of
/// any comments already leading `to`.
pub(crate) fn move_leading_comments(comments: Option<&dyn Comments>, from: BytePos, to: BytePos) {
  let Some(comments) = comments else {
    return;
  };
  if from == to || to == BytePos(0) {
    return;
  }
  if let Some(moved) = comments.take_leading(from) {
    let existing = comments.take_leading(to);
    comments.add_leading_comments(to, moved);
    if let Some(existing) = existing {
      comments.add_leading_comments(to, existing);
    }
  }
}

/// Used when the node owning the comments is deleted and nothing follows it.
pub(crate) fn move_leading_comments_to_trailing(
  comments: Option<&dyn Comments>,
  from: BytePos,
  to: BytePos,
) {
  let Some(comments) = comments else {
    return;
  };
  if to == BytePos(0) {
    return;
  }
  if let Some(moved) = comments.take_leading(from) {
    comments.add_trailing_comments(to, moved);
  }
}

/// Moves the comments trailing `from` in front of the comments leading `to`.
pub(crate) fn move_trailing_comments_to_leading(
  comments: Option<&dyn Comments>,
  from: BytePos,
  to: BytePos,
) {
  let Some(comments) = comments else {
    return;
  };
  if to == BytePos(0) {
    return;
  }
  if let Some(moved) = comments.take_trailing(from) {
    let existing = comments.take_leading(to);
    comments.add_leading_comments(to, moved);
    if let Some(existing) = existing {
      comments.add_leading_comments(to, existing);
    }
  }
}

/// Read-only view handed to the code generator when a single node is printed
/// into the middle of the original source. Nothing is removed from the
/// underlying comments, each position is handed out once, and the comments
/// around the node itself are left to the surrounding source text.
pub(crate) struct PrintedNodeComments<'a> {
  inner: &'a dyn Comments,
  taken_leading: RefCell<FxHashSet<BytePos>>,
  taken_trailing: RefCell<FxHashSet<BytePos>>,
}

impl<'a> PrintedNodeComments<'a> {
  pub(crate) fn new(inner: &'a dyn Comments, node: Span) -> Self {
    Self {
      inner,
      taken_leading: RefCell::new(FxHashSet::from_iter([node.lo])),
      taken_trailing: RefCell::new(FxHashSet::from_iter([node.hi])),
    }
  }
}

impl Comments for PrintedNodeComments<'_> {
  fn add_leading(&self, _pos: BytePos, _cmt: Comment) {}

  fn add_leading_comments(&self, _pos: BytePos, _comments: Vec<Comment>) {}

  fn has_leading(&self, pos: BytePos) -> bool {
    !self.taken_leading.borrow().contains(&pos) && self.inner.has_leading(pos)
  }

  fn move_leading(&self, _from: BytePos, _to: BytePos) {}

  fn take_leading(&self, pos: BytePos) -> Option<Vec<Comment>> {
    if !self.taken_leading.borrow_mut().insert(pos) {
      return None;
    }
    self.inner.get_leading(pos)
  }

  fn get_leading(&self, pos: BytePos) -> Option<Vec<Comment>> {
    if self.taken_leading.borrow().contains(&pos) {
      return None;
    }
    self.inner.get_leading(pos)
  }

  fn add_trailing(&self, _pos: BytePos, _cmt: Comment) {}

  fn add_trailing_comments(&self, _pos: BytePos, _comments: Vec<Comment>) {}

  fn has_trailing(&self, pos: BytePos) -> bool {
    !self.taken_trailing.borrow().contains(&pos) && self.inner.has_trailing(pos)
  }

  fn move_trailing(&self, _from: BytePos, _to: BytePos) {}

  fn take_trailing(&self, pos: BytePos) -> Option<Vec<Comment>> {
    if !self.taken_trailing.borrow_mut().insert(pos) {
      return None;
    }
    self.inner.get_trailing(pos)
  }

  fn get_trailing(&self, pos: BytePos) -> Option<Vec<Comment>> {
    if self.taken_trailing.borrow().contains(&pos) {
      return None;
    }
    self.inner.get_trailing(pos)
  }

  fn add_pure_comment(&self, _pos: BytePos) {}
}

#[cfg(test)]
mod tests {
  use swc_core::common::{
    comments::{CommentKind, SingleThreadedComments},
    DUMMY_SP,
  };

  use super::*;

  fn line_comment(text: &str) -> Comment {
    Comment {
      kind: CommentKind::Line,
      span: DUMMY_SP,
      text: text.into(),
    }
  }

  #[test]
  fn printed_node_comments_are_not_consumed() {
    let comments = SingleThreadedComments::default();
    comments.add_leading(BytePos(1), line_comment("outside"));
    comments.add_leading(BytePos(5), line_comment("inside"));
    let node = Span::new(BytePos(1), BytePos(9), Default::default());

    let view = PrintedNodeComments::new(&comments, node);
    assert!(view.take_leading(BytePos(1)).is_none());
    assert_eq!(view.take_leading(BytePos(5)).map(|c| c.len()), Some(1));
    assert!(view.take_leading(BytePos(5)).is_none());

    assert!(comments.has_leading(BytePos(1)));
    assert!(comments.has_leading(BytePos(5)));
  }

  #[test]
  fn trailing_comments_move_ahead_of_leading_ones() {
    let comments = SingleThreadedComments::default();
    comments.add_trailing(BytePos(2), line_comment("first"));
    comments.add_leading(BytePos(8), line_comment("second"));
    move_trailing_comments_to_leading(Some(&comments), BytePos(2), BytePos(8));

    let texts: Vec<_> = comments
      .get_leading(BytePos(8))
      .unwrap_or_default()
      .into_iter()
      .map(|c| c.text.to_string())
      .collect();
    assert_eq!(texts, ["first", "second"]);
    assert!(!comments.has_trailing(BytePos(2)));
  }
}
