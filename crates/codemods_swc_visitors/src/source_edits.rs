use codemods_compiler::Compiler;
use codemods_error::{Error, Result};
use swc_core::common::{BytePos, SourceFile, Span};

/// Text that takes the place of a recorded range.
#[derive(Debug, Clone)]
pub enum Piece {
  /// The original text of a node, with the edits recorded inside it applied.
  Source(Span),
  /// The statements of `block` without the braces, moved to where the
  /// statement starting at `target` was. Continuation lines lose the extra
  /// indentation they had inside the block.
  BlockBody { block: Span, target: BytePos },
  /// Code printed from the tree. Continuation lines are indented like the
  /// line the replaced range starts on.
  Printed(String),
  Text(String),
}

#[derive(Debug, Clone)]
struct SourceEdit {
  span: Span,
  pieces: Vec<Piece>,
  /// A removed statement takes its line with it when nothing else is on it.
  removes_statement: bool,
}

/// Replacements recorded against the original source text.
///
/// Rendering copies the source verbatim outside the recorded ranges. Edits
/// nest: a [Piece::Source] renders the edits recorded inside its range, and
/// an edit inside a range that is replaced by other text is never rendered.
/// When two edits cover the same range the one recorded last wins.
#[derive(Debug, Default)]
pub struct SourceEdits {
  edits: Vec<SourceEdit>,
}

impl SourceEdits {
  pub fn replace(&mut self, span: Span, pieces: Vec<Piece>) {
    self.edits.push(SourceEdit {
      span,
      pieces,
      removes_statement: false,
    });
  }

  pub fn remove_statement(&mut self, span: Span) {
    self.edits.push(SourceEdit {
      span,
      pieces: vec![],
      removes_statement: true,
    });
  }

  pub fn extend(&mut self, other: SourceEdits) {
    self.edits.extend(other.edits);
  }

  /// Apply the edits to the text of `source_file`.
  pub fn render(&self, source_file: &SourceFile, compiler: &Compiler) -> Result<String> {
    let mut order = (0..self.edits.len()).collect::<Vec<_>>();
    // Outer ranges first, then the most recent edit of a range
    order.sort_by(|&a, &b| {
      let (a_span, b_span) = (self.edits[a].span, self.edits[b].span);
      a_span
        .lo
        .cmp(&b_span.lo)
        .then(b_span.hi.cmp(&a_span.hi))
        .then(b.cmp(&a))
    });

    let renderer = Renderer {
      src: &source_file.src,
      start: source_file.start_pos,
      compiler,
      edits: order.into_iter().map(|index| &self.edits[index]).collect(),
    };
    let mut output = String::with_capacity(renderer.src.len());
    renderer.render_range(0, renderer.src.len(), &mut output)?;
    Ok(output)
  }
}

struct Renderer<'a> {
  src: &'a str,
  start: BytePos,
  compiler: &'a Compiler,
  edits: Vec<&'a SourceEdit>,
}

impl<'a> Renderer<'a> {
  fn offsets(&self, span: Span) -> Result<(usize, usize)> {
    match (self.offset(span.lo), self.offset(span.hi)) {
      (Some(lo), Some(hi)) if !span.is_dummy() && lo <= hi => Ok((lo, hi)),
      _ => Err(Error::structural_inconsistency(
        "SourceEdit",
        "the edited range is not part of the source file",
        self.compiler.location(span),
      )),
    }
  }

  fn offset(&self, pos: BytePos) -> Option<usize> {
    let offset = pos.0.checked_sub(self.start.0)? as usize;
    (offset <= self.src.len() && self.src.is_char_boundary(offset)).then_some(offset)
  }

  fn render_range(&self, lo: usize, hi: usize, output: &mut String) -> Result<()> {
    let mut cursor = lo;
    for edit in &self.edits {
      let (start, end) = self.offsets(edit.span)?;
      if start >= hi {
        break;
      }
      // Nested in an edit already applied, or reaching past the range
      if start < cursor || end > hi {
        continue;
      }
      let (start, end) = if edit.removes_statement {
        self.statement_line(start, end, cursor, hi)
      } else {
        (start, end)
      };
      output.push_str(&self.src[cursor..start]);
      for piece in &edit.pieces {
        self.render_piece(piece, start, output)?;
      }
      cursor = end;
    }
    output.push_str(&self.src[cursor..hi]);
    Ok(())
  }

  fn render_piece(&self, piece: &Piece, start: usize, output: &mut String) -> Result<()> {
    match piece {
      Piece::Text(text) => output.push_str(text),
      Piece::Printed(code) => {
        let indent = indentation(self.src, start);
        let mut lines = code.split('\n');
        output.push_str(lines.next().unwrap_or_default());
        for line in lines {
          output.push('\n');
          if !line.is_empty() {
            output.push_str(indent);
          }
          output.push_str(line);
        }
      }
      Piece::Source(span) => {
        let (lo, hi) = self.offsets(*span)?;
        self.render_range(lo, hi, output)?;
      }
      Piece::BlockBody { block, target } => {
        let (lo, hi) = self.offsets(*block)?;
        if hi < lo + 2 {
          return Err(Error::structural_inconsistency(
            "BlockStmt",
            "the block has no braces",
            self.compiler.location(*block),
          ));
        }
        let inner = &self.src[lo + 1..hi - 1];
        let body_lo = hi - 1 - inner.trim_start().len();
        let body_hi = lo + 1 + inner.trim_end().len();
        if body_lo >= body_hi {
          return Ok(());
        }
        let mut body = String::new();
        self.render_range(body_lo, body_hi, &mut body)?;
        let target = self.offset(*target).unwrap_or(lo);
        let extra = indentation(self.src, body_lo)
          .len()
          .saturating_sub(indentation(self.src, target).len());
        output.push_str(&outdent(&body, extra));
      }
    }
    Ok(())
  }

  /// Widens the range of a removed statement over the whitespace around it,
  /// and over its whole line when the statement was alone on it. A blank line
  /// left between two blank lines goes too.
  fn statement_line(&self, start: usize, end: usize, cursor: usize, hi: usize) -> (usize, usize) {
    let bytes = self.src.as_bytes();
    let is_blank = |byte: u8| matches!(byte, b' ' | b'\t' | b'\r');

    let mut after = end;
    while after < hi && is_blank(bytes[after]) {
      after += 1;
    }
    if after < hi && bytes[after] != b'\n' {
      return (start, after);
    }

    let mut before = start;
    while before > cursor && is_blank(bytes[before - 1]) {
      before -= 1;
    }
    let starts_line = before == 0 || bytes[before - 1] == b'\n';
    if !starts_line || after == hi {
      return (before, after);
    }

    after += 1;
    let follows_blank_line = before == 0 || (before >= 2 && bytes[before - 2] == b'\n');
    if follows_blank_line {
      let mut next = after;
      while next < hi && is_blank(bytes[next]) {
        next += 1;
      }
      if next < hi && bytes[next] == b'\n' {
        after = next + 1;
      }
    }
    (before, after)
  }
}

/// The whitespace that starts the line holding `offset`.
fn indentation(src: &str, offset: usize) -> &str {
  let line_start = src[..offset].rfind('\n').map_or(0, |newline| newline + 1);
  let line = &src[line_start..];
  let width = line
    .bytes()
    .take_while(|byte| matches!(byte, b' ' | b'\t'))
    .count();
  &line[..width]
}

/// Strip up to `extra` columns of indentation from every line but the first.
/// Template literals are left alone since their lines are part of a value.
fn outdent(text: &str, extra: usize) -> String {
  if extra == 0 || text.contains('`') {
    return text.to_string();
  }
  let mut lines = text.split('\n');
  let mut output = lines.next().unwrap_or_default().to_string();
  for line in lines {
    output.push('\n');
    let strip = line
      .bytes()
      .take(extra)
      .take_while(|byte| matches!(byte, b' ' | b'\t'))
      .count();
    output.push_str(&line[strip..]);
  }
  output
}
