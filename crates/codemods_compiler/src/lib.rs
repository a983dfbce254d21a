use std::path::{Path, PathBuf};

use ast::EsVersion;
use codemods_error::{Error, Location};
use swc_common::{comments::Comments, sync::Lrc, FileName, SourceFile, SourceMap, Span, Spanned};
use swc_core::{
  common as swc_common,
  ecma::{ast, codegen as swc_ecma_codegen, parser as swc_ecma_parser},
};
use swc_ecma_codegen::{text_writer::JsWriter, Node};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

/// Owns the `SourceMap` of one codemod invocation and wraps the swc parser
/// and code generator around it.
#[derive(Default)]
pub struct Compiler {
  pub cm: Lrc<SourceMap>,
}

impl Compiler {
  pub fn create_source_file(&self, filename: &str, code: String) -> Lrc<SourceFile> {
    self
      .cm
      .new_source_file(FileName::Real(PathBuf::from(filename)).into(), code)
  }

  /// Pick the parser syntax from the file extension. Unknown extensions are
  /// parsed as JavaScript with JSX enabled, which is a superset of plain JS.
  pub fn syntax_for(filename: &str) -> Syntax {
    let extension = Path::new(filename)
      .extension()
      .and_then(|ext| ext.to_str())
      .unwrap_or_default();
    match extension {
      "ts" | "mts" | "cts" => Syntax::Typescript(Default::default()),
      "tsx" => {
        let mut syntax = Syntax::Typescript(Default::default());
        if let Syntax::Typescript(config) = &mut syntax {
          config.tsx = true;
        }
        syntax
      }
      _ => {
        let mut syntax = Syntax::Es(Default::default());
        if let Syntax::Es(config) = &mut syntax {
          config.jsx = true;
        }
        syntax
      }
    }
  }

  pub fn print(&self, ast: &ast::Module, comments: Option<&dyn Comments>) -> anyhow::Result<String> {
    self.print_node(ast, comments)
  }

  /// Print any node on its own, e.g. a single expression that replaces a range
  /// of the original source.
  pub fn print_node<N: Node>(&self, node: &N, comments: Option<&dyn Comments>) -> anyhow::Result<String> {
    let mut output = Vec::new();

    {
      let mut emitter = swc_ecma_codegen::Emitter {
        cfg: Default::default(),
        cm: self.cm.clone(),
        comments,
        wr: JsWriter::new(self.cm.clone(), "\n", &mut output, None),
      };

      node.emit_with(&mut emitter)?;
    }
    String::from_utf8(output).map_err(Into::into)
  }

  pub fn parse(&self, source_file: Lrc<SourceFile>, syntax: Syntax) -> codemods_error::Result<ast::Module> {
    self.parse_with_comments(source_file, syntax, None)
  }

  pub fn parse_with_comments(
    &self,
    source_file: Lrc<SourceFile>,
    syntax: Syntax,
    comments: Option<&dyn Comments>,
  ) -> codemods_error::Result<ast::Module> {
    let lexer = Lexer::new(
      syntax,
      EsVersion::latest(),
      StringInput::from(source_file.as_ref()),
      comments,
    );
    let mut parser = Parser::new_from(lexer);
    // Codemods always treat the input as a module
    let module = parser
      .parse_module()
      .map_err(|err| self.to_parse_error(&source_file, err))?;
    // Recovered errors would be printed back as different code, so they are fatal too
    if let Some(err) = parser.take_errors().into_iter().next() {
      return Err(self.to_parse_error(&source_file, err));
    }
    Ok(module)
  }

  /// Line and column of the start of `span`, if the span points into a file.
  pub fn location(&self, span: Span) -> Option<Location> {
    if span.is_dummy() {
      return None;
    }
    let is_known_position = self
      .cm
      .files()
      .iter()
      .any(|file| file.start_pos <= span.lo && span.lo <= file.end_pos);
    if !is_known_position {
      return None;
    }
    let loc = self.cm.lookup_char_pos(span.lo);
    Some(Location {
      line: loc.line,
      column: loc.col.0,
    })
  }

  fn to_parse_error(&self, source_file: &SourceFile, err: swc_ecma_parser::error::Error) -> Error {
    Error::parse_js_failed(
      source_file.name.to_string(),
      err.kind().msg(),
      self.location(err.span()),
    )
  }
}

#[cfg(test)]
mod tests {
  use swc_common::comments::SingleThreadedComments;

  use super::*;

  #[test]
  fn print_uses_lf_and_keeps_comments() {
    let compiler = Compiler::default();
    let comments = SingleThreadedComments::default();
    let fm = compiler.create_source_file("input.js", "// hello\r\nfoo();\r\n".to_string());
    let module = compiler
      .parse_with_comments(fm, Compiler::syntax_for("input.js"), Some(&comments))
      .unwrap();
    let code = compiler.print(&module, Some(&comments)).unwrap();
    assert_eq!(code, "// hello\nfoo();\n");
  }

  #[test]
  fn print_node_prints_a_lone_expression() {
    let compiler = Compiler::default();
    let fm = compiler.create_source_file("input.js", "f(a,   ...[b]);".to_string());
    let module = compiler.parse(fm, Compiler::syntax_for("input.js")).unwrap();
    let ast::ModuleItem::Stmt(ast::Stmt::Expr(stmt)) = &module.body[0] else {
      panic!("expected an expression statement");
    };
    let printed = compiler.print_node(&*stmt.expr, None).unwrap();
    assert!(printed.starts_with("f(a, ...["), "{printed}");
    assert!(printed.ends_with(')'), "{printed}");
  }

  #[test]
  fn parse_error_has_location() {
    let compiler = Compiler::default();
    let fm = compiler.create_source_file("broken.js", "const = 1;".to_string());
    let err = compiler
      .parse(fm, Compiler::syntax_for("broken.js"))
      .unwrap_err();
    assert_eq!(err.code(), "PARSE_ERROR");
    assert!(err.to_string().contains("broken.js at 1:"));
  }

  #[test]
  fn typescript_syntax_is_picked_by_extension() {
    assert!(matches!(Compiler::syntax_for("a.ts"), Syntax::Typescript(_)));
    assert!(matches!(Compiler::syntax_for("a.tsx"), Syntax::Typescript(config) if config.tsx));
    assert!(matches!(Compiler::syntax_for("a.js"), Syntax::Es(_)));
  }
}
