pub mod test_config;
pub mod tester;

use codemods_compiler::Compiler;
use swc_core::common::comments::SingleThreadedComments;

/// Parse and print `code` with the same syntax and printer the codemods use,
/// so hand-written expectations don't have to match the printer's layout.
pub fn normalize_code(code: &str, filename: &str) -> String {
  let compiler = Compiler::default();
  let comments = SingleThreadedComments::default();
  let source_file = compiler.create_source_file(filename, code.to_string());
  let module = compiler
    .parse_with_comments(source_file, Compiler::syntax_for(filename), Some(&comments))
    .unwrap_or_else(|err| panic!("{err}"));
  compiler.print(&module, Some(&comments)).unwrap()
}
