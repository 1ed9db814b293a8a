use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::input::StringInput;
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap};
use swc_core::ecma::ast::{Decl, Expr, ModuleItem, Program, Stmt};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config, Emitter};
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsSyntax, Parser, Syntax};

/// Parses a JSX-enabled source snippet for tests.
pub fn parse(source: &str) -> (Program, Lrc<SourceMap>, SingleThreadedComments) {
  let cm: Lrc<SourceMap> = Default::default();
  let source_file = cm.new_source_file(Lrc::new(FileName::Anon), source.to_string());
  let comments = SingleThreadedComments::default();

  let lexer = Lexer::new(
    Syntax::Es(EsSyntax {
      jsx: true,
      ..Default::default()
    }),
    Default::default(),
    StringInput::from(&*source_file),
    Some(&comments),
  );

  let mut parser = Parser::new_from(lexer);
  let program = parser
    .parse_program()
    .unwrap_or_else(|error| panic!("failed to parse test source: {error:?}"));

  (program, cm, comments)
}

/// Prints a program back to source, keeping comments.
pub fn print(program: &Program, cm: &Lrc<SourceMap>, comments: &SingleThreadedComments) -> String {
  let mut buffer = Vec::new();

  {
    let mut emitter = Emitter {
      cfg: Config::default(),
      cm: cm.clone(),
      comments: Some(comments),
      wr: JsWriter::new(cm.clone(), "\n", &mut buffer, None),
    };
    emitter.emit_program(program).unwrap();
  }

  String::from_utf8(buffer).unwrap()
}

/// Digs out the initializer of the first variable declaration, which is how
/// most tests stage the expression under test.
pub fn first_init_expr(program: &Program) -> &Expr {
  let statements: Vec<&Stmt> = match program {
    Program::Module(module) => module
      .body
      .iter()
      .filter_map(|item| match item {
        ModuleItem::Stmt(stmt) => Some(stmt),
        ModuleItem::ModuleDecl(_) => None,
      })
      .collect(),
    Program::Script(script) => script.body.iter().collect(),
  };

  statements
    .iter()
    .find_map(|stmt| match stmt {
      Stmt::Decl(Decl::Var(var)) => var.decls.first()?.init.as_deref(),
      _ => None,
    })
    .expect("test source should declare a variable with an initializer")
}
