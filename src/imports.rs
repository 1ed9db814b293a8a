use swc_core::atoms::Atom;
use swc_core::common::comments::Comments;
use swc_core::common::{BytePos, Span, Spanned, SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
  CallExpr, Callee, Expr, ExprOrSpread, ExprStmt, Ident, Lit, ModuleItem, Program, Stmt, Str,
};

use crate::constants::STYLE_QUERY_PARAM;
use crate::encoder::rule_token;
use crate::extractor::RuleAccumulator;

/// Flushes the accumulator into side-effect imports of the virtual
/// stylesheet module, one per rule, in accumulation order, inserted before
/// all pre-existing statements.
///
/// The plain `require` form is deliberate: it evaluates eagerly under both
/// module-loading conventions, whereas a static import would break CJS
/// sources.
pub fn synthesize_style_imports(
  program: &mut Program,
  rules: &RuleAccumulator,
  style_sheet_path: &str,
  comments: &dyn Comments,
  program_start: BytePos,
) {
  if rules.is_empty() {
    return;
  }

  // A leading file comment sits on the first statement; detach it and
  // re-attach it at the program start so the injected imports never push it
  // down.
  relocate_leading_comments(program, comments, program_start);

  let statements: Vec<Stmt> = rules
    .iter()
    .enumerate()
    .map(|(index, rule)| {
      // The first injected statement carries the program start position so
      // relocated comments are emitted ahead of it.
      let span = if index == 0 {
        Span::new(program_start, program_start)
      } else {
        DUMMY_SP
      };
      require_statement(style_sheet_path, rule, span)
    })
    .collect();

  match program {
    Program::Module(module) => {
      for (index, statement) in statements.into_iter().enumerate() {
        module.body.insert(index, ModuleItem::Stmt(statement));
      }
    }
    Program::Script(script) => {
      for (index, statement) in statements.into_iter().enumerate() {
        script.body.insert(index, statement);
      }
    }
  }
}

fn relocate_leading_comments(program: &Program, comments: &dyn Comments, program_start: BytePos) {
  let first = match program {
    Program::Module(module) => module.body.first().map(|item| item.span_lo()),
    Program::Script(script) => script.body.first().map(|stmt| stmt.span_lo()),
  };

  if let Some(lo) = first {
    reattach_leading_comments(comments, lo, program_start);
  }
}

/// Moves the leading comments keyed at `from` onto `to`. No-op when the two
/// positions coincide or nothing is attached.
pub(crate) fn reattach_leading_comments(comments: &dyn Comments, from: BytePos, to: BytePos) {
  if from == to {
    return;
  }

  if let Some(relocated) = comments.take_leading(from) {
    comments.add_leading_comments(to, relocated);
  }
}

fn require_statement(style_sheet_path: &str, rule: &str, span: Span) -> Stmt {
  let token = rule_token(rule);
  let specifier = Expr::Lit(Lit::Str(Str {
    span: DUMMY_SP,
    value: Atom::from(format!("{style_sheet_path}?{STYLE_QUERY_PARAM}={token}")),
    raw: None,
  }));

  Stmt::Expr(ExprStmt {
    span,
    expr: Box::new(Expr::Call(CallExpr {
      span: DUMMY_SP,
      ctxt: SyntaxContext::empty(),
      callee: Callee::Expr(Box::new(Expr::Ident(Ident::new(
        Atom::from("require"),
        DUMMY_SP,
        SyntaxContext::empty(),
      )))),
      args: vec![ExprOrSpread {
        spread: None,
        expr: Box::new(specifier),
      }],
      type_args: None,
    })),
  })
}
