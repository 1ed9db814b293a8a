use swc_core::common::comments::Comments;
use swc_core::common::{BytePos, Span, Spanned, DUMMY_SP};
use swc_core::ecma::ast::{
  Expr, ImportDecl, ImportSpecifier, JSXElement, JSXElementChild, JSXExpr, JSXExprContainer,
  JSXFragment, JSXText, Lit, ModuleDecl, ModuleExportName, ModuleItem, Program, Str,
};
use swc_core::ecma::visit::{noop_visit_mut_type, VisitMut, VisitMutWith};

use crate::config::TransformOptions;
use crate::constants::{STYLE_COLLECTOR_NAME, WRAPPER_COMPONENT_NAME};
use crate::extractor::{extract_rules, RuleAccumulator};
use crate::imports::{reattach_leading_comments, synthesize_style_imports};
use crate::matcher::{match_call_expr, match_jsx_element, MalformedWrapperError, WrapperMatch};

/// Visitor that strips wrapper nodes from one file.
///
/// Per wrapper: the pattern matcher classifies the node, the extractor
/// drains literal rules from the style subtree into the per-file
/// accumulator, and the wrapper is replaced in place by its content subtree.
/// At program exit the accumulator is flushed into injected stylesheet
/// imports when a stylesheet path is configured.
///
/// All state is private to one file's pass; nothing leaks across files.
pub struct StripVisitor<'a> {
  options: &'a TransformOptions,
  comments: &'a dyn Comments,
  program_start: BytePos,
  rules: RuleAccumulator,
  emptied_imports: Vec<Span>,
  errors: Vec<MalformedWrapperError>,
}

impl<'a> StripVisitor<'a> {
  pub fn new(
    options: &'a TransformOptions,
    comments: &'a dyn Comments,
    program_start: BytePos,
  ) -> Self {
    Self {
      options,
      comments,
      program_start,
      rules: RuleAccumulator::new(),
      emptied_imports: Vec::new(),
      errors: Vec::new(),
    }
  }

  /// Consumes the visitor, returning the accumulated rules and any contract
  /// violations encountered.
  pub fn finish(self) -> (RuleAccumulator, Vec<MalformedWrapperError>) {
    (self.rules, self.errors)
  }

  /// Extracts the style rules of a matched wrapper, then yields the
  /// expression that replaces it. Element-shape content wrapped in a bare
  /// expression container is unwrapped one further level.
  fn strip_wrapper(&mut self, matched: WrapperMatch) -> Option<Expr> {
    extract_rules(&matched, &mut self.rules);

    match matched {
      WrapperMatch::Element { content, .. } => jsx_child_to_expr(content),
      WrapperMatch::FactoryCall { content, .. }
      | WrapperMatch::CompactFactoryCall { content, .. } => Some(content),
    }
  }

  /// Rewrites wrapper nodes sitting in JSX child position, where the
  /// replacement has to be re-encoded as a child node.
  fn rewrite_wrapper_children(&mut self, children: &mut [JSXElementChild]) {
    for child in children {
      let JSXElementChild::JSXElement(element) = child else {
        continue;
      };

      match match_jsx_element(element) {
        Ok(Some(matched)) => {
          if let Some(replacement) = self.strip_wrapper(matched) {
            self.comments.take_leading(replacement.span_lo());
            *child = expr_to_jsx_child(replacement);
          }
        }
        Ok(None) => {}
        Err(error) => self.errors.push(error),
      }
    }
  }

  fn prune_emptied_imports(&mut self, program: &mut Program) {
    if self.emptied_imports.is_empty() {
      return;
    }

    let Program::Module(module) = program else {
      return;
    };

    // If the first statement is about to disappear, hand its leading
    // comments to the next survivor so they are not silently dropped.
    if let Some(first) = module.body.first() {
      if self.is_emptied_import(first) {
        let from = first.span_lo();
        if let Some(to) = module
          .body
          .iter()
          .find(|item| !self.is_emptied_import(item))
          .map(|item| item.span_lo())
        {
          reattach_leading_comments(self.comments, from, to);
        }
      }
    }

    let emptied = std::mem::take(&mut self.emptied_imports);
    module.body.retain(|item| match item {
      ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => !emptied.contains(&import.span),
      _ => true,
    });
  }

  fn is_emptied_import(&self, item: &ModuleItem) -> bool {
    match item {
      ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
        self.emptied_imports.contains(&import.span)
      }
      _ => false,
    }
  }
}

impl VisitMut for StripVisitor<'_> {
  noop_visit_mut_type!();

  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    expr.visit_mut_children_with(self);

    let matched = match &*expr {
      Expr::JSXElement(element) => match_jsx_element(element),
      Expr::Call(call) => match_call_expr(call),
      _ => Ok(None),
    };

    match matched {
      Ok(Some(matched)) => {
        if let Some(replacement) = self.strip_wrapper(matched) {
          *expr = replacement;
          // Comments carried by the stripped wrapper must not end up on
          // user markup.
          self.comments.take_leading(expr.span_lo());
        }
      }
      Ok(None) => {}
      Err(error) => self.errors.push(error),
    }
  }

  fn visit_mut_jsx_element(&mut self, element: &mut JSXElement) {
    element.visit_mut_children_with(self);
    self.rewrite_wrapper_children(&mut element.children);
  }

  fn visit_mut_jsx_fragment(&mut self, fragment: &mut JSXFragment) {
    fragment.visit_mut_children_with(self);
    self.rewrite_wrapper_children(&mut fragment.children);
  }

  fn visit_mut_import_decl(&mut self, import: &mut ImportDecl) {
    import.visit_mut_children_with(self);

    let before = import.specifiers.len();
    import
      .specifiers
      .retain(|specifier| !is_marker_specifier(specifier));

    // Imports emptied by marker removal become dangling and are dropped at
    // program exit. Imports that were already bare side-effect imports are
    // left alone.
    if import.specifiers.is_empty() && before > 0 {
      self.emptied_imports.push(import.span);
    }
  }

  fn visit_mut_program(&mut self, program: &mut Program) {
    program.visit_mut_children_with(self);

    self.prune_emptied_imports(program);

    match &self.options.style_sheet_path {
      Some(path) => {
        synthesize_style_imports(program, &self.rules, path, self.comments, self.program_start);
      }
      None => {
        if !self.rules.is_empty() {
          // Documented behavior: without a stylesheet path the extracted
          // rules are not routed anywhere; they surface only through
          // transform metadata.
          tracing::debug!(
            rules = self.rules.len(),
            "no styleSheetPath configured, extracted rules are not imported"
          );
        }
      }
    }
  }
}

fn is_marker_specifier(specifier: &ImportSpecifier) -> bool {
  let ImportSpecifier::Named(named) = specifier else {
    return false;
  };

  let name = match &named.imported {
    Some(ModuleExportName::Ident(imported)) => imported.sym.as_ref(),
    Some(ModuleExportName::Str(_)) => return false,
    None => named.local.sym.as_ref(),
  };

  name == WRAPPER_COMPONENT_NAME || name == STYLE_COLLECTOR_NAME
}

fn jsx_child_to_expr(child: JSXElementChild) -> Option<Expr> {
  match child {
    JSXElementChild::JSXExprContainer(JSXExprContainer { expr, .. }) => match expr {
      JSXExpr::Expr(expr) => Some(*expr),
      JSXExpr::JSXEmptyExpr(_) => None,
    },
    JSXElementChild::JSXElement(element) => Some(Expr::JSXElement(element)),
    JSXElementChild::JSXFragment(fragment) => Some(Expr::JSXFragment(fragment)),
    JSXElementChild::JSXText(text) => Some(Expr::Lit(Lit::Str(Str {
      span: text.span,
      value: text.value,
      raw: None,
    }))),
    JSXElementChild::JSXSpreadChild(_) => None,
  }
}

fn expr_to_jsx_child(expr: Expr) -> JSXElementChild {
  match expr {
    Expr::JSXElement(element) => JSXElementChild::JSXElement(element),
    Expr::JSXFragment(fragment) => JSXElementChild::JSXFragment(fragment),
    Expr::Lit(Lit::Str(text)) => JSXElementChild::JSXText(JSXText {
      span: text.span,
      value: text.value.clone(),
      raw: text.value,
    }),
    other => JSXElementChild::JSXExprContainer(JSXExprContainer {
      span: DUMMY_SP,
      expr: JSXExpr::Expr(Box::new(other)),
    }),
  }
}
