use indexmap::IndexSet;
use swc_core::ecma::ast::{
  ArrayLit, Callee, Expr, JSXElement, JSXElementChild, JSXElementName, JSXExpr, JSXExprContainer,
  Lit, Prop, PropName, PropOrSpread,
};

use crate::constants::{SINGLE_FACTORY_NAME, STYLE_COLLECTOR_NAME};
use crate::matcher::{is_element_factory, is_runtime_factory, WrapperMatch};

/// Per-file accumulator of extracted style rules. Insertion-ordered and
/// deduplicated by exact value, so a rule is never emitted twice within one
/// file. Created empty at pass entry and discarded at pass exit; never
/// carried across files.
#[derive(Debug, Default)]
pub struct RuleAccumulator {
  rules: IndexSet<String>,
}

impl RuleAccumulator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a rule unless an identical one was already collected. Returns
  /// whether the rule was newly inserted.
  pub fn insert(&mut self, rule: impl Into<String>) -> bool {
    self.rules.insert(rule.into())
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.rules.iter().map(String::as_str)
  }

  pub fn into_rules(self) -> Vec<String> {
    self.rules.into_iter().collect()
  }
}

/// Drains the literal rules of a matched wrapper's style subtree into the
/// accumulator. Literal strings are collected; identifier references are
/// left untouched since resolving them is out of scope here. The subtree
/// itself is excised when the rewriter replaces the wrapper.
pub fn extract_rules(matched: &WrapperMatch, rules: &mut RuleAccumulator) {
  match matched {
    WrapperMatch::Element { styles, .. } => collect_from_style_element(styles, rules),
    WrapperMatch::FactoryCall { styles, .. } | WrapperMatch::CompactFactoryCall { styles, .. } => {
      collect_from_expr(styles, rules)
    }
  }
}

fn collect_from_style_element(element: &JSXElement, rules: &mut RuleAccumulator) {
  if !matches!(
      &element.opening.name,
      JSXElementName::Ident(name) if name.sym.as_ref() == STYLE_COLLECTOR_NAME
  ) {
    return;
  }

  let Some(JSXElementChild::JSXExprContainer(JSXExprContainer { expr, .. })) =
    element.children.first()
  else {
    return;
  };

  if let JSXExpr::Expr(styles) = expr {
    collect_from_expr(styles, rules);
  }
}

/// Walks the rule list of a compiled-styles subtree. Handles the bare array
/// form as well as the style collector re-encoded as a factory call.
fn collect_from_expr(expr: &Expr, rules: &mut RuleAccumulator) {
  match expr {
    Expr::Lit(Lit::Str(rule)) => {
      rules.insert(rule.value.as_ref());
    }
    Expr::Array(array) => collect_from_array(array, rules),
    Expr::Call(call) => {
      if let Callee::Expr(callee) = &call.callee {
        if is_element_factory(callee) {
          if let Some(arg) = call.args.get(2) {
            collect_from_expr(&arg.expr, rules);
          }
          return;
        }
      }

      if is_runtime_factory(call, SINGLE_FACTORY_NAME) {
        if let Some(children) = runtime_factory_children(call) {
          collect_from_expr(children, rules);
        }
      }
    }
    _ => {}
  }
}

fn collect_from_array(array: &ArrayLit, rules: &mut RuleAccumulator) {
  for element in array.elems.iter().flatten() {
    if element.spread.is_some() {
      continue;
    }

    if let Expr::Lit(Lit::Str(rule)) = &*element.expr {
      rules.insert(rule.value.as_ref());
    }
  }
}

fn runtime_factory_children<'a>(call: &'a swc_core::ecma::ast::CallExpr) -> Option<&'a Expr> {
  let Expr::Object(object) = &*call.args.get(1)?.expr else {
    return None;
  };

  object.props.iter().find_map(|prop| match prop {
    PropOrSpread::Prop(prop) => match &**prop {
      Prop::KeyValue(kv) => match &kv.key {
        PropName::Ident(key) if key.sym.as_ref() == "children" => Some(&*kv.value),
        _ => None,
      },
      _ => None,
    },
    PropOrSpread::Spread(_) => None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::matcher::{match_call_expr, match_jsx_element};
  use crate::test_utils::{first_init_expr, parse};

  fn extract(source: &str) -> Vec<String> {
    let (program, _, _) = parse(source);
    let matched = match first_init_expr(&program) {
      Expr::JSXElement(element) => match_jsx_element(element),
      Expr::Call(call) => match_call_expr(call),
      other => panic!("unexpected expression under test: {other:?}"),
    }
    .unwrap()
    .expect("should match a wrapper");

    let mut rules = RuleAccumulator::new();
    extract_rules(&matched, &mut rules);
    rules.into_rules()
  }

  #[test]
  fn accumulator_deduplicates_but_keeps_order() {
    let mut rules = RuleAccumulator::new();
    assert!(rules.insert("b{}"));
    assert!(rules.insert("a{}"));
    assert!(!rules.insert("b{}"));
    assert_eq!(rules.into_rules(), vec!["b{}".to_string(), "a{}".to_string()]);
  }

  #[test]
  fn extracts_literals_from_element_shape() {
    let rules = extract(
      "const C = <CC>\n  <CS>{['a{}', 'b{}']}</CS>\n  {<div />}\n</CC>;",
    );
    assert_eq!(rules, vec!["a{}".to_string(), "b{}".to_string()]);
  }

  #[test]
  fn leaves_identifier_references_untouched() {
    let rules = extract(
      "const C = <CC>\n  <CS>{[_a, 'b{}']}</CS>\n  {<div />}\n</CC>;",
    );
    assert_eq!(rules, vec!["b{}".to_string()]);
  }

  #[test]
  fn extracts_from_factory_call_array() {
    let rules = extract(
      "const C = React.createElement(CC, null, ['a{}'], React.createElement('div'));",
    );
    assert_eq!(rules, vec!["a{}".to_string()]);
  }

  #[test]
  fn extracts_from_nested_style_collector_call() {
    let rules = extract(
      "const C = React.createElement(CC, null, React.createElement(CS, null, ['a{}']), React.createElement('div'));",
    );
    assert_eq!(rules, vec!["a{}".to_string()]);
  }

  #[test]
  fn extracts_from_compact_shape() {
    let rules = extract(
      "const C = _jsxs(CC, { children: [['a{}', 'a{}'], _jsx('div', {})] });",
    );
    assert_eq!(rules, vec!["a{}".to_string()]);
  }

  #[test]
  fn extracts_from_compact_shape_with_collector_helper() {
    let rules = extract(
      "const C = _jsxs(CC, { children: [_jsx(CS, { children: ['a{}'] }), _jsx('div', {})] });",
    );
    assert_eq!(rules, vec!["a{}".to_string()]);
  }
}
