use std::fmt;

use swc_core::ecma::ast::{
  ArrayLit, CallExpr, Callee, Expr, Ident, JSXElement, JSXElementChild, JSXElementName, JSXExpr,
  MemberExpr, MemberProp, Prop, PropName, PropOrSpread, SeqExpr,
};

use crate::constants::{
  COMPACT_FACTORY_NAME, ELEMENT_FACTORY_MEMBER, ELEMENT_FACTORY_OBJECT, WRAPPER_COMPONENT_NAME,
};

/// The three syntactic encodings the upstream pass uses for one logical
/// wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperShape {
  Element,
  FactoryCall,
  CompactFactoryCall,
}

impl fmt::Display for WrapperShape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WrapperShape::Element => f.write_str("element"),
      WrapperShape::FactoryCall => f.write_str("factory call"),
      WrapperShape::CompactFactoryCall => f.write_str("compact factory call"),
    }
  }
}

/// Raised when a node names the wrapper marker but violates the shape the
/// upstream pass is contracted to emit. Distinct from an ordinary non-match,
/// which simply continues traversal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {shape} wrapper: {reason}")]
pub struct MalformedWrapperError {
  pub shape: WrapperShape,
  pub reason: String,
}

impl MalformedWrapperError {
  fn new(shape: WrapperShape, reason: impl Into<String>) -> Self {
    Self {
      shape,
      reason: reason.into(),
    }
  }
}

/// A recognized wrapper, normalized so extraction and rewrite logic is
/// shape-agnostic from here on. Holds clones of the style and content
/// subtrees; the original node is replaced wholesale by the rewriter.
#[derive(Debug, Clone)]
pub enum WrapperMatch {
  Element {
    styles: Box<JSXElement>,
    content: JSXElementChild,
  },
  FactoryCall {
    styles: Expr,
    content: Expr,
  },
  CompactFactoryCall {
    styles: Expr,
    content: Expr,
  },
}

impl WrapperMatch {
  pub fn shape(&self) -> WrapperShape {
    match self {
      WrapperMatch::Element { .. } => WrapperShape::Element,
      WrapperMatch::FactoryCall { .. } => WrapperShape::FactoryCall,
      WrapperMatch::CompactFactoryCall { .. } => WrapperShape::CompactFactoryCall,
    }
  }
}

/// Classifies a JSX element as an element-shape wrapper.
///
/// The upstream pass emits wrappers with whitespace text between the
/// meaningful children, so positions are fixed at
/// `[ignored, styles, ignored, content]` with arity of at least four.
pub fn match_jsx_element(
  element: &JSXElement,
) -> Result<Option<WrapperMatch>, MalformedWrapperError> {
  let JSXElementName::Ident(name) = &element.opening.name else {
    return Ok(None);
  };

  if name.sym.as_ref() != WRAPPER_COMPONENT_NAME {
    return Ok(None);
  }

  if element.children.len() < 4 {
    return Err(MalformedWrapperError::new(
      WrapperShape::Element,
      format!(
        "expected at least 4 children, found {}",
        element.children.len()
      ),
    ));
  }

  let styles = match &element.children[1] {
    JSXElementChild::JSXElement(styles) => styles.clone(),
    _ => {
      return Err(MalformedWrapperError::new(
        WrapperShape::Element,
        "style child must be an element",
      ));
    }
  };

  let content = element.children[3].clone();
  match &content {
    JSXElementChild::JSXElement(_) | JSXElementChild::JSXFragment(_) => {}
    JSXElementChild::JSXExprContainer(container)
      if matches!(container.expr, JSXExpr::Expr(_)) => {}
    _ => {
      return Err(MalformedWrapperError::new(
        WrapperShape::Element,
        "content child must be an element, fragment or expression",
      ));
    }
  }

  Ok(Some(WrapperMatch::Element { styles, content }))
}

/// Classifies a call expression as a factory-call or compact wrapper.
pub fn match_call_expr(call: &CallExpr) -> Result<Option<WrapperMatch>, MalformedWrapperError> {
  if let Callee::Expr(callee) = &call.callee {
    if is_element_factory(callee) {
      return match_factory_call(call);
    }
  }

  if is_runtime_factory(call, COMPACT_FACTORY_NAME) {
    return match_compact_factory_call(call);
  }

  Ok(None)
}

fn match_factory_call(call: &CallExpr) -> Result<Option<WrapperMatch>, MalformedWrapperError> {
  let Some(first) = call.args.first() else {
    return Ok(None);
  };

  if first.spread.is_some() || !is_wrapper_marker(&first.expr) {
    return Ok(None);
  }

  if call.args.len() < 4 {
    return Err(MalformedWrapperError::new(
      WrapperShape::FactoryCall,
      format!("expected at least 4 arguments, found {}", call.args.len()),
    ));
  }

  let styles = &call.args[2];
  let content = &call.args[3];
  if styles.spread.is_some() || content.spread.is_some() {
    return Err(MalformedWrapperError::new(
      WrapperShape::FactoryCall,
      "spread argument where an expression is mandated",
    ));
  }

  Ok(Some(WrapperMatch::FactoryCall {
    styles: (*styles.expr).clone(),
    content: (*content.expr).clone(),
  }))
}

fn match_compact_factory_call(
  call: &CallExpr,
) -> Result<Option<WrapperMatch>, MalformedWrapperError> {
  let Some(first) = call.args.first() else {
    return Ok(None);
  };

  if first.spread.is_some() || !is_wrapper_marker(&first.expr) {
    return Ok(None);
  }

  // A props argument that is not a plain object, or one without a `children`
  // array, is treated as absence of the pattern.
  let Some(props) = call.args.get(1) else {
    return Ok(None);
  };
  let Expr::Object(object) = &*props.expr else {
    return Ok(None);
  };

  let Some(children) = object.props.iter().find_map(|prop| match prop {
    PropOrSpread::Prop(prop) => match &**prop {
      Prop::KeyValue(kv) => match &kv.key {
        PropName::Ident(key) if key.sym.as_ref() == "children" => Some(&*kv.value),
        _ => None,
      },
      _ => None,
    },
    PropOrSpread::Spread(_) => None,
  }) else {
    return Ok(None);
  };

  let Expr::Array(ArrayLit { elems, .. }) = children else {
    return Ok(None);
  };

  if elems.len() != 2 {
    return Err(MalformedWrapperError::new(
      WrapperShape::CompactFactoryCall,
      format!(
        "children must hold exactly [styles, content], found {} entries",
        elems.len()
      ),
    ));
  }

  let mut parts = elems.iter().map(|elem| match elem {
    Some(entry) if entry.spread.is_none() => Ok((*entry.expr).clone()),
    _ => Err(MalformedWrapperError::new(
      WrapperShape::CompactFactoryCall,
      "children entries must be expressions",
    )),
  });

  let styles = parts.next().transpose()?;
  let content = parts.next().transpose()?;
  match (styles, content) {
    (Some(styles), Some(content)) => {
      Ok(Some(WrapperMatch::CompactFactoryCall { styles, content }))
    }
    _ => Err(MalformedWrapperError::new(
      WrapperShape::CompactFactoryCall,
      "children entries must be expressions",
    )),
  }
}

/// Returns `true` when the expression references the wrapper marker, either
/// directly or as a member property.
pub fn is_wrapper_marker(expr: &Expr) -> bool {
  match expr {
    Expr::Ident(ident) => ident.sym.as_ref() == WRAPPER_COMPONENT_NAME,
    Expr::Member(member) => match &member.prop {
      MemberProp::Ident(property) => property.sym.as_ref() == WRAPPER_COMPONENT_NAME,
      _ => false,
    },
    _ => false,
  }
}

/// Returns `true` when the expression is the classic element factory
/// (`React.createElement`).
pub fn is_element_factory(expr: &Expr) -> bool {
  match expr {
    Expr::Member(MemberExpr { obj, prop, .. }) => match (&**obj, prop) {
      (Expr::Ident(object), MemberProp::Ident(property)) => {
        object.sym.as_ref() == ELEMENT_FACTORY_OBJECT
          && property.sym.as_ref() == ELEMENT_FACTORY_MEMBER
      }
      _ => false,
    },
    _ => false,
  }
}

/// Returns `true` when the call resembles an automatic-runtime helper such
/// as `_jsx(...)`, `_jsxs(...)` or `(0, runtime.jsxs)(...)`.
pub fn is_runtime_factory(call: &CallExpr, helper: &str) -> bool {
  match &call.callee {
    Callee::Expr(expr) => callee_targets_helper(expr, helper),
    Callee::Super(_) | Callee::Import(_) => false,
  }
}

fn callee_targets_helper(expr: &Expr, helper: &str) -> bool {
  match expr {
    Expr::Ident(ident) => is_helper_ident(ident, helper),
    Expr::Paren(paren) => callee_targets_helper(&paren.expr, helper),
    Expr::Seq(seq) => sequence_targets_helper(seq, helper),
    _ => false,
  }
}

fn is_helper_ident(ident: &Ident, helper: &str) -> bool {
  ident.sym.as_ref() == format!("_{helper}")
}

fn sequence_targets_helper(seq: &SeqExpr, helper: &str) -> bool {
  if seq.exprs.len() < 2 {
    return false;
  }

  match &*seq.exprs[1] {
    Expr::Member(MemberExpr {
      prop: MemberProp::Ident(property),
      ..
    }) => property.sym.as_ref() == helper,
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{first_init_expr, parse};

  fn classify(source: &str) -> Result<Option<WrapperMatch>, MalformedWrapperError> {
    let (program, _, _) = parse(source);
    match first_init_expr(&program) {
      Expr::JSXElement(element) => match_jsx_element(element),
      Expr::Call(call) => match_call_expr(call),
      other => panic!("unexpected expression under test: {other:?}"),
    }
  }

  #[test]
  fn matches_element_shape() {
    let matched = classify(
      "const C = <CC>\n  <CS>{['a{}']}</CS>\n  {<div />}\n</CC>;",
    )
    .unwrap()
    .expect("should match");
    assert_eq!(matched.shape(), WrapperShape::Element);
  }

  #[test]
  fn ignores_other_elements() {
    assert!(classify("const C = <Card>\n  <CS>{[]}</CS>\n  {null}\n</Card>;")
      .unwrap()
      .is_none());
  }

  #[test]
  fn rejects_element_with_too_few_children() {
    let err = classify("const C = <CC><CS>{['a{}']}</CS></CC>;").unwrap_err();
    assert_eq!(err.shape, WrapperShape::Element);
    assert!(err.reason.contains("at least 4 children"));
  }

  #[test]
  fn matches_factory_call_shape() {
    let matched = classify(
      "const C = React.createElement(CC, null, ['a{}'], React.createElement('div'));",
    )
    .unwrap()
    .expect("should match");
    assert_eq!(matched.shape(), WrapperShape::FactoryCall);
  }

  #[test]
  fn ignores_factory_call_of_other_components() {
    assert!(
      classify("const C = React.createElement('div', null, 'hi');")
        .unwrap()
        .is_none()
    );
  }

  #[test]
  fn rejects_factory_call_with_missing_arguments() {
    let err = classify("const C = React.createElement(CC, null);").unwrap_err();
    assert_eq!(err.shape, WrapperShape::FactoryCall);
  }

  #[test]
  fn matches_compact_shape() {
    let matched = classify(
      "const C = _jsxs(CC, { children: [['a{}'], _jsx('div', {})] });",
    )
    .unwrap()
    .expect("should match");
    assert_eq!(matched.shape(), WrapperShape::CompactFactoryCall);
  }

  #[test]
  fn matches_compact_sequence_callee() {
    let matched = classify(
      "const C = (0, _runtime.jsxs)(CC, { children: [['a{}'], (0, _runtime.jsx)('div', {})] });",
    )
    .unwrap()
    .expect("should match");
    assert_eq!(matched.shape(), WrapperShape::CompactFactoryCall);
  }

  #[test]
  fn compact_without_children_is_a_non_match() {
    assert!(classify("const C = _jsxs(CC, { id: 'x' });")
      .unwrap()
      .is_none());
  }

  #[test]
  fn rejects_compact_with_wrong_children_arity() {
    let err = classify("const C = _jsxs(CC, { children: [['a{}']] });").unwrap_err();
    assert_eq!(err.shape, WrapperShape::CompactFactoryCall);
    assert!(err.reason.contains("exactly"));
  }

  #[test]
  fn rejects_compact_with_spread_children() {
    let err =
      classify("const C = _jsxs(CC, { children: [...rest, _jsx('div', {})] });").unwrap_err();
    assert_eq!(err.shape, WrapperShape::CompactFactoryCall);
  }

  #[test]
  fn marker_matches_member_references() {
    let (program, _, _) = parse("const C = runtime.CC;");
    assert!(is_wrapper_marker(first_init_expr(&program)));
  }
}
