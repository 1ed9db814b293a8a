use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// Encodes a literal style rule into a URI-safe token usable as a query
/// parameter value. Exclamation marks are escaped as well since they break
/// query-parameter chaining in downstream tooling.
///
/// Deterministic and total: the same rule always yields the same token.
pub fn rule_token(rule: &str) -> String {
  utf8_percent_encode(rule, URI_COMPONENT)
    .to_string()
    .replace('!', "%21")
}

#[cfg(test)]
mod tests {
  use super::*;
  use percent_encoding::percent_decode_str;

  #[test]
  fn encodes_css_braces() {
    assert_eq!(rule_token("a{}"), "a%7B%7D");
  }

  #[test]
  fn escapes_exclamation_marks() {
    let token = rule_token("a!b");
    assert!(!token.contains('!'));
    assert_eq!(token, "a%21b");
  }

  #[test]
  fn round_trips_through_percent_decoding() {
    let token = rule_token("._a{color:red !important}");
    let decoded = percent_decode_str(&token).decode_utf8().unwrap();
    assert_eq!(decoded, "._a{color:red !important}");
  }

  #[test]
  fn is_deterministic() {
    assert_eq!(rule_token("a{b:c}"), rule_token("a{b:c}"));
  }

  #[test]
  fn encodes_non_ascii_as_utf8_bytes() {
    assert_eq!(rule_token("a{content:\"é\"}"), "a%7Bcontent%3A%22%C3%A9%22%7D");
  }
}
