use indexmap::IndexMap;
use serde::Deserialize;

/// Per-file behavior switches, deserialized from the host tool's JSON
/// configuration. Unknown fields are ignored so hosts can carry options for
/// other passes in the same object.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformOptions {
  /// Whether the upstream baking pass runs at all. Extraction only makes
  /// sense on already-baked output, so hosts typically flip this off for
  /// pre-baked node_modules sources.
  pub bake: bool,

  /// Master switch for the stripping pass. When off the input is returned
  /// untouched.
  pub extract: bool,

  /// Module path the injected stylesheet imports point at. When absent the
  /// extracted rules are only surfaced through transform metadata.
  pub style_sheet_path: Option<String>,

  /// Extra extensions tried while resolving relative specifiers.
  pub extensions: Option<Vec<String>>,

  /// Host resolver configuration forwarded to the scoped resolver.
  pub resolve: ResolveConfig,

  /// Set by the bundler plugin once it has hooked asset production. Used to
  /// warn when extraction runs without a downstream consumer.
  pub extract_plugin_installed: bool,
}

impl Default for TransformOptions {
  fn default() -> Self {
    Self {
      bake: true,
      extract: false,
      style_sheet_path: None,
      extensions: None,
      resolve: ResolveConfig::default(),
      extract_plugin_installed: false,
    }
  }
}

/// Aliases and extra search roots honored while the scoped resolver override
/// is installed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveConfig {
  pub alias: IndexMap<String, String>,
  pub modules: Vec<String>,
}

/// Everything the transform entry point needs besides the source text.
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
  /// Used for syntax selection (`.ts`/`.tsx` parse as TypeScript) and for
  /// source map file naming.
  pub filename: Option<String>,
  pub source_maps: bool,
  pub options: TransformOptions,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_baking_without_extraction() {
    let options: TransformOptions = serde_json::from_str("{}").unwrap();
    assert!(options.bake);
    assert!(!options.extract);
    assert!(options.style_sheet_path.is_none());
  }

  #[test]
  fn deserializes_camel_case_fields() {
    let options: TransformOptions = serde_json::from_str(
      r#"{
        "bake": false,
        "extract": true,
        "styleSheetPath": "@acme/styles",
        "extractPluginInstalled": true,
        "resolve": { "alias": { "~": "./src" }, "modules": ["node_modules"] }
      }"#,
    )
    .unwrap();

    assert!(!options.bake);
    assert!(options.extract);
    assert_eq!(options.style_sheet_path.as_deref(), Some("@acme/styles"));
    assert!(options.extract_plugin_installed);
    assert_eq!(options.resolve.alias.get("~").map(String::as_str), Some("./src"));
    assert_eq!(options.resolve.modules, vec!["node_modules".to_string()]);
  }

  #[test]
  fn ignores_unknown_fields() {
    let options: TransformOptions =
      serde_json::from_str(r#"{ "extract": true, "somethingElse": 1 }"#).unwrap();
    assert!(options.extract);
  }
}
