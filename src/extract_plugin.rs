use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::config::TransformOptions;
use crate::constants::STYLE_SHEET_NAME;

/// Options for the bundler-side extraction plugin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractPluginOptions {
  /// Overrides the default test applied to the injected node_modules rule.
  pub node_modules_test: Option<String>,
  pub node_modules_include: Option<String>,
  pub node_modules_exclude: Option<String>,
}

/// A bundler module rule: which files it applies to and the transform
/// options forced onto them.
#[derive(Debug, Clone)]
pub struct ModuleRule {
  pub test: Regex,
  pub include: Option<Regex>,
  pub exclude: Option<Regex>,
  pub options: TransformOptions,
}

impl ModuleRule {
  pub fn applies_to(&self, path: &str) -> bool {
    if !self.test.is_match(path) {
      return false;
    }
    if let Some(include) = &self.include {
      if !include.is_match(path) {
        return false;
      }
    }
    if let Some(exclude) = &self.exclude {
      if exclude.is_match(path) {
        return false;
      }
    }
    true
  }
}

/// Appends the rule that runs extraction over pre-baked node_modules
/// sources. Baking is disabled for them since their styles were already
/// compiled at publish time; only stripping and extraction remain.
pub fn push_node_modules_rule(
  rules: &mut Vec<ModuleRule>,
  options: &ExtractPluginOptions,
) -> Result<(), regex::Error> {
  let test = match &options.node_modules_test {
    Some(pattern) => Regex::new(pattern)?,
    None => Regex::new(r"node_modules.+\.js$")?,
  };
  let include = options
    .node_modules_include
    .as_deref()
    .map(Regex::new)
    .transpose()?;
  let exclude = options
    .node_modules_exclude
    .as_deref()
    .map(Regex::new)
    .transpose()?;

  rules.push(ModuleRule {
    test,
    include,
    exclude,
    options: TransformOptions {
      bake: false,
      extract: true,
      extract_plugin_installed: true,
      ..Default::default()
    },
  });

  Ok(())
}

/// A splitting cache group as exposed to the bundler.
#[derive(Debug, Clone)]
pub struct CacheGroup {
  pub name: String,
  pub test: Regex,
  pub enforce: bool,
}

/// Forces every extracted style module into one stylesheet chunk, so the
/// build produces a single CSS asset regardless of code splitting.
pub fn force_single_style_sheet(
  cache_groups: &mut IndexMap<String, CacheGroup>,
) -> Result<(), regex::Error> {
  let test = Regex::new(&format!(r"{}\.css$", regex::escape(STYLE_SHEET_NAME)))?;

  cache_groups.insert(
    STYLE_SHEET_NAME.to_string(),
    CacheGroup {
      name: STYLE_SHEET_NAME.to_string(),
      test,
      enforce: true,
    },
  );

  Ok(())
}

fn is_style_asset(name: &str) -> bool {
  name.ends_with(&format!(".{STYLE_SHEET_NAME}.css")) || name == format!("{STYLE_SHEET_NAME}.css")
}

/// Collapses the per-chunk stylesheet fragments emitted by the bundler into
/// identical copies of the first-enumerated fragment. Duplicate asset names
/// keep the first contents seen; assets that are not stylesheet fragments
/// are left untouched.
pub fn merge_style_assets(assets: &mut IndexMap<String, String>) {
  let merged = match assets
    .iter()
    .find(|(name, _)| is_style_asset(name))
    .map(|(_, contents)| contents.clone())
  {
    Some(contents) => contents,
    None => return,
  };

  for (name, contents) in assets.iter_mut() {
    if is_style_asset(name) {
      *contents = merged.clone();
    }
  }
}

static MISSING_PLUGIN_WARNED: AtomicBool = AtomicBool::new(false);

/// Warns, once per process, when extraction runs without the bundler plugin
/// hooked in. Without the plugin the virtual stylesheet imports have no
/// consumer and the styles silently vanish from the build.
pub fn warn_missing_extract_plugin(options: &TransformOptions) -> bool {
  if !options.extract || options.extract_plugin_installed {
    return false;
  }

  if MISSING_PLUGIN_WARNED.swap(true, Ordering::Relaxed) {
    return false;
  }

  tracing::warn!(
    "styles are being extracted but the extraction plugin is not installed; \
     extracted rules will not reach the final stylesheet"
  );
  true
}
