use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::TransformOptions;
use crate::error::TransformError;

/// Resolution callback: maps `(importing file, specifier)` to an absolute
/// path, or fails with the host resolver's error.
pub type ResolveFn = dyn Fn(&Path, &str) -> anyhow::Result<PathBuf> + Send + Sync;

static ACTIVE_RESOLVER: Mutex<Option<Arc<ResolveFn>>> = Mutex::new(None);

/// Installs a resolution override for the lifetime of the guard.
///
/// The override is process-wide, matching how host bundlers expose a single
/// resolver. The guard restores the previously installed override on drop,
/// including during unwinding, so nesting and panic recovery both behave.
pub struct ScopedResolver {
  previous: Option<Arc<ResolveFn>>,
}

impl ScopedResolver {
  pub fn install(resolver: Arc<ResolveFn>) -> Self {
    let previous = ACTIVE_RESOLVER.lock().replace(resolver);
    Self { previous }
  }
}

impl Drop for ScopedResolver {
  fn drop(&mut self) {
    *ACTIVE_RESOLVER.lock() = self.previous.take();
  }
}

/// Resolves a specifier through the active override. Errors name the
/// specifier so the host can report which import failed.
pub fn resolve(from: &Path, specifier: &str) -> Result<PathBuf, TransformError> {
  let resolver = ACTIVE_RESOLVER.lock().clone();

  match resolver {
    Some(resolver) => resolver(from, specifier).map_err(|error| TransformError::UnresolvedModule {
      specifier: specifier.to_string(),
      reason: error.to_string(),
    }),
    None => Err(TransformError::UnresolvedModule {
      specifier: specifier.to_string(),
      reason: "no resolver installed".to_string(),
    }),
  }
}

/// Builds a filesystem resolver from the host's resolve configuration:
/// aliases are applied first, relative specifiers are probed against the
/// importing file's directory, and bare specifiers against the configured
/// module roots. Extension probing follows the configured list.
pub fn configured_resolver(options: &TransformOptions) -> Arc<ResolveFn> {
  let alias = options.resolve.alias.clone();
  let modules = options.resolve.modules.clone();
  let extensions = options
    .extensions
    .clone()
    .unwrap_or_else(|| vec![".js".to_string(), ".jsx".to_string()]);

  Arc::new(move |from: &Path, specifier: &str| {
    let specifier = alias
      .iter()
      .find_map(|(prefix, target)| {
        specifier
          .strip_prefix(prefix.as_str())
          .map(|rest| format!("{target}{rest}"))
      })
      .unwrap_or_else(|| specifier.to_string());

    let candidates: Vec<PathBuf> = if specifier.starts_with('.') {
      let base = from.parent().unwrap_or_else(|| Path::new("."));
      vec![base.join(&specifier)]
    } else if Path::new(&specifier).is_absolute() {
      vec![PathBuf::from(&specifier)]
    } else {
      modules.iter().map(|root| Path::new(root).join(&specifier)).collect()
    };

    for candidate in &candidates {
      if candidate.is_file() {
        return Ok(candidate.clone());
      }
      for extension in &extensions {
        let mut with_extension = candidate.as_os_str().to_owned();
        with_extension.push(extension);
        let with_extension = PathBuf::from(with_extension);
        if with_extension.is_file() {
          return Ok(with_extension);
        }
      }
    }

    anyhow::bail!("no candidate exists on disk")
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  // The override slot is process-wide, so tests that touch it take this
  // lock to avoid interleaving.
  static TEST_LOCK: Mutex<()> = Mutex::new(());

  fn fixed(path: &str) -> Arc<ResolveFn> {
    let path = PathBuf::from(path);
    Arc::new(move |_: &Path, _: &str| Ok(path.clone()))
  }

  #[test]
  fn resolve_without_override_fails_naming_the_specifier() {
    let _guard = TEST_LOCK.lock();

    let error = resolve(Path::new("/src/a.js"), "./missing").unwrap_err();
    assert!(error.to_string().contains("./missing"));
  }

  #[test]
  fn nested_overrides_restore_in_order() {
    let _guard = TEST_LOCK.lock();

    let outer = ScopedResolver::install(fixed("/outer.js"));
    {
      let _inner = ScopedResolver::install(fixed("/inner.js"));
      let resolved = resolve(Path::new("/src/a.js"), "x").unwrap();
      assert_eq!(resolved, PathBuf::from("/inner.js"));
    }

    let resolved = resolve(Path::new("/src/a.js"), "x").unwrap();
    assert_eq!(resolved, PathBuf::from("/outer.js"));

    drop(outer);
    assert!(resolve(Path::new("/src/a.js"), "x").is_err());
  }

  #[test]
  fn override_is_restored_after_a_panic() {
    let _guard = TEST_LOCK.lock();

    let result = std::panic::catch_unwind(|| {
      let _scoped = ScopedResolver::install(fixed("/panicking.js"));
      panic!("boom");
    });
    assert!(result.is_err());

    assert!(resolve(Path::new("/src/a.js"), "x").is_err());
  }

  #[test]
  fn configured_resolver_applies_aliases_and_extensions() {
    let dir = std::env::temp_dir().join("style-extract-resolver-test");
    fs::create_dir_all(dir.join("lib")).unwrap();
    fs::write(dir.join("lib/theme.js"), "").unwrap();

    let mut options = TransformOptions::default();
    options
      .resolve
      .alias
      .insert("~".to_string(), dir.join("lib").to_string_lossy().into_owned());

    let resolver = configured_resolver(&options);
    let resolved = resolver(Path::new("/src/a.js"), "~/theme").unwrap();
    assert_eq!(resolved, dir.join("lib/theme.js"));

    let error = resolver(Path::new("/src/a.js"), "~/absent").unwrap_err();
    assert!(error.to_string().contains("no candidate"));
  }
}
