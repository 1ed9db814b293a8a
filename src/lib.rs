//! Source-level extraction of compiled styles.
//!
//! An upstream compile pass leaves style rules inline, wrapped in marker
//! components, so the runtime can inject them. This crate strips those
//! wrappers from the emitted source, collects the literal rules, and routes
//! them to a virtual stylesheet module through injected imports. A bundler
//! plugin then turns the virtual imports into one CSS asset.

mod config;
mod constants;
mod encoder;
mod error;
mod extract_plugin;
mod extractor;
mod imports;
mod matcher;
mod resolver_hook;
mod stripper;
pub mod test_utils;

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::input::StringInput;
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap, Spanned};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::Emitter;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsSyntax, Parser, Syntax, TsSyntax};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

pub use crate::config::{ResolveConfig, TransformConfig, TransformOptions};
pub use crate::constants::{STYLE_QUERY_PARAM, STYLE_SHEET_NAME};
pub use crate::encoder::rule_token;
pub use crate::error::TransformError;
pub use crate::extract_plugin::{
  force_single_style_sheet, merge_style_assets, push_node_modules_rule,
  warn_missing_extract_plugin, CacheGroup, ExtractPluginOptions, ModuleRule,
};
pub use crate::extractor::RuleAccumulator;
pub use crate::matcher::{MalformedWrapperError, WrapperShape};
pub use crate::resolver_hook::{configured_resolver, resolve, ResolveFn, ScopedResolver};
pub use crate::stripper::StripVisitor;

/// Result of one file's transform.
#[derive(Debug, Default)]
pub struct TransformOutput {
  pub code: String,
  pub map: Option<String>,
  pub metadata: TransformMetadata,
}

/// Side channel for data the host tool consumes alongside the code.
#[derive(Debug, Default)]
pub struct TransformMetadata {
  /// Extracted rules in accumulation order, also available when no
  /// stylesheet path was configured.
  pub style_rules: Vec<String>,
}

/// Cheap pre-parse check for the marker identifiers. Files that never
/// mention them cannot contain wrappers and skip parsing entirely.
pub fn should_transform(code: &str) -> bool {
  static MARKERS: OnceLock<Regex> = OnceLock::new();
  let markers = MARKERS.get_or_init(|| {
    Regex::new(&format!(
      r"\b({}|{})\b",
      constants::WRAPPER_COMPONENT_NAME,
      constants::STYLE_COLLECTOR_NAME
    ))
    .unwrap_or_else(|error| unreachable!("marker regex is static: {error}"))
  });
  markers.is_match(code)
}

/// Strips style wrappers from one file. See [`transform_with_plugins`] for
/// the variant that runs extra visitors between parse and strip.
pub fn transform(
  code: &str,
  input_source_map: Option<&str>,
  config: &TransformConfig,
) -> Result<TransformOutput, TransformError> {
  transform_with_plugins(code, input_source_map, config, &mut [])
}

/// Full transform pipeline: parse, run host plugins, strip wrappers, inject
/// stylesheet imports, print.
///
/// Returns the input untouched when extraction is disabled or the file
/// contains no marker identifiers. Malformed wrappers fail the whole file;
/// partially stripped output is never returned.
pub fn transform_with_plugins(
  code: &str,
  input_source_map: Option<&str>,
  config: &TransformConfig,
  plugins: &mut [&mut dyn VisitMut],
) -> Result<TransformOutput, TransformError> {
  warn_missing_extract_plugin(&config.options);

  if !config.options.extract || !should_transform(code) {
    return Ok(TransformOutput {
      code: code.to_string(),
      map: None,
      metadata: TransformMetadata::default(),
    });
  }

  let cm: Lrc<SourceMap> = Default::default();
  let file_name = match &config.filename {
    Some(filename) => FileName::Real(PathBuf::from(filename)),
    None => FileName::Anon,
  };
  let source_file = cm.new_source_file(Lrc::new(file_name), code.to_string());
  let comments = SingleThreadedComments::default();

  let lexer = Lexer::new(
    syntax_for(config.filename.as_deref()),
    Default::default(),
    StringInput::from(&*source_file),
    Some(&comments),
  );
  let mut parser = Parser::new_from(lexer);
  let mut program = parser.parse_program().map_err(TransformError::Parse)?;

  for plugin in plugins.iter_mut() {
    program.visit_mut_with(plugin);
  }

  let program_start = program.span_lo();
  let mut visitor = StripVisitor::new(&config.options, &comments, program_start);
  program.visit_mut_with(&mut visitor);
  let (rules, errors) = visitor.finish();

  if let Some(error) = errors.into_iter().next() {
    return Err(error.into());
  }

  let mut output_buffer = Vec::new();
  let mut line_pos_buffer = Vec::new();
  {
    let writer = JsWriter::new(
      cm.clone(),
      "\n",
      &mut output_buffer,
      config.source_maps.then_some(&mut line_pos_buffer),
    );
    let mut emitter = Emitter {
      cfg: Default::default(),
      cm: cm.clone(),
      comments: Some(&comments),
      wr: writer,
    };
    emitter.emit_program(&program)?;
  }

  let output_code = String::from_utf8(output_buffer)?;
  let map = if config.source_maps {
    let mut output_map = cm.build_source_map(&line_pos_buffer);
    if let Some(input_map) = parse_input_source_map(input_source_map) {
      output_map.adjust_mappings(&input_map);
    }
    let mut map_buffer = Vec::new();
    output_map.to_writer(&mut map_buffer)?;
    Some(String::from_utf8(map_buffer)?)
  } else {
    None
  };

  Ok(TransformOutput {
    code: output_code,
    map,
    metadata: TransformMetadata {
      style_rules: rules.into_rules(),
    },
  })
}

fn syntax_for(filename: Option<&str>) -> Syntax {
  match filename {
    Some(name) if name.ends_with(".ts") || name.ends_with(".tsx") || name.ends_with(".mts") => {
      Syntax::Typescript(TsSyntax {
        tsx: name.ends_with(".tsx"),
        ..Default::default()
      })
    }
    _ => Syntax::Es(EsSyntax {
      jsx: true,
      ..Default::default()
    }),
  }
}

/// Parses the upstream source map if one was handed in. Invalid maps are
/// dropped rather than failing the transform, since the code itself is
/// still sound without them.
fn parse_input_source_map(input: Option<&str>) -> Option<sourcemap::SourceMap> {
  let input = input?;
  match sourcemap::SourceMap::from_slice(input.as_bytes()) {
    Ok(map) => Some(map),
    Err(error) => {
      tracing::debug!(%error, "ignoring invalid input source map");
      None
    }
  }
}
