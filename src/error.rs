use std::string::FromUtf8Error;

use crate::matcher::MalformedWrapperError;

/// Failure modes of the transform entry points.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
  #[error("failed to parse input source")]
  Parse(swc_core::ecma::parser::error::Error),

  #[error(transparent)]
  MalformedWrapper(#[from] MalformedWrapperError),

  #[error("failed to resolve module '{specifier}': {reason}")]
  UnresolvedModule { specifier: String, reason: String },

  #[error("emitted source was not valid UTF-8: {0}")]
  InvalidUtf8(#[from] FromUtf8Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("failed to write source map: {0}")]
  SourceMap(#[from] sourcemap::Error),
}
