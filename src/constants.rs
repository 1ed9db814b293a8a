//! Identifiers that form the contract with the upstream compile pass.

/// Tag of the wrapper element the upstream pass emits around a compiled
/// component.
pub const WRAPPER_COMPONENT_NAME: &str = "CC";

/// Tag of the compiled-styles collector nested inside a wrapper.
pub const STYLE_COLLECTOR_NAME: &str = "CS";

/// Object half of the classic element factory (`React.createElement`).
pub const ELEMENT_FACTORY_OBJECT: &str = "React";

/// Member half of the classic element factory.
pub const ELEMENT_FACTORY_MEMBER: &str = "createElement";

/// Automatic-runtime helper used by the compact wrapper encoding.
pub const COMPACT_FACTORY_NAME: &str = "jsxs";

/// Automatic-runtime helper for single-child elements, seen inside style
/// subtrees.
pub const SINGLE_FACTORY_NAME: &str = "jsx";

/// Base name shared by every emitted stylesheet fragment asset. The merge
/// step groups assets by the `<name>.css` suffix derived from this.
pub const STYLE_SHEET_NAME: &str = "style-extract-css";

/// Query parameter carrying the encoded rule on virtual stylesheet imports.
pub const STYLE_QUERY_PARAM: &str = "style";
