//! Configuration options for an extraction agent.
//!
//! Per-site behavior lives on [`crate::Policy`]; these options apply to every
//! document the agent handles.

/// Configuration options for an [`crate::Agent`].
///
/// All fields are public. Use `Default::default()` for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_purifier::AgentOptions;
///
/// let options = AgentOptions {
///     extract_title: true,
///     default_title: "untitled".to_string(),
///     ..AgentOptions::default()
/// };
/// assert!(options.readability_fallback);
/// ```
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Install the title post-processor on every handler.
    ///
    /// Default: `false`
    pub extract_title: bool,

    /// Title reported when a document has no `<title>`.
    ///
    /// Default: empty
    pub default_title: String,

    /// Summarize HTML with no matching policy using readability.
    ///
    /// Has no effect without the `readability` cargo feature.
    ///
    /// Default: `true`
    pub readability_fallback: bool,

    /// Maximum number of simultaneously open elements while building the tag
    /// tree. Deeper markup is flattened into the deepest element.
    ///
    /// Default: `512`
    pub max_tree_depth: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            extract_title: false,
            default_title: String::new(),
            readability_fallback: true,
            max_tree_depth: 512,
        }
    }
}
