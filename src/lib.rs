//! # rs-purifier
//!
//! Policy-driven extraction of the main text of web pages.
//!
//! Site policies say where the content of a page starts, where it ends and
//! what to leave out. Documents are parsed into a lightweight tag tree,
//! matched against the policy registered for their URL and rendered back to
//! plain text with per-tag separators.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_purifier::policy::{Policy, Rule};
//! use rs_purifier::selector::Selector;
//! use rs_purifier::{Agent, AgentOptions};
//!
//! let mut builder = Agent::builder(&AgentOptions::default());
//! builder.register(
//!     Policy::builder("policy_example", "r:https://example\\.com/news/.*")
//!         .template(vec![
//!             Rule::new(Selector::tag("h1")),
//!             Rule::new(Selector::attr("div", "class", "article")?)
//!                 .ignore(Selector::attr("div", "class", "share")?),
//!         ])
//!         .compact(true)
//!         .build()?,
//! )?;
//! let agent = builder.build();
//!
//! let html = r#"<html><body><h1>Headline</h1>
//!     <div class="article">Body text<div class="share">Share this</div></div>
//! </body></html>"#;
//! let extraction = agent.extract("text/html", "https://example.com/news/1", html, false)?;
//! assert_eq!(extraction.text, "Headline\n\nBody text");
//! # Ok::<(), rs_purifier::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Site policies**: code-built or loaded from JSON definitions
//! - **Excerpt pages**: listing URLs are refused before any extraction
//! - **Links**: anchors partitioned by whether they sit in the content
//! - **Readability fallback** (`readability` feature): HTML without a policy

mod agent;
mod error;
mod options;
mod result;

/// Patterns (`r:` regexes or exact strings) and shared static regexes.
pub mod patterns;

/// Tag tree model and builder.
pub mod tree;

/// Selectors over tag tree nodes.
pub mod selector;

/// Text reconstruction of tag trees.
pub mod text;

/// Site policies, templates and the template engine.
pub mod policy;

/// Per-MIME handlers, link collection and post-processors.
pub mod handler;

/// URL utilities for link resolution.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

// Public API - re-exports
pub use agent::{normalize_mime, Agent, AgentBuilder, POLICY_FILE_EXTENSION, POLICY_FILE_PREFIX};
pub use error::{Error, Result};
pub use options::AgentOptions;
pub use policy::{Policy, PolicyBuilder};
pub use result::{Extraction, Links, Reason};
