//! Policies declared as JSON data.
//!
//! ```json
//! {
//!   "name": "policy_example",
//!   "url_pattern": "r:https?://example\\.com/news/.*",
//!   "compact": true,
//!   "templates": {
//!     "online": [
//!       [["header", "class", "article-header"], null],
//!       [["div", "class", "article-main"], ["footer", "class", "article-footer"]]
//!     ]
//!   },
//!   "drop_tags": [["p", "class", "small"]]
//! }
//! ```
//!
//! Shapes accepted for `templates`:
//! - a list of rules: one template named [`DEFAULT_TEMPLATE`],
//! - an object of named templates, tried in name order,
//! - a list of `[name, rules]` pairs, tried in list order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Policy, Rule, DEFAULT_MIME, DEFAULT_TEMPLATE};
use crate::selector::{Selector, OPTIONAL_MARKER};
use crate::{Error, Result};

/// Serialized form of a [`Policy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDefinition {
    pub name: String,
    pub url_pattern: String,
    #[serde(default)]
    pub excerpt_url_pattern: Option<String>,
    #[serde(default = "default_mime")]
    pub mime: String,
    #[serde(default)]
    pub compact: bool,
    #[serde(default)]
    pub separator: Option<String>,
    pub templates: TemplatesDefinition,
    #[serde(default)]
    pub ignore_tags: Vec<String>,
    #[serde(default)]
    pub drop_tags: Vec<SelectorDefinition>,
    #[serde(default)]
    pub ignore_tags_with_data: Vec<String>,
}

fn default_mime() -> String {
    DEFAULT_MIME.to_string()
}

/// The accepted `templates` shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplatesDefinition {
    Single(Vec<RuleDefinition>),
    Named(BTreeMap<String, Vec<RuleDefinition>>),
    Ordered(Vec<(String, Vec<RuleDefinition>)>),
}

/// `[start, end, ignore]` or `{"start": .., "end": .., "ignore": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleDefinition {
    Positional(Vec<Option<SelectorSet>>),
    Keyed {
        start: SelectorDefinition,
        #[serde(default)]
        end: Option<SelectorSet>,
        #[serde(default)]
        ignore: Option<SelectorSet>,
    },
}

/// One selector or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSet {
    One(SelectorDefinition),
    Many(Vec<SelectorDefinition>),
}

/// `[tag, attribute, value]` with an optional fourth text pattern.
pub type SelectorDefinition = Vec<Option<String>>;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Box<PolicyDefinition>),
    Many(Vec<PolicyDefinition>),
}

/// Parse a JSON document holding one definition or a list of them.
///
/// # Errors
///
/// Returns [`Error::PolicyJson`] when the document does not fit the format.
pub fn parse_definitions(json: &str) -> Result<Vec<PolicyDefinition>> {
    Ok(match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::One(definition) => vec![*definition],
        OneOrMany::Many(definitions) => definitions,
    })
}

impl PolicyDefinition {
    /// Compile the definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicy`] for malformed rules or selectors and
    /// [`Error::InvalidPattern`] for regexes that do not compile.
    pub fn into_policy(self) -> Result<Policy> {
        let mut builder = Policy::builder(self.name, self.url_pattern)
            .mime(&self.mime)
            .compact(self.compact)
            .ignore_tags(self.ignore_tags)
            .ignore_tags_with_data(self.ignore_tags_with_data);

        if let Some(pattern) = self.excerpt_url_pattern {
            builder = builder.excerpt_url_pattern(pattern);
        }
        if let Some(separator) = self.separator {
            builder = builder.separator(separator);
        }
        for selector in &self.drop_tags {
            builder = builder.drop_tag(selector_from(selector)?);
        }

        match self.templates {
            TemplatesDefinition::Single(rules) => {
                builder = builder.named_template(DEFAULT_TEMPLATE, rules_from(&rules)?);
            }
            TemplatesDefinition::Named(templates) => {
                for (name, rules) in templates {
                    let rules = rules_from(&rules)?;
                    builder = builder.named_template(name, rules);
                }
            }
            TemplatesDefinition::Ordered(templates) => {
                builder = builder.ordered(true);
                for (name, rules) in templates {
                    let rules = rules_from(&rules)?;
                    builder = builder.named_template(name, rules);
                }
            }
        }

        builder.build()
    }
}

fn rules_from(rules: &[RuleDefinition]) -> Result<Vec<Rule>> {
    rules.iter().map(rule_from).collect()
}

fn rule_from(rule: &RuleDefinition) -> Result<Rule> {
    let (start, end, ignore) = match rule {
        RuleDefinition::Positional(parts) => {
            if parts.is_empty() || parts.len() > 3 {
                return Err(Error::InvalidPolicy(format!(
                    "a rule has 1 to 3 entries, got {}",
                    parts.len()
                )));
            }
            let start = match &parts[0] {
                Some(SelectorSet::One(start)) => start,
                _ => {
                    return Err(Error::InvalidPolicy(
                        "a rule starts with a single selector".to_string(),
                    ))
                }
            };
            (start, parts.get(1).and_then(Option::as_ref), parts.get(2).and_then(Option::as_ref))
        }
        RuleDefinition::Keyed { start, end, ignore } => (start, end.as_ref(), ignore.as_ref()),
    };

    let (optional, start) = match start.first() {
        Some(Some(tag)) if tag.starts_with(OPTIONAL_MARKER) => {
            let mut stripped = start.clone();
            stripped[0] = Some(tag[OPTIONAL_MARKER.len_utf8()..].to_string());
            (true, selector_from(&stripped)?)
        }
        _ => (false, selector_from(start)?),
    };

    let mut rule = if optional {
        Rule::optional(start)
    } else {
        Rule::new(start)
    };
    for selector in selectors_from(end)? {
        rule = rule.end(selector);
    }
    for selector in selectors_from(ignore)? {
        rule = rule.ignore(selector);
    }
    Ok(rule)
}

fn selectors_from(set: Option<&SelectorSet>) -> Result<Vec<Selector>> {
    match set {
        None => Ok(Vec::new()),
        Some(SelectorSet::One(selector)) => Ok(vec![selector_from(selector)?]),
        Some(SelectorSet::Many(selectors)) => selectors.iter().map(|s| selector_from(s)).collect(),
    }
}

fn selector_from(parts: &[Option<String>]) -> Result<Selector> {
    if !(3..=4).contains(&parts.len()) {
        return Err(Error::InvalidPolicy(format!(
            "a selector has 3 or 4 entries, got {parts:?}"
        )));
    }
    let selector = Selector::new(parts[0].as_deref(), parts[1].as_deref(), parts[2].as_deref())?;
    match parts.get(3).and_then(Option::as_deref) {
        Some(pattern) => selector.with_text_pattern(pattern),
        None => Ok(selector),
    }
}
