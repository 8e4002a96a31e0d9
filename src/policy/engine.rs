//! Template matching over a parsed document.

use tracing::debug;

use super::{Policy, PolicyMatch, Template};
use crate::patterns::BLANK_LINE_RUN;
use crate::text::{self, RenderOptions};
use crate::tree::Document;
use crate::{Error, Result};

enum Attempt {
    Success(String),
    TemplateFailed,
}

/// Try the policy's templates in their defined order until one succeeds.
///
/// The remembered template is cleared at the start of every call.
pub(super) fn run(policy: &Policy, url: &str, document: &Document) -> Result<PolicyMatch> {
    policy.forget();

    for (index, template) in policy.templates().templates().iter().enumerate() {
        match try_template(policy, template, document) {
            Attempt::Success(text) => {
                policy.remember(index);
                debug!(policy = policy.name(), template = template.name(), url, "template matched");
                return Ok(PolicyMatch {
                    text,
                    template: template.name().to_string(),
                });
            }
            Attempt::TemplateFailed => {
                debug!(policy = policy.name(), template = template.name(), url, "template failed");
            }
        }
    }

    Err(Error::NoHandlerMatched {
        url: url.to_string(),
    })
}

fn try_template(policy: &Policy, template: &Template, document: &Document) -> Attempt {
    let mut text = String::new();

    for rule in template.rules() {
        let matched = document.query(rule.start_selector());
        if matched.is_empty() {
            debug!(template = template.name(), start = ?rule.start_selector(), "start selector not found");
            if rule.is_optional() {
                continue;
            }
            return Attempt::TemplateFailed;
        }

        let options = RenderOptions {
            separator: None,
            end: rule.end_selectors(),
            ignore: rule.ignore_selectors(),
        };
        for node in matched {
            let rendered = text::reconstruct(node, &options);
            text.push_str(rendered.text.trim());
            text.push_str(policy.separator());
            if rendered.boundary_hit {
                debug!(template = template.name(), tag = node.tag(), "end selector reached");
                break;
            }
        }
    }

    let text = text::finish(&text).trim().to_string();
    if policy.is_compact() {
        Attempt::Success(compact(&text))
    } else {
        Attempt::Success(text)
    }
}

/// Trim every line and collapse runs of blank lines into one.
///
/// ```rust
/// use rs_purifier::policy::compact;
///
/// assert_eq!(compact("  a  \n\n\n\n b\n"), "a\n\nb");
/// ```
#[must_use]
pub fn compact(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    BLANK_LINE_RUN
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
