//! Text reconstruction of tag trees.
//!
//! Rendering walks a node's children in order and joins their text with a
//! separator chosen per tag (see [`join_for`]). Line breaks travel through
//! the rendering as [`LINE_BREAK`] markers so list items can drop them;
//! [`finish`] turns the markers into newlines.

use std::sync::LazyLock;

use crate::selector::{any_matches, Selector};
use crate::tree::{Child, Node};

/// Placeholder for a line break inside rendered text.
pub const LINE_BREAK: char = '\u{E000}';

/// Bullet prefix of a rendered list item.
pub const LIST_BULLET: &str = "* ";

#[allow(clippy::expect_used)]
static CRAYON_LINE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::attr("div", "class", "r:crayon-line.*").expect("crayon line selector")
});

#[allow(clippy::expect_used)]
static CRAYON_NUMS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    ["crayon-num", "crayon-striped-num", "crayon-nums-content"]
        .map(|class| Selector::attr("div", "class", class).expect("crayon number selector"))
});

/// Boundaries for one rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Separator handed to the root, `None` for the tag defaults.
    pub separator: Option<&'static str>,
    /// A child matching any of these stops the rendering.
    pub end: &'a [Selector],
    /// Children matching any of these are skipped.
    pub ignore: &'a [Selector],
}

/// Rendered text plus whether an end selector was reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Text with [`LINE_BREAK`] markers still in place.
    pub text: String,
    /// True once a child matched an end selector.
    pub boundary_hit: bool,
}

/// The join string of `node` and the separator it hands to its children,
/// given the separator its parent handed down.
///
/// The `crayon-*` rules keep code listings of that syntax highlighter
/// readable: line numbers space-joined, line content joined tight.
#[must_use]
pub fn join_for(node: &Node, inherited: Option<&'static str>) -> (&'static str, Option<&'static str>) {
    match node.tag() {
        "ul" => ("\n", Some("\n")),
        "div" if CRAYON_LINE.matches(node) => ("", Some("")),
        "div" if any_matches(CRAYON_NUMS.as_slice(), node) => (" ", Some(" ")),
        "div" => (" ", Some(" ")),
        "a" | "p" | "article" | "strong" | "dd" | "dt" | "dl" => ("", Some("")),
        "td" => ("\t", Some("\t")),
        tag => match inherited {
            None => match tag {
                "input" | "span" | "time" | "em" => ("", Some("")),
                "tr" => ("\t", Some("\t")),
                "li" => ("\n", Some("\n")),
                _ => ("\n", None),
            },
            Some(sep) if tag == "tr" => (sep, Some(sep)),
            Some(_) => ("", Some("")),
        },
    }
}

/// Render a node's subtree.
#[must_use]
pub fn reconstruct(node: &Node, options: &RenderOptions<'_>) -> Rendered {
    let mut rendered = Rendered::default();
    if matches!(node.tag(), "script" | "style" | "form") {
        return rendered;
    }

    let (join, handed) = join_for(node, options.separator);
    let child_options = RenderOptions {
        separator: handed,
        ..*options
    };

    for child in node.children() {
        let (piece, tag) = match child {
            Child::Text(text) => (text.clone(), None),
            Child::LineBreak => (LINE_BREAK.to_string(), None),
            Child::Node(element) => {
                if any_matches(options.end, element) {
                    rendered.boundary_hit = true;
                    break;
                }
                if any_matches(options.ignore, element) {
                    continue;
                }
                let inner = reconstruct(element, &child_options);
                if inner.boundary_hit {
                    rendered.boundary_hit = true;
                }
                (inner.text, Some(element.tag()))
            }
        };

        if tag == Some("li") {
            let item = piece.replace(LINE_BREAK, "");
            if !item.trim().is_empty() {
                rendered.text.push_str(LIST_BULLET);
                rendered.text.push_str(&item);
                rendered.text.push('\n');
            }
        } else {
            rendered.text.push_str(&piece);
            rendered.text.push_str(join);
        }

        if rendered.boundary_hit {
            break;
        }
    }

    rendered
}

/// Replace line-break markers with newlines.
#[must_use]
pub fn finish(text: &str) -> String {
    text.replace(LINE_BREAK, "\n")
}

impl Node {
    /// Rendered text of the subtree with the tag defaults and no
    /// boundaries, markers still in place.
    #[must_use]
    pub fn text(&self) -> String {
        reconstruct(self, &RenderOptions::default()).text
    }
}
