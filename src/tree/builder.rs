//! Tree assembly from a start-tag / end-tag / text event stream.
//!
//! The builder keeps a stack of open nodes it owns outright. A node is
//! attached to its parent when it is popped, which keeps siblings in
//! document order because text and line breaks only ever go to the top of
//! the stack.

use tracing::debug;

use super::tags::{
    implicitly_closes, is_newline_on_close_tag, is_prefix_newline_tag, is_void_tag, TagClass, TagTable,
};
use super::{Document, Node};

/// Builder state between events.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Normal,
    /// Everything up to the first end tag named `tag` is suppressed.
    InsideDroppedSubtree { tag: String },
    /// Subtree of an ignore-class tag; same-name nesting is counted. Left
    /// early by a start tag that implicitly closes `tag`.
    InsideIgnoredSubtree { tag: String, depth: usize },
}

/// Streaming tag tree builder.
///
/// Feed it events in document order, then call [`TreeBuilder::finish`].
/// It never fails: unbalanced markup is repaired or ignored.
pub struct TreeBuilder<'t> {
    table: &'t TagTable,
    max_depth: usize,
    state: State,
    stack: Vec<Node>,
    roots: Vec<Node>,
    pending_text: String,
    nested_paragraph: bool,
    last_start_tag: Option<String>,
    /// Start tags not pushed at the depth limit, innermost last.
    overflow: Vec<String>,
}

impl<'t> TreeBuilder<'t> {
    /// Create a builder using `table` for classification and keeping at most
    /// `max_depth` open elements.
    #[must_use]
    pub fn new(table: &'t TagTable, max_depth: usize) -> Self {
        Self {
            table,
            max_depth: max_depth.max(1),
            state: State::Normal,
            stack: Vec::new(),
            roots: Vec::new(),
            pending_text: String::new(),
            nested_paragraph: false,
            last_start_tag: None,
            overflow: Vec::new(),
        }
    }

    /// Handle a start tag.
    pub fn start_tag(&mut self, tag: &str, attributes: Vec<(String, String)>, self_closing: bool) {
        self.flush_text();
        let tag = tag.to_ascii_lowercase();
        let opens_scope = !self_closing && !is_void_tag(&tag);

        match &mut self.state {
            State::InsideDroppedSubtree { .. } => return,
            State::InsideIgnoredSubtree { tag: open, depth } => {
                if implicitly_closes(open, &tag) {
                    debug!(open = %open, tag = %tag, "start tag closes ignored element");
                    self.state = State::Normal;
                } else {
                    if *open == tag && opens_scope {
                        *depth += 1;
                    }
                    return;
                }
            }
            State::Normal => {}
        }

        let mut node = Node::new(&tag, attributes);
        if self.table.drop_selectors().iter().any(|s| s.matches(&node)) {
            if opens_scope {
                debug!(tag = %tag, attributes = ?node.attributes(), "entering dropped tag");
                self.state = State::InsideDroppedSubtree { tag };
            }
            return;
        }

        self.last_start_tag = Some(tag.clone());

        if is_prefix_newline_tag(&tag) {
            if let Some(top) = self.stack.last_mut() {
                top.push_text("\n");
            }
        }

        if tag == "p" && self.top_is("p") {
            self.nested_paragraph = true;
            return;
        }

        if tag == "li" && self.top_is("li") {
            debug!("closing unbalanced <li> before opening the next one");
            self.close_top();
        }

        if tag == "br" {
            if let Some(top) = self.stack.last_mut() {
                top.push_line_break();
            }
            return;
        }

        if tag == "p" && node.has_attributes() {
            node.push_line_break();
            self.open(node);
            return;
        }

        match self.table.classify(&tag) {
            TagClass::Normal => self.open(node),
            TagClass::Ignore => {
                if opens_scope {
                    self.state = State::InsideIgnoredSubtree { tag, depth: 1 };
                }
            }
            TagClass::IgnoreKeepData | TagClass::IgnoreNoData | TagClass::IgnoreWithNewline => {}
        }
    }

    /// Handle an end tag.
    pub fn end_tag(&mut self, tag: &str) {
        self.flush_text();
        let tag = tag.to_ascii_lowercase();

        match &mut self.state {
            State::InsideDroppedSubtree { tag: open } => {
                if *open == tag {
                    debug!(tag = %tag, "exiting dropped tag");
                    self.state = State::Normal;
                }
                return;
            }
            State::InsideIgnoredSubtree { tag: open, depth } => {
                if *open == tag {
                    *depth -= 1;
                    if *depth == 0 {
                        self.state = State::Normal;
                    }
                }
                return;
            }
            State::Normal => {}
        }

        if self.overflow.last() == Some(&tag) {
            self.overflow.pop();
            return;
        }

        if let Some(top) = self.stack.last_mut() {
            if is_newline_on_close_tag(top.tag()) {
                top.push_line_break();
            }
        }

        if tag == "p" {
            if !self.top_is("p") {
                return;
            }
        } else if self.table.classify(&tag).is_ignored() {
            self.last_start_tag = self.stack.last().map(|top| top.tag().to_string());
            return;
        }

        if self.top_is(&tag) {
            self.close_top();
        } else if self.stack.len() > 1 && self.stack[self.stack.len() - 2].tag() == tag {
            debug!(tag = %tag, discarded = ?self.stack.last().map(Node::tag), "recovering unbalanced tag");
            self.close_top();
            self.close_top();
        } else {
            debug!(tag = %tag, "ignoring unbalanced end tag");
        }
    }

    /// Handle a run of character data.
    ///
    /// Adjacent runs are joined; the result is processed at the next tag.
    pub fn text(&mut self, data: &str) {
        self.pending_text.push_str(data);
    }

    /// Close every open element and return the document.
    #[must_use]
    pub fn finish(mut self) -> Document {
        self.flush_text();
        while !self.stack.is_empty() {
            self.close_top();
        }
        Document::from_roots(self.roots)
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.pending_text);

        if self.state != State::Normal {
            return;
        }
        if let Some(last) = &self.last_start_tag {
            if self.table.classify(last) == TagClass::IgnoreNoData {
                return;
            }
        }
        let Some(top) = self.stack.last_mut() else {
            return;
        };

        let mut data = match top.tag() {
            "div" | "ul" => data.trim().to_string(),
            "li" => data.replace('\n', " "),
            _ => data,
        };
        if matches!(top.tag(), "td" | "tr") && data == "\n" {
            return;
        }
        if data.is_empty() {
            return;
        }
        if self.nested_paragraph {
            self.nested_paragraph = false;
            data.insert(0, '\n');
        }
        top.push_text(data);
    }

    fn open(&mut self, node: Node) {
        if self.stack.len() >= self.max_depth {
            debug!(tag = %node.tag(), depth = self.stack.len(), "tree depth limit reached");
            if !is_void_tag(node.tag()) {
                self.overflow.push(node.tag().to_string());
            }
            return;
        }
        self.stack.push(node);
    }

    fn close_top(&mut self) {
        if let Some(node) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.push_node(node),
                None => self.roots.push(node),
            }
        }
    }

    fn top_is(&self, tag: &str) -> bool {
        self.stack.last().is_some_and(|top| top.tag() == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use crate::tree::Child;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_balanced_markup_builds_nested_nodes() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("html", vec![], false);
        builder.start_tag("span", vec![], false);
        builder.text("hi");
        builder.end_tag("span");
        builder.end_tag("html");
        let doc = builder.finish();

        let html = &doc.roots()[0];
        let span = html.child_nodes().next().unwrap();
        assert_eq!(span.tag(), "span");
        assert_eq!(span.text_fragments().collect::<Vec<_>>(), vec!["hi"]);
    }

    #[test]
    fn test_adjacent_text_runs_are_joined() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("span", vec![], false);
        builder.text("a");
        builder.text("b");
        builder.end_tag("span");
        let doc = builder.finish();
        assert_eq!(doc.roots()[0].children(), &[Child::Text("ab".into())]);
    }

    #[test]
    fn test_mismatched_top_is_discarded() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("section", vec![], false);
        builder.start_tag("span", vec![], false);
        builder.text("x");
        builder.end_tag("section");
        builder.start_tag("article", vec![], false);
        builder.end_tag("article");
        let doc = builder.finish();

        let tags: Vec<&str> = doc.roots().iter().map(Node::tag).collect();
        assert_eq!(tags, vec!["section", "article"]);
        assert_eq!(doc.roots()[0].child_nodes().next().map(Node::tag), Some("span"));
    }

    #[test]
    fn test_deep_mismatch_is_ignored() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("article", vec![], false);
        builder.start_tag("section", vec![], false);
        builder.start_tag("span", vec![], false);
        builder.end_tag("article");
        builder.text("still inside");
        let doc = builder.finish();

        let span = doc.nodes().find(|n| n.tag() == "span").unwrap();
        assert_eq!(span.text_fragments().collect::<Vec<_>>(), vec!["still inside"]);
    }

    #[test]
    fn test_ignored_subtree_is_excluded() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("article", vec![], false);
        builder.start_tag("nav", vec![], false);
        builder.start_tag("span", vec![], false);
        builder.text("menu");
        builder.end_tag("span");
        builder.end_tag("nav");
        builder.text("body");
        builder.end_tag("article");
        let doc = builder.finish();

        assert!(doc.nodes().all(|n| n.tag() != "span"));
        assert_eq!(doc.roots()[0].text_fragments().collect::<Vec<_>>(), vec!["body"]);
    }

    #[test]
    fn test_void_ignore_tag_opens_no_scope() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("span", vec![], false);
        builder.start_tag("input", vec![], false);
        builder.text("kept");
        builder.end_tag("span");
        let doc = builder.finish();
        assert_eq!(doc.roots()[0].text_fragments().collect::<Vec<_>>(), vec!["kept"]);
    }

    #[test]
    fn test_drop_selector_suppresses_until_first_close() {
        let drop = Selector::new(Some("span"), Some("class"), Some("ad")).unwrap();
        let table = TagTable::with_overrides(&[], &[drop], &[]);
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("article", vec![], false);
        builder.start_tag("span", attrs(&[("class", "ad")]), false);
        builder.start_tag("span", vec![], false);
        builder.text("hidden");
        builder.end_tag("span");
        builder.text("leaked");
        builder.end_tag("span");
        builder.text("shown");
        builder.end_tag("article");
        let doc = builder.finish();

        let article = &doc.roots()[0];
        assert_eq!(article.text_fragments().collect::<Vec<_>>(), vec!["leaked", "shown"]);
        assert!(article.child_nodes().next().is_none());
    }

    #[test]
    fn test_nested_paragraph_is_not_nested() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("span", vec![], false);
        builder.start_tag("p", attrs(&[("class", "lead")]), false);
        builder.text("A");
        builder.start_tag("p", vec![], false);
        builder.text("B");
        builder.end_tag("p");
        builder.end_tag("span");
        let doc = builder.finish();

        let p = doc.nodes().find(|n| n.tag() == "p").unwrap();
        assert_eq!(doc.nodes().filter(|n| n.tag() == "p").count(), 1);
        assert_eq!(p.children()[0], Child::LineBreak);
        assert_eq!(p.text_fragments().collect::<Vec<_>>(), vec!["A", "\n", "\nB"]);
    }

    #[test]
    fn test_list_item_auto_closes_previous() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("ol", vec![], false);
        builder.start_tag("li", vec![], false);
        builder.text("one");
        builder.start_tag("li", vec![], false);
        builder.text("two");
        builder.end_tag("ol");
        let doc = builder.finish();

        let ol = &doc.roots()[0];
        let items: Vec<&Node> = ol.child_nodes().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text_fragments().collect::<Vec<_>>(), vec!["two"]);
    }

    #[test]
    fn test_text_cleanup_by_context() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("div", vec![], false);
        builder.text("  padded  ");
        builder.start_tag("li", vec![], false);
        builder.text("a\nb");
        builder.end_tag("li");
        builder.start_tag("td", vec![], false);
        builder.text("\n");
        builder.end_tag("td");
        builder.end_tag("div");
        let doc = builder.finish();

        let div = &doc.roots()[0];
        assert_eq!(div.text_fragments().next(), Some("padded"));
        let li = div.child_nodes().next().unwrap();
        assert_eq!(li.text_fragments().collect::<Vec<_>>(), vec!["a b"]);
        let td = div.child_nodes().nth(1).unwrap();
        assert!(td.text_fragments().next().is_none());
    }

    #[test]
    fn test_depth_limit_stops_pushing() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 3);
        for _ in 0..10 {
            builder.start_tag("span", vec![], false);
        }
        builder.text("deep");
        let doc = builder.finish();
        assert_eq!(doc.nodes().count(), 3);
        let deepest = doc.nodes().last().unwrap();
        assert_eq!(deepest.text_fragments().collect::<Vec<_>>(), vec!["deep"]);
    }

    #[test]
    fn test_end_tags_of_skipped_opens_are_consumed() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 2);
        builder.start_tag("div", vec![], false);
        builder.start_tag("div", vec![], false);
        builder.start_tag("div", vec![], false);
        builder.text("deep");
        builder.end_tag("div");
        builder.text("inner");
        builder.end_tag("div");
        builder.text("outer");
        builder.end_tag("div");
        let doc = builder.finish();

        let outer = &doc.roots()[0];
        assert_eq!(doc.nodes().count(), 2);
        assert_eq!(outer.text_fragments().collect::<Vec<_>>(), vec!["outer"]);
        let inner = outer.child_nodes().next().unwrap();
        assert_eq!(inner.text_fragments().collect::<Vec<_>>(), vec!["deep", "inner"]);
    }

    #[test]
    fn test_body_start_closes_unterminated_head() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("html", vec![], false);
        builder.start_tag("head", vec![], false);
        builder.start_tag("meta", attrs(&[("charset", "utf-8")]), false);
        builder.start_tag("title", vec![], false);
        builder.text("T");
        builder.end_tag("title");
        builder.start_tag("body", vec![], false);
        builder.start_tag("span", vec![], false);
        builder.text("Hello");
        builder.end_tag("span");
        let doc = builder.finish();

        let span = doc.nodes().find(|n| n.tag() == "span").unwrap();
        assert_eq!(span.text_fragments().collect::<Vec<_>>(), vec!["Hello"]);
        assert!(doc.nodes().all(|n| n.tag() != "title"));
    }

    #[test]
    fn test_row_start_closes_unterminated_colgroup() {
        let table = TagTable::default();
        let mut builder = TreeBuilder::new(&table, 64);
        builder.start_tag("table", vec![], false);
        builder.start_tag("colgroup", vec![], false);
        builder.start_tag("col", vec![], false);
        builder.start_tag("col", vec![], false);
        builder.start_tag("tr", vec![], false);
        builder.start_tag("td", vec![], false);
        builder.text("cell");
        builder.end_tag("td");
        builder.end_tag("tr");
        builder.end_tag("table");
        let doc = builder.finish();

        let td = doc.nodes().find(|n| n.tag() == "td").unwrap();
        assert_eq!(td.text_fragments().collect::<Vec<_>>(), vec!["cell"]);
    }
}
