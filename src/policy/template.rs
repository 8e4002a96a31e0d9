//! Rules, templates and template sets.

use crate::selector::Selector;

/// Name given to the template of a policy declared with a bare rule list.
pub const DEFAULT_TEMPLATE: &str = "default";

/// One extraction step: where the content starts, where it stops and what
/// to leave out.
#[derive(Debug, Clone)]
pub struct Rule {
    start: Selector,
    optional: bool,
    end: Vec<Selector>,
    ignore: Vec<Selector>,
}

impl Rule {
    /// Required rule: a document without a `start` match fails the template.
    #[must_use]
    pub fn new(start: Selector) -> Self {
        Self {
            start,
            optional: false,
            end: Vec::new(),
            ignore: Vec::new(),
        }
    }

    /// Rule skipped when nothing matches `start`.
    #[must_use]
    pub fn optional(start: Selector) -> Self {
        Self {
            optional: true,
            ..Self::new(start)
        }
    }

    /// Add an end boundary.
    #[must_use]
    pub fn end(mut self, selector: Selector) -> Self {
        self.end.push(selector);
        self
    }

    /// Add a selector for children to skip.
    #[must_use]
    pub fn ignore(mut self, selector: Selector) -> Self {
        self.ignore.push(selector);
        self
    }

    /// Start selector.
    #[must_use]
    pub fn start_selector(&self) -> &Selector {
        &self.start
    }

    /// Whether a missing start match is tolerated.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// End selectors.
    #[must_use]
    pub fn end_selectors(&self) -> &[Selector] {
        &self.end
    }

    /// Ignore selectors.
    #[must_use]
    pub fn ignore_selectors(&self) -> &[Selector] {
        &self.ignore
    }
}

/// A named, ordered list of rules.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    rules: Vec<Rule>,
}

impl Template {
    #[must_use]
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// The templates of a policy, in the order they are tried.
#[derive(Debug, Clone)]
pub enum TemplateSet {
    /// Tried in name order.
    Sorted(Vec<Template>),
    /// Tried in insertion order on every call.
    Ordered(Vec<Template>),
}

impl TemplateSet {
    /// Named templates sorted by name. A repeated name keeps the last
    /// definition.
    #[must_use]
    pub fn named<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Rule>)>,
        S: Into<String>,
    {
        let mut sorted: Vec<Template> = Vec::new();
        for (name, rules) in templates {
            let template = Template::new(name, rules);
            match sorted.binary_search_by(|t| t.name.as_str().cmp(template.name())) {
                Ok(index) => sorted[index] = template,
                Err(index) => sorted.insert(index, template),
            }
        }
        Self::Sorted(sorted)
    }

    /// Templates tried exactly in the given order.
    #[must_use]
    pub fn ordered<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Rule>)>,
        S: Into<String>,
    {
        Self::Ordered(
            templates
                .into_iter()
                .map(|(name, rules)| Template::new(name, rules))
                .collect(),
        )
    }

    #[must_use]
    pub fn templates(&self) -> &[Template] {
        match self {
            Self::Sorted(templates) | Self::Ordered(templates) => templates,
        }
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates().is_empty()
    }
}
