#![forbid(unsafe_code)]

//! Immutable styled text tree.
//!
//! A [`StyledNode`] carries optional literal text, its own (unresolved)
//! [`Style`], and ordered children. The effective style of a node is its own
//! style merged over its parent's effective style, all the way up to the
//! root. Nodes are never mutated after construction; filters and the
//! segmenter build new trees.

use chatkit_style::Style;

/// One node of a styled text tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StyledNode {
    content: String,
    style: Style,
    children: Vec<StyledNode>,
}

impl StyledNode {
    /// An empty structural node with no style.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: String::new(),
            style: Style::new(),
            children: Vec::new(),
        }
    }

    /// An unstyled text leaf.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new()
        }
    }

    /// A text leaf with its own style.
    #[must_use]
    pub fn styled(content: impl Into<String>, style: Style) -> Self {
        Self {
            content: content.into(),
            style,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: StyledNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = StyledNode>) -> Self {
        self.children.extend(children);
        self
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The node's own style, before inheritance.
    #[inline]
    pub fn style(&self) -> &Style {
        &self.style
    }

    #[inline]
    pub fn children(&self) -> &[StyledNode] {
        &self.children
    }

    pub(crate) fn into_parts(self) -> (String, Style, Vec<StyledNode>) {
        (self.content, self.style, self.children)
    }

    /// True when neither this node nor any descendant carries text.
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.children.iter().all(StyledNode::is_blank)
    }

    /// All text in pre-order, without styling.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.content);
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Number of Unicode scalar values in [`Self::plain_text`].
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
            + self
                .children
                .iter()
                .map(StyledNode::char_count)
                .sum::<usize>()
    }

    /// Flatten into runs of text with their effective styles.
    ///
    /// Runs are produced in pre-order; adjacent runs with identical effective
    /// styles are coalesced and empty text is skipped. Two trees with the
    /// same spans render identically.
    pub fn spans(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        self.collect_spans(&Style::new(), &mut spans);
        spans
    }

    fn collect_spans(&self, parent: &Style, spans: &mut Vec<Span>) {
        let effective = self.style.merge(parent);
        if !self.content.is_empty() {
            match spans.last_mut() {
                Some(last) if last.style == effective => last.text.push_str(&self.content),
                _ => spans.push(Span {
                    text: self.content.clone(),
                    style: effective.clone(),
                }),
            }
        }
        for child in &self.children {
            child.collect_spans(&effective, spans);
        }
    }
}

impl From<&str> for StyledNode {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for StyledNode {
    fn from(content: String) -> Self {
        Self::text(content)
    }
}

/// A run of text with its fully resolved style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    #[must_use]
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}
