#![forbid(unsafe_code)]

//! Length-bounded segmentation of styled trees.
//!
//! The tree is walked depth-first in pre-order with a stack of effective
//! styles. Characters accumulate into the current chunk until a cut:
//!
//! - **Soft cut**: a space arriving after more than `cut_length` characters
//!   ends the chunk. The space itself is dropped.
//! - **Hard cut**: the character that would push the chunk past
//!   `max_length` ends it instead. The chunk gets a trailing `-` and the
//!   triggering character starts the next chunk.
//!
//! Length is counted in Unicode scalar values, so a cut can fall inside a
//! multi-scalar grapheme cluster. The hyphen marker is not counted.
//!
//! Every chunk is a structural node (no content, default style) whose
//! children are text leaves carrying their full effective style, so a chunk
//! renders the same wherever it is placed.

use chatkit_style::Style;
use smallvec::SmallVec;
use tracing::{debug, debug_span, trace};

use crate::node::StyledNode;

/// Splits styled trees into chunks of bounded length.
///
/// # Example
/// ```
/// use chatkit_text::{Segmenter, StyledNode};
///
/// let chunks = Segmenter::new(5, 8).segment(&StyledNode::text("hello world again"));
/// let texts: Vec<String> = chunks.iter().map(StyledNode::plain_text).collect();
/// assert_eq!(texts, ["hello", "world", "again"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    cut_length: usize,
    max_length: usize,
}

impl Segmenter {
    /// `cut_length` is where spaces start ending chunks, `max_length` the
    /// hard limit. `cut_length > max_length` just means every cut is hard.
    #[must_use]
    pub const fn new(cut_length: usize, max_length: usize) -> Self {
        Self {
            cut_length,
            max_length,
        }
    }

    #[inline]
    pub const fn cut_length(&self) -> usize {
        self.cut_length
    }

    #[inline]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Split `tree` into chunks. Always returns at least one chunk.
    #[must_use]
    pub fn segment(&self, tree: &StyledNode) -> Vec<StyledNode> {
        let _span = debug_span!(
            "segment",
            cut_length = self.cut_length,
            max_length = self.max_length
        )
        .entered();

        let mut state = SegmentState {
            segmenter: *self,
            styles: SmallVec::new(),
            chunk: Vec::new(),
            current_length: 0,
            chunks: Vec::new(),
        };
        state.visit(tree);
        let chunks = state.finish();
        debug!(chunks = chunks.len(), "Segmented tree");
        chunks
    }
}

/// Per-call working state.
struct SegmentState {
    segmenter: Segmenter,
    /// Effective style of each ancestor of the node being visited.
    styles: SmallVec<[Style; 8]>,
    /// Text leaves of the chunk being built.
    chunk: Vec<StyledNode>,
    current_length: usize,
    chunks: Vec<StyledNode>,
}

impl SegmentState {
    fn visit(&mut self, node: &StyledNode) {
        let effective = match self.styles.last() {
            Some(parent) => node.style().merge(parent),
            None => node.style().clone(),
        };

        if !node.content().is_empty() {
            self.scan(node.content(), &effective);
        }

        self.styles.push(effective);
        for child in node.children() {
            self.visit(child);
        }
        self.styles.pop();
    }

    fn scan(&mut self, text: &str, style: &Style) {
        let Segmenter {
            cut_length,
            max_length,
        } = self.segmenter;
        let mut buffer = String::new();

        for ch in text.chars() {
            self.current_length += 1;

            if ch == ' ' && self.current_length > cut_length {
                trace!(at = self.current_length, "Soft cut");
                self.flush(&mut buffer, style);
                if !self.chunk.is_empty() {
                    self.end_chunk();
                }
                self.current_length = 0;
            } else if self.current_length > max_length && self.current_length > 1 {
                trace!(at = self.current_length, "Hard cut");
                buffer.push('-');
                self.flush(&mut buffer, style);
                self.end_chunk();
                buffer.push(ch);
                self.current_length = 1;
            } else {
                buffer.push(ch);
            }
        }
        self.flush(&mut buffer, style);
    }

    /// Move buffered text into the current chunk.
    fn flush(&mut self, buffer: &mut String, style: &Style) {
        if !buffer.is_empty() {
            let text = std::mem::take(buffer);
            self.chunk.push(StyledNode::styled(text, style.clone()));
        }
    }

    fn end_chunk(&mut self) {
        let leaves = std::mem::take(&mut self.chunk);
        self.chunks.push(StyledNode::new().with_children(leaves));
    }

    fn finish(mut self) -> Vec<StyledNode> {
        if !self.chunk.is_empty() || self.chunks.is_empty() {
            self.end_chunk();
        }
        self.chunks
    }
}

/// Segment `tree` with a one-off [`Segmenter`].
#[must_use]
pub fn segment(tree: &StyledNode, cut_length: usize, max_length: usize) -> Vec<StyledNode> {
    Segmenter::new(cut_length, max_length).segment(tree)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chatkit_style::{NamedColor, TextDecoration};
    use proptest::prelude::*;

    fn leaf_strategy() -> impl Strategy<Value = StyledNode> {
        ("[a-z ]{0,12}", 0u8..16, any::<bool>()).prop_map(|(text, color, bold)| {
            let mut style = Style::new();
            if let Some(named) = NamedColor::from_index(color).filter(|_| color % 3 == 0) {
                style = style.color(named);
            }
            if bold {
                style = style.decorate(TextDecoration::Bold);
            }
            StyledNode::styled(text, style)
        })
    }

    fn tree_strategy() -> impl Strategy<Value = StyledNode> {
        leaf_strategy().prop_recursive(3, 24, 4, |inner| {
            (leaf_strategy(), proptest::collection::vec(inner, 0..4))
                .prop_map(|(node, children)| node.with_children(children))
        })
    }

    fn content_len(chunk: &StyledNode) -> usize {
        let text = chunk.plain_text();
        let count = text.chars().count();
        if text.ends_with('-') { count - 1 } else { count }
    }

    proptest! {
        #[test]
        fn chunks_respect_max_length(tree in tree_strategy(), cut in 0usize..10, extra in 0usize..10) {
            let max = cut + extra;
            for chunk in segment(&tree, cut, max) {
                prop_assert!(content_len(&chunk) <= max.max(1));
            }
        }

        #[test]
        fn segmentation_keeps_every_non_space_char(tree in tree_strategy(), cut in 0usize..10, extra in 0usize..10) {
            let chunks = segment(&tree, cut, cut + extra);
            let original: String = tree.plain_text().chars().filter(|c| *c != ' ').collect();
            let rejoined: String = chunks
                .iter()
                .flat_map(|chunk| {
                    let text = chunk.plain_text();
                    let text = text.strip_suffix('-').map(str::to_owned).unwrap_or(text);
                    text.chars().filter(|c| *c != ' ').collect::<Vec<_>>()
                })
                .collect();
            prop_assert_eq!(rejoined, original);
        }

        #[test]
        fn chunk_styles_match_tree_styles(tree in tree_strategy(), cut in 0usize..10, extra in 0usize..10) {
            let chunks = segment(&tree, cut, cut + extra);
            let mut expected = tree.spans().into_iter().flat_map(|span| {
                let style = span.style;
                span.text.chars().map(move |c| (c, style.clone())).collect::<Vec<_>>()
            }).filter(|(c, _)| *c != ' ');
            for chunk in &chunks {
                let mut leaves = chunk.spans();
                if let Some(last) = leaves.last_mut() {
                    if chunk.plain_text().ends_with('-') {
                        last.text.pop();
                    }
                }
                for span in leaves {
                    for c in span.text.chars().filter(|c| *c != ' ') {
                        let (want_char, want_style) = expected.next().unwrap();
                        prop_assert_eq!(c, want_char);
                        prop_assert_eq!(&span.style, &want_style);
                    }
                }
            }
            prop_assert!(expected.next().is_none());
        }
    }
}
