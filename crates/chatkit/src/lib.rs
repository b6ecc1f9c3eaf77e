#![forbid(unsafe_code)]

//! Chat markup filtering and styled text segmentation.
//!
//! Three entry points cover the common flow:
//!
//! - [`filter`] removes disabled or blocked markup from a string.
//! - [`parse_filtered`] filters and builds a [`StyledNode`] tree.
//! - [`segment`] splits a tree into length-bounded chunks.
//!
//! ```
//! use chatkit::{FilterConfig, filter, parse_filtered, segment};
//!
//! let config = FilterConfig::builder().gradients(false).build()?;
//! assert_eq!(
//!     filter("<gradient:#1eae98:#d8b5ff>Majekdor</gradient>", &config),
//!     "Majekdor"
//! );
//!
//! let tree = parse_filtered("<blue>I am Majekdor the great", &config)?;
//! let chunks: Vec<String> = segment(&tree, 6, 14).iter().map(|c| c.plain_text()).collect();
//! assert_eq!(chunks, ["I am Majekdor", "the great"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The building blocks live in [`style`] and [`text`].

pub use chatkit_style as style;
pub use chatkit_text as text;

pub use chatkit_style::{Color, DecorationState, NamedColor, Rgb, Style, TextDecoration};
#[cfg(feature = "serde")]
pub use chatkit_text::FilterSettings;
pub use chatkit_text::{
    ConfigError, FilterConfig, FilterConfigBuilder, MarkupFilter, MarkupParser, ParseError,
    Placeholder, PlaceholderResolver, Placeholders, Segmenter, Span, StyledNode,
};

/// Filter `markup` under `config`, returning markup.
///
/// Legacy codes are translated or stripped first. Tags of disabled
/// categories are removed, disabled transformations become literal text,
/// and tags carrying blocked values are removed.
#[must_use]
pub fn filter(markup: &str, config: &FilterConfig) -> String {
    chatkit_text::filter(markup, config)
}

/// Filter `markup` under `config` and parse it into a styled tree.
///
/// Blocked decorations are forced off and blocked colors cleared across
/// the whole tree.
pub fn parse_filtered(markup: &str, config: &FilterConfig) -> Result<StyledNode, ParseError> {
    chatkit_text::parse_filtered(markup, config)
}

/// Split `tree` into chunks of at most `max_length` characters, preferring
/// to cut at the first space past `cut_length`.
#[must_use]
pub fn segment(tree: &StyledNode, cut_length: usize, max_length: usize) -> Vec<StyledNode> {
    chatkit_text::segment(tree, cut_length, max_length)
}
