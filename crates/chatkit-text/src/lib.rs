#![forbid(unsafe_code)]

//! Styled text trees, markup filtering and segmentation.
//!
//! - [`StyledNode`] is an immutable tree of text with cascading styles.
//! - [`filter`] and [`parse_filtered`] apply a [`FilterConfig`] to markup,
//!   producing either filtered markup or a filtered tree.
//! - [`legacy`] translates the `&`-code dialect into tags.
//! - [`Segmenter`] splits a tree into length-bounded chunks.

pub mod config;
pub mod filter;
pub mod legacy;
pub mod node;
pub mod parse;
pub mod segment;
pub mod tag;

#[cfg(feature = "serde")]
pub use config::FilterSettings;
pub use config::{ConfigError, FilterConfig, FilterConfigBuilder};
pub use filter::{Decision, MarkupFilter, filter, parse_filtered, scrub};
pub use node::{Span, StyledNode};
pub use parse::{
    BasicParser, MarkupParser, ParseError, Placeholder, PlaceholderResolver, Placeholders,
};
pub use segment::{Segmenter, segment};
pub use tag::{Tag, TagKind, Token, tokenize};
