#![forbid(unsafe_code)]

//! Style types for chatkit markup trees.
//!
//! This crate provides:
//! - [`Rgb`] with the perceptual luminance and closeness math used by filters
//! - [`NamedColor`] (the 16 standard chat colors) and the CSS-extended
//!   color table
//! - [`Style`] with "inherit if absent" cascading over tri-state decorations

/// Color values, named colors, and color math.
pub mod color;
/// CSS-extended color keywords.
pub mod css;
/// Decorations, events, and the cascading [`Style`].
pub mod style;

pub use color::{CLOSE_CHANNEL_DISTANCE, Color, ColorParseError, NamedColor, Rgb};
pub use css::css_color;
pub use style::{
    ClickAction, ClickEvent, DecorationState, Decorations, HoverEvent, Style, TextDecoration,
};
