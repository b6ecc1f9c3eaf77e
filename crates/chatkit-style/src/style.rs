#![forbid(unsafe_code)]

//! Style types with "inherit if absent" cascading semantics.

use std::fmt;

use bitflags::bitflags;
use tracing::{instrument, trace};

use crate::color::Color;

bitflags! {
    /// Set of decorations, one bit per [`TextDecoration`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Decorations: u8 {
        const OBFUSCATED = 1 << 0;
        const BOLD = 1 << 1;
        const STRIKETHROUGH = 1 << 2;
        const UNDERLINED = 1 << 3;
        const ITALIC = 1 << 4;
    }
}

/// A text decoration that can be switched on or off per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TextDecoration {
    Obfuscated,
    Bold,
    Strikethrough,
    Underlined,
    Italic,
}

impl TextDecoration {
    pub const ALL: [TextDecoration; 5] = [
        Self::Obfuscated,
        Self::Bold,
        Self::Strikethrough,
        Self::Underlined,
        Self::Italic,
    ];

    #[must_use]
    pub const fn flag(self) -> Decorations {
        match self {
            Self::Obfuscated => Decorations::OBFUSCATED,
            Self::Bold => Decorations::BOLD,
            Self::Strikethrough => Decorations::STRIKETHROUGH,
            Self::Underlined => Decorations::UNDERLINED,
            Self::Italic => Decorations::ITALIC,
        }
    }

    /// Canonical tag name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Obfuscated => "obfuscated",
            Self::Bold => "bold",
            Self::Strikethrough => "strikethrough",
            Self::Underlined => "underlined",
            Self::Italic => "italic",
        }
    }

    /// Resolve a tag name or one of its short aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "obfuscated" | "obf" => Some(Self::Obfuscated),
            "bold" | "b" => Some(Self::Bold),
            "strikethrough" | "st" => Some(Self::Strikethrough),
            "underlined" | "u" => Some(Self::Underlined),
            "italic" | "i" | "em" => Some(Self::Italic),
            _ => None,
        }
    }
}

impl fmt::Display for TextDecoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tri-state value of one decoration on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecorationState {
    /// Inherit from the parent.
    #[default]
    NotSet,
    True,
    False,
}

impl DecorationState {
    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::NotSet)
    }
}

impl From<bool> for DecorationState {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

/// Action performed when text is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickAction {
    OpenUrl,
    OpenFile,
    RunCommand,
    SuggestCommand,
    ChangePage,
    CopyToClipboard,
}

impl ClickAction {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenUrl => "open_url",
            Self::OpenFile => "open_file",
            Self::RunCommand => "run_command",
            Self::SuggestCommand => "suggest_command",
            Self::ChangePage => "change_page",
            Self::CopyToClipboard => "copy_to_clipboard",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "open_url" => Some(Self::OpenUrl),
            "open_file" => Some(Self::OpenFile),
            "run_command" => Some(Self::RunCommand),
            "suggest_command" => Some(Self::SuggestCommand),
            "change_page" => Some(Self::ChangePage),
            "copy_to_clipboard" => Some(Self::CopyToClipboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClickEvent {
    pub action: ClickAction,
    pub value: String,
}

/// Content shown while hovering. Text is kept as unparsed markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HoverEvent {
    ShowText(String),
}

/// Node style with "inherit if absent" cascading.
///
/// Every attribute is optional; an unset attribute takes the value of the
/// nearest ancestor that sets it. Decorations are tri-state so a child can
/// switch off a decoration its parent switched on.
///
/// # Example
/// ```
/// use chatkit_style::{Color, NamedColor, Style, TextDecoration, DecorationState};
///
/// let parent = Style::new().color(NamedColor::Blue).decorate(TextDecoration::Bold);
/// let child = Style::new().decoration(TextDecoration::Bold, false);
/// let merged = child.merge(&parent);
/// assert_eq!(merged.color, Some(Color::Named(NamedColor::Blue)));
/// assert_eq!(merged.decoration_state(TextDecoration::Bold), DecorationState::False);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub color: Option<Color>,
    /// Decorations explicitly switched on. Disjoint from `decorations_off`.
    decorations_on: Decorations,
    /// Decorations explicitly switched off.
    decorations_off: Decorations,
    pub font: Option<String>,
    pub insertion: Option<String>,
    pub click: Option<ClickEvent>,
    pub hover: Option<HoverEvent>,
}

impl Style {
    /// Create an empty style (all properties inherit).
    #[inline]
    pub const fn new() -> Self {
        Self {
            color: None,
            decorations_on: Decorations::empty(),
            decorations_off: Decorations::empty(),
            font: None,
            insertion: None,
            click: None,
            hover: None,
        }
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn without_color(mut self) -> Self {
        self.color = None;
        self
    }

    /// Switch a decoration on.
    #[must_use]
    pub fn decorate(self, decoration: TextDecoration) -> Self {
        self.decoration(decoration, DecorationState::True)
    }

    /// Set a decoration to an explicit state (or back to inherit).
    #[must_use]
    pub fn decoration(mut self, decoration: TextDecoration, state: impl Into<DecorationState>) -> Self {
        let flag = decoration.flag();
        self.decorations_on.remove(flag);
        self.decorations_off.remove(flag);
        match state.into() {
            DecorationState::True => self.decorations_on.insert(flag),
            DecorationState::False => self.decorations_off.insert(flag),
            DecorationState::NotSet => {}
        }
        self
    }

    #[must_use]
    pub fn decoration_state(&self, decoration: TextDecoration) -> DecorationState {
        let flag = decoration.flag();
        if self.decorations_on.contains(flag) {
            DecorationState::True
        } else if self.decorations_off.contains(flag) {
            DecorationState::False
        } else {
            DecorationState::NotSet
        }
    }

    /// Whether the decoration is explicitly on.
    #[inline]
    pub fn has_decoration(&self, decoration: TextDecoration) -> bool {
        self.decorations_on.contains(decoration.flag())
    }

    /// Decorations explicitly switched on.
    #[inline]
    pub const fn decorations(&self) -> Decorations {
        self.decorations_on
    }

    #[must_use]
    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    #[must_use]
    pub fn insertion(mut self, insertion: impl Into<String>) -> Self {
        self.insertion = Some(insertion.into());
        self
    }

    #[must_use]
    pub fn click(mut self, action: ClickAction, value: impl Into<String>) -> Self {
        self.click = Some(ClickEvent {
            action,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn hover_text(mut self, text: impl Into<String>) -> Self {
        self.hover = Some(HoverEvent::ShowText(text.into()));
        self
    }

    /// Cascade merge: fill in unset attributes from `parent`.
    ///
    /// `child.merge(parent)` keeps every attribute the child sets and takes
    /// the parent's value for the rest. Decorations merge per flag: a
    /// child's explicit on/off always wins.
    #[instrument(skip(self, parent), level = "trace")]
    pub fn merge(&self, parent: &Style) -> Style {
        trace!("Merging child style into parent");
        let explicit = self.decorations_on | self.decorations_off;
        Style {
            color: self.color.or(parent.color),
            decorations_on: self.decorations_on | (parent.decorations_on - explicit),
            decorations_off: self.decorations_off | (parent.decorations_off - explicit),
            font: self.font.clone().or_else(|| parent.font.clone()),
            insertion: self.insertion.clone().or_else(|| parent.insertion.clone()),
            click: self.click.clone().or_else(|| parent.click.clone()),
            hover: self.hover.clone().or_else(|| parent.hover.clone()),
        }
    }

    /// Check if this style has any properties set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.decorations_on.is_empty()
            && self.decorations_off.is_empty()
            && self.font.is_none()
            && self.insertion.is_none()
            && self.click.is_none()
            && self.hover.is_none()
    }
}
