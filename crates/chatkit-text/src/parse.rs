#![forbid(unsafe_code)]

//! Markup parsing into [`StyledNode`] trees.
//!
//! [`MarkupParser`] is the seam the filter drives; [`BasicParser`] is the
//! built-in implementation. It understands the tag subset the filter
//! classifies: colors, decorations, gradients and rainbows, reset, click,
//! hover, font, insertion and newlines. Tags it does not know are offered to
//! the [`PlaceholderResolver`] and otherwise stay literal text.
//!
//! Each opening tag starts a child node that stays open until its closing
//! tag, a `<reset>`, or the end of input. Closing an outer tag implicitly
//! closes everything opened inside it.

use chatkit_style::{ClickAction, Color, Rgb, Style};
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::node::StyledNode;
use crate::tag::{Tag, TagKind, Token, tokenize, unescape};

/// Replacement for an unknown tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Inserted as literal text.
    Text(String),
    /// Parsed in place. Tags inside are not resolved again.
    Markup(String),
}

/// Supplies values for placeholder tags such as `<player>`.
pub trait PlaceholderResolver: Send + Sync {
    /// Look up a lowercased tag name.
    fn resolve(&self, name: &str) -> Option<Placeholder>;
}

impl<F> PlaceholderResolver for F
where
    F: Fn(&str) -> Option<Placeholder> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Placeholder> {
        self(name)
    }
}

/// Map-backed [`PlaceholderResolver`].
///
/// # Example
/// ```
/// use chatkit_text::{Placeholder, PlaceholderResolver, Placeholders};
///
/// let placeholders = Placeholders::new().text("player", "Majekdor");
/// assert_eq!(
///     placeholders.resolve("player"),
///     Some(Placeholder::Text("Majekdor".into()))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    entries: FxHashMap<String, Placeholder>,
}

impl Placeholders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, Placeholder::Text(value.into()));
        self
    }

    #[must_use]
    pub fn markup(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, Placeholder::Markup(value.into()));
        self
    }

    /// Add or replace a placeholder. Names are case-insensitive.
    pub fn insert(&mut self, name: impl AsRef<str>, placeholder: Placeholder) -> Option<Placeholder> {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), placeholder)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PlaceholderResolver for Placeholders {
    fn resolve(&self, name: &str) -> Option<Placeholder> {
        self.entries.get(&name.to_ascii_lowercase()).cloned()
    }
}

/// Malformed markup, reported by strict parsers only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("closing tag {tag} has no matching opening tag")]
    UnexpectedClose { tag: String },
    #[error("tag {tag} is never closed")]
    Unclosed { tag: String },
}

/// Turns markup into a styled tree.
pub trait MarkupParser {
    fn parse(
        &self,
        markup: &str,
        resolver: Option<&dyn PlaceholderResolver>,
    ) -> Result<StyledNode, ParseError>;
}

/// Built-in parser for the supported tag subset.
///
/// The default lenient mode never fails: stray closing tags are dropped and
/// open tags end with the input. [`BasicParser::strict`] turns both into
/// errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicParser {
    strict: bool,
}

impl BasicParser {
    #[must_use]
    pub const fn new() -> Self {
        Self { strict: false }
    }

    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    #[inline]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }
}

impl MarkupParser for BasicParser {
    fn parse(
        &self,
        markup: &str,
        resolver: Option<&dyn PlaceholderResolver>,
    ) -> Result<StyledNode, ParseError> {
        let mut builder = TreeBuilder {
            frames: vec![Frame::root()],
            strict: self.strict,
            resolver,
        };
        builder.feed(tokenize(markup), true)?;
        let root = builder.finish()?;
        debug!(
            strict = self.strict,
            chars = root.char_count(),
            "Parsed markup"
        );
        Ok(root)
    }
}

/// Per-character coloring applied when a frame closes.
#[derive(Debug)]
enum Effect {
    None,
    Gradient(SmallVec<[Rgb; 4]>),
    Rainbow { reverse: bool, phase: i32 },
}

impl Effect {
    fn gradient(tag: &Tag) -> Self {
        let mut colors: SmallVec<[Rgb; 4]> = tag
            .args
            .iter()
            .filter_map(|arg| Color::parse(arg))
            .map(Color::to_rgb)
            .collect();
        match colors.len() {
            0 => colors = smallvec![Rgb::from_u32(0xffffff), Rgb::from_u32(0x000000)],
            1 => colors.push(colors[0]),
            _ => {}
        }
        Self::Gradient(colors)
    }

    /// `<rainbow>`, `<rainbow:!>` (reversed), `<rainbow:2>` (phase offset).
    fn rainbow(tag: &Tag) -> Self {
        let arg = tag.arg(0).unwrap_or_default();
        let (reverse, phase) = match arg.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, arg),
        };
        Self::Rainbow {
            reverse,
            phase: phase.parse().unwrap_or(0),
        }
    }

    fn color_at(&self, index: usize, total: usize) -> Option<Rgb> {
        match self {
            Self::None => None,
            Self::Gradient(colors) => Some(gradient_color(colors, index, total)),
            Self::Rainbow { reverse, phase } => {
                let position = if *reverse { total - 1 - index } else { index };
                let hue = (position as f32 + *phase as f32) / total as f32;
                Some(Rgb::from_hsv(hue, 1.0, 1.0))
            }
        }
    }
}

fn gradient_color(colors: &[Rgb], index: usize, total: usize) -> Rgb {
    if total <= 1 || colors.len() < 2 {
        return colors.first().copied().unwrap_or(Rgb::from_u32(0xffffff));
    }
    let t = index as f32 / (total - 1) as f32;
    let scaled = t * (colors.len() - 1) as f32;
    let segment = (scaled.floor() as usize).min(colors.len() - 2);
    colors[segment].lerp(colors[segment + 1], scaled - segment as f32)
}

/// Split every uncolored character under `node` into its own colored leaf.
/// Subtrees with an explicit color keep it and only advance the index.
fn paint(node: StyledNode, effect: &Effect, index: &mut usize, total: usize) -> StyledNode {
    if node.style().color.is_some() {
        *index += node.char_count();
        return node;
    }
    let (content, style, children) = node.into_parts();
    let mut painted = Vec::with_capacity(content.len() + children.len());
    for ch in content.chars() {
        let leaf = match effect.color_at(*index, total) {
            Some(rgb) => StyledNode::styled(ch.to_string(), Style::new().color(rgb)),
            None => StyledNode::text(ch.to_string()),
        };
        painted.push(leaf);
        *index += 1;
    }
    for child in children {
        painted.push(paint(child, effect, index, total));
    }
    StyledNode::new().with_style(style).with_children(painted)
}

/// An open tag and the children collected under it.
struct Frame {
    tag: Option<Tag>,
    style: Style,
    effect: Effect,
    children: Vec<StyledNode>,
}

impl Frame {
    fn root() -> Self {
        Self {
            tag: None,
            style: Style::new(),
            effect: Effect::None,
            children: Vec::new(),
        }
    }

    fn finish(self) -> StyledNode {
        let node = StyledNode::new()
            .with_style(self.style)
            .with_children(self.children);
        if matches!(self.effect, Effect::None) {
            return node;
        }
        let total = node.char_count();
        let mut index = 0;
        paint(node, &self.effect, &mut index, total)
    }
}

struct TreeBuilder<'a> {
    /// Never empty; the root frame sits at index 0.
    frames: Vec<Frame>,
    strict: bool,
    resolver: Option<&'a dyn PlaceholderResolver>,
}

impl TreeBuilder<'_> {
    fn feed(&mut self, tokens: Vec<Token>, resolve: bool) -> Result<(), ParseError> {
        for token in tokens {
            match token {
                Token::Text(text) => self.push_text(unescape(&text)),
                Token::Tag(tag) if tag.closing => self.close(tag)?,
                Token::Tag(tag) => self.open(tag, resolve)?,
            }
        }
        Ok(())
    }

    fn push_node(&mut self, node: StyledNode) {
        if let Some(top) = self.frames.last_mut() {
            top.children.push(node);
        }
    }

    fn push_text(&mut self, text: String) {
        if !text.is_empty() {
            self.push_node(StyledNode::text(text));
        }
    }

    fn push_frame(&mut self, tag: Tag, style: Style, effect: Effect) {
        self.frames.push(Frame {
            tag: Some(tag),
            style,
            effect,
            children: Vec::new(),
        });
    }

    /// Close the innermost open frame into its parent.
    fn pop_frame(&mut self) {
        if self.frames.len() <= 1 {
            return;
        }
        if let Some(frame) = self.frames.pop() {
            let node = frame.finish();
            self.push_node(node);
        }
    }

    fn open(&mut self, tag: Tag, resolve: bool) -> Result<(), ParseError> {
        match tag.kind() {
            TagKind::Reset => {
                while self.frames.len() > 1 {
                    self.pop_frame();
                }
            }
            TagKind::HexColor(rgb) => self.push_frame(tag, Style::new().color(rgb), Effect::None),
            TagKind::NamedColor(color) => {
                self.push_frame(tag, Style::new().color(color), Effect::None);
            }
            TagKind::Decoration(decoration) => {
                let style = Style::new().decoration(decoration, !tag.is_negation());
                self.push_frame(tag, style, Effect::None);
            }
            TagKind::Gradient => {
                let effect = if tag.name == "rainbow" {
                    Effect::rainbow(&tag)
                } else {
                    Effect::gradient(&tag)
                };
                self.push_frame(tag, Style::new(), effect);
            }
            TagKind::Advanced => self.open_advanced(tag),
            TagKind::Other => self.open_other(tag, resolve)?,
        }
        Ok(())
    }

    fn open_advanced(&mut self, tag: Tag) {
        let rest = |from: usize| tag.args.get(from..).map(|args| args.join(":"));
        let style = match tag.name.as_str() {
            "click" => tag
                .arg(0)
                .and_then(ClickAction::from_name)
                .zip(rest(1).filter(|value| !value.is_empty()))
                .map(|(action, value)| Style::new().click(action, value)),
            "hover" => rest(1)
                .filter(|_| tag.arg(0).is_some_and(|a| a.eq_ignore_ascii_case("show_text")))
                .map(|text| Style::new().hover_text(text)),
            "font" => rest(0)
                .filter(|font| !font.is_empty())
                .map(|font| Style::new().font(font)),
            "insert" | "insertion" => rest(0)
                .filter(|text| !text.is_empty())
                .map(|text| Style::new().insertion(text)),
            "newline" | "br" => {
                self.push_text("\n".to_owned());
                return;
            }
            _ => None,
        };
        match style {
            Some(style) => self.push_frame(tag, style, Effect::None),
            None => {
                trace!(tag = %tag.raw, "Unsupported transformation left as text");
                self.push_text(tag.raw);
            }
        }
    }

    fn open_other(&mut self, tag: Tag, resolve: bool) -> Result<(), ParseError> {
        let resolved = match self.resolver {
            Some(resolver) if resolve => resolver.resolve(&tag.name),
            _ => None,
        };
        match resolved {
            Some(Placeholder::Text(text)) => self.push_text(text),
            Some(Placeholder::Markup(markup)) => {
                trace!(name = %tag.name, "Splicing placeholder markup");
                self.feed(tokenize(&markup), false)?;
            }
            None => self.push_text(tag.raw),
        }
        Ok(())
    }

    fn close(&mut self, tag: Tag) -> Result<(), ParseError> {
        let position = self
            .frames
            .iter()
            .rposition(|frame| frame.tag.as_ref().is_some_and(|open| tag.closes(open)));

        let Some(position) = position else {
            if self.strict {
                return Err(ParseError::UnexpectedClose { tag: tag.raw });
            }
            if tag.kind() == TagKind::Other {
                self.push_text(tag.raw);
            } else {
                trace!(tag = %tag.raw, "Dropping unmatched closing tag");
            }
            return Ok(());
        };

        if self.strict && position + 1 < self.frames.len() {
            let inner = self.frames.last().and_then(|frame| frame.tag.as_ref());
            if let Some(inner) = inner {
                return Err(ParseError::Unclosed {
                    tag: inner.raw.clone(),
                });
            }
        }
        while self.frames.len() > position {
            self.pop_frame();
        }
        Ok(())
    }

    fn finish(mut self) -> Result<StyledNode, ParseError> {
        if self.strict {
            if let Some(tag) = self.frames.get(1).and_then(|frame| frame.tag.as_ref()) {
                return Err(ParseError::Unclosed {
                    tag: tag.raw.clone(),
                });
            }
        }
        while self.frames.len() > 1 {
            self.pop_frame();
        }
        Ok(self
            .frames
            .pop()
            .map(Frame::finish)
            .unwrap_or_default())
    }
}
