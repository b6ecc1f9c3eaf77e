#![forbid(unsafe_code)]

//! Markup filtering.
//!
//! Filtering runs in two stages:
//!
//! 1. Legacy codes are translated (legacy enabled) or stripped (disabled).
//! 2. Every tag gets a [`Decision`]. Disabled color and gradient categories
//!    are stripped, disabled transformations are escaped so they render as
//!    literal text, and closing tags follow their opening tag.
//!
//! The string path ([`filter`]) also strips tags whose resolved value is
//! blocked: blocked decorations, blocked or close colors, and colors darker
//! than the luminance floor. The tree path ([`parse_filtered`]) parses the
//! category-filtered markup and then scrubs those values from the tree,
//! forcing blocked decorations off and clearing blocked colors.

use chatkit_style::{Color, Style, TextDecoration};
use tracing::{debug, trace};

use crate::config::FilterConfig;
use crate::legacy;
use crate::node::StyledNode;
use crate::parse::{BasicParser, MarkupParser, ParseError};
use crate::tag::{Tag, TagKind, Token, tokenize};

/// What happens to one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    /// Remove the tag, keep the text around it.
    Strip,
    /// Emit the tag as literal text.
    Escape,
}

/// Decide the fate of an opening tag, or of a closing tag with no opener.
///
/// With `check_values` unset only categories are considered; blocked
/// values are left for [`scrub`].
#[must_use]
pub fn decide(tag: &Tag, config: &FilterConfig, check_values: bool) -> Decision {
    match tag.kind() {
        TagKind::Gradient if !config.gradients() => Decision::Strip,
        TagKind::HexColor(_) if !config.hex_colors() => Decision::Strip,
        TagKind::NamedColor(_) if !config.standard_colors() => Decision::Strip,
        TagKind::Advanced if !config.advanced_transformations() => Decision::Escape,
        TagKind::HexColor(rgb) if check_values && config.blocks_color(Color::Rgb(rgb)) => {
            Decision::Strip
        }
        TagKind::NamedColor(color) if check_values && config.blocks_color(color) => {
            Decision::Strip
        }
        TagKind::Decoration(decoration)
            if check_values && config.blocks_decoration(decoration) =>
        {
            Decision::Strip
        }
        _ => Decision::Keep,
    }
}

/// Translate or strip legacy codes.
fn prepare(markup: &str, config: &FilterConfig) -> String {
    if config.legacy_colors() {
        legacy::translate(markup)
    } else {
        legacy::strip(markup)
    }
}

fn filter_tags(markup: &str, config: &FilterConfig, check_values: bool) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut open: Vec<(Tag, Decision)> = Vec::new();

    for token in tokenize(markup) {
        let tag = match token {
            Token::Text(text) => {
                out.push_str(&text);
                continue;
            }
            Token::Tag(tag) => tag,
        };

        let decision = if tag.closing {
            match open.iter().rposition(|(opener, _)| tag.closes(opener)) {
                Some(position) => {
                    let decision = open[position].1;
                    open.truncate(position);
                    decision
                }
                None => decide(&tag, config, check_values),
            }
        } else {
            decide(&tag, config, check_values)
        };
        trace!(tag = %tag.raw, ?decision, "Tag decision");

        match decision {
            Decision::Keep => out.push_str(&tag.raw),
            Decision::Strip => {}
            // Quoted arguments may hold markup of their own.
            Decision::Escape => out.push_str(&tag.raw.replace('<', "\\<")),
        }

        if tag.kind() == TagKind::Reset {
            open.clear();
        } else if !tag.closing {
            open.push((tag, decision));
        }
    }
    out
}

/// Remove blocked values from a parsed tree.
///
/// Blocked decorations are forced off on the root and on every node that
/// switches them on. Blocked, close and too-dark colors are cleared so the
/// node inherits its parent's color instead.
#[must_use]
pub fn scrub(tree: StyledNode, config: &FilterConfig) -> StyledNode {
    if config.blocked_decorations().is_empty()
        && config.blocked_colors().is_empty()
        && config.luminance_threshold() == 0
    {
        return tree;
    }
    let (content, style, children) = tree.into_parts();
    let mut root_style = scrub_style(style, config);
    for decoration in TextDecoration::ALL {
        if config.blocks_decoration(decoration) {
            root_style = root_style.decoration(decoration, false);
        }
    }
    StyledNode::styled(content, root_style)
        .with_children(children.into_iter().map(|child| scrub_node(child, config)))
}

fn scrub_node(node: StyledNode, config: &FilterConfig) -> StyledNode {
    let (content, style, children) = node.into_parts();
    StyledNode::styled(content, scrub_style(style, config))
        .with_children(children.into_iter().map(|child| scrub_node(child, config)))
}

fn scrub_style(mut style: Style, config: &FilterConfig) -> Style {
    if let Some(color) = style.color.filter(|color| config.blocks_color(*color)) {
        trace!(%color, "Clearing blocked color");
        style = style.without_color();
    }
    for decoration in TextDecoration::ALL {
        if config.blocks_decoration(decoration) && style.has_decoration(decoration) {
            style = style.decoration(decoration, false);
        }
    }
    style
}

/// A [`FilterConfig`] paired with the parser that builds trees for it.
///
/// # Example
/// ```
/// use chatkit_text::{FilterConfig, MarkupFilter};
///
/// let filter = MarkupFilter::new(FilterConfig::builder().gradients(false).build().unwrap());
/// assert_eq!(filter.filter("<gradient:#1eae98:#d8b5ff>Majekdor</gradient>"), "Majekdor");
/// assert_eq!(filter.parse("<red>Majekdor").unwrap().plain_text(), "Majekdor");
/// ```
#[derive(Debug, Clone)]
pub struct MarkupFilter<P = BasicParser> {
    config: FilterConfig,
    parser: P,
}

impl MarkupFilter<BasicParser> {
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self::with_parser(config, BasicParser::new())
    }
}

impl<P: MarkupParser> MarkupFilter<P> {
    #[must_use]
    pub fn with_parser(config: FilterConfig, parser: P) -> Self {
        Self { config, parser }
    }

    #[inline]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    #[inline]
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Filtered markup as a string.
    #[must_use]
    pub fn filter(&self, markup: &str) -> String {
        filter(markup, &self.config)
    }

    /// Filtered, fully styled tree. Parser errors are returned unchanged.
    pub fn parse(&self, markup: &str) -> Result<StyledNode, ParseError> {
        parse_with(&self.parser, markup, &self.config)
    }
}

fn parse_with<P: MarkupParser + ?Sized>(
    parser: &P,
    markup: &str,
    config: &FilterConfig,
) -> Result<StyledNode, ParseError> {
    let prepared = prepare(markup, config);
    let filtered = filter_tags(&prepared, config, false);
    let tree = parser.parse(&filtered, config.placeholder_resolver())?;
    debug!(input_len = markup.len(), "Parsed filtered markup");
    Ok(scrub(tree, config))
}

/// Filter `markup` with the built-in parser's tag set.
///
/// # Example
/// ```
/// use chatkit_text::{FilterConfig, filter};
///
/// let config = FilterConfig::builder().hex_colors(false).build().unwrap();
/// assert_eq!(filter("<#1eae98>Majek<color:#d8b5ff>dor", &config), "Majekdor");
/// ```
#[must_use]
pub fn filter(markup: &str, config: &FilterConfig) -> String {
    let prepared = prepare(markup, config);
    let filtered = filter_tags(&prepared, config, true);
    debug!(
        input_len = markup.len(),
        output_len = filtered.len(),
        "Filtered markup"
    );
    filtered
}

/// Filter and parse `markup` with [`BasicParser`].
pub fn parse_filtered(markup: &str, config: &FilterConfig) -> Result<StyledNode, ParseError> {
    parse_with(&BasicParser::new(), markup, config)
}
