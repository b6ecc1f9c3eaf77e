//! Filter, parse and segment chained through the public entry points.

use chatkit::{
    FilterConfig, MarkupFilter, MarkupParser, NamedColor, ParseError, PlaceholderResolver, Rgb,
    Span, Style, StyledNode, TextDecoration, filter, parse_filtered, segment,
};
use proptest::prelude::*;

fn texts(chunks: &[StyledNode]) -> Vec<String> {
    chunks.iter().map(StyledNode::plain_text).collect()
}

// ── Filtering ───────────────────────────────────────────────────────────

#[test]
fn gradient_disabled() {
    let config = FilterConfig::builder().gradients(false).build().unwrap();
    assert_eq!(
        filter("<gradient:#1eae98:#d8b5ff>Majekdor</gradient>", &config),
        "Majekdor"
    );
}

#[test]
fn hex_disabled_versus_gradients_disabled() {
    let markup = "<#1eae98>Majek<color:#d8b5ff>dor";
    let no_hex = FilterConfig::builder().hex_colors(false).build().unwrap();
    assert_eq!(filter(markup, &no_hex), "Majekdor");
    let no_gradients = FilterConfig::builder().gradients(false).build().unwrap();
    assert_eq!(filter(markup, &no_gradients), markup);
}

#[test]
fn legacy_translation_and_stripping() {
    let legacy = "&9&lMajek&b&odor&x&f&a&c&a&d&e!";
    assert_eq!(
        filter(legacy, &FilterConfig::legacy()),
        "<blue><bold>Majek<aqua><italic>dor<#facade>!"
    );
    assert_eq!(filter(legacy, &FilterConfig::standard()), "Majekdor!");
}

#[test]
fn escaped_legacy_code_is_literal() {
    assert_eq!(
        filter(
            "&bMajekdor with this color code \\&b",
            &FilterConfig::legacy()
        ),
        "<aqua>Majekdor with this color code &b"
    );
}

#[test]
fn luminance_floor_strips_dark_colors() {
    let config = FilterConfig::builder()
        .prevent_luminance_below(16)
        .build()
        .unwrap();
    assert_eq!(
        filter("<#000000>Dark Majekdor haha", &config),
        "Dark Majekdor haha"
    );
    assert_eq!(
        filter("<#440044>this isn't!", &config),
        "<#440044>this isn't!"
    );
}

#[test]
fn negative_luminance_is_rejected_at_build() {
    assert!(
        FilterConfig::builder()
            .prevent_luminance_below(-1)
            .build()
            .is_err()
    );
}

// ── Segmenting ──────────────────────────────────────────────────────────

#[test]
fn hard_cut_at_max_length() {
    let tree = StyledNode::text("abcdefghijklmnopqrst");
    assert_eq!(
        texts(&segment(&tree, 10, 15)),
        ["abcdefghijklmno-", "pqrst"]
    );
}

#[test]
fn legacy_tree_segments_with_styles() {
    let tree = parse_filtered("&9&lMajek&b&odor&x&f&a&c&a&d&e!", &FilterConfig::legacy()).unwrap();
    let chunks = segment(&tree, 3, 3);
    assert_eq!(texts(&chunks), ["Maj-", "ekd-", "or!"]);

    let blue_bold = Style::new()
        .color(NamedColor::Blue)
        .decorate(TextDecoration::Bold);
    let aqua = Style::new()
        .color(NamedColor::Aqua)
        .decorate(TextDecoration::Bold)
        .decorate(TextDecoration::Italic);
    let facade = aqua.clone().color(Rgb::from_u32(0xfacade));
    assert_eq!(
        chunks[1].spans(),
        vec![Span::new("ek", blue_bold), Span::new("d-", aqua.clone())]
    );
    assert_eq!(
        chunks[2].spans(),
        vec![Span::new("or", aqua), Span::new("!", facade)]
    );
}

#[test]
fn blocked_decoration_survives_segmentation() {
    let config = FilterConfig::builder()
        .remove_decorations([TextDecoration::Bold])
        .build()
        .unwrap();
    let tree = parse_filtered("<bold>I am <blue>Majekdor the great", &config).unwrap();
    for chunk in segment(&tree, 6, 14) {
        for span in chunk.spans() {
            assert!(!span.style.has_decoration(TextDecoration::Bold));
        }
    }
}

// ── Parser seam ─────────────────────────────────────────────────────────

/// Treats everything as plain text.
struct PlainParser;

impl MarkupParser for PlainParser {
    fn parse(
        &self,
        markup: &str,
        _resolver: Option<&dyn PlaceholderResolver>,
    ) -> Result<StyledNode, ParseError> {
        Ok(StyledNode::text(markup))
    }
}

/// Rejects every input.
struct FailingParser;

impl MarkupParser for FailingParser {
    fn parse(
        &self,
        _markup: &str,
        _resolver: Option<&dyn PlaceholderResolver>,
    ) -> Result<StyledNode, ParseError> {
        Err(ParseError::Unclosed {
            tag: "<bold>".to_owned(),
        })
    }
}

#[test]
fn custom_parser_receives_filtered_markup() {
    let config = FilterConfig::builder().gradients(false).build().unwrap();
    let filter = MarkupFilter::with_parser(config, PlainParser);
    let tree = filter
        .parse("<gradient:#1eae98:#d8b5ff>Majekdor</gradient>")
        .unwrap();
    assert_eq!(tree.plain_text(), "Majekdor");
}

#[test]
fn parser_errors_surface_unchanged() {
    let filter = MarkupFilter::with_parser(FilterConfig::default(), FailingParser);
    assert_eq!(
        filter.parse("<bold>x").unwrap_err(),
        ParseError::Unclosed {
            tag: "<bold>".to_owned()
        }
    );
}

proptest! {
    #[test]
    fn segmenting_keeps_every_word(words in proptest::collection::vec("[a-z]{1,12}", 1..12)) {
        let markup = format!("<gold>{}", words.join(" "));
        let tree = parse_filtered(&markup, &FilterConfig::standard()).unwrap();
        let rejoined: String = segment(&tree, 8, 12)
            .iter()
            .map(StyledNode::plain_text)
            .collect::<Vec<_>>()
            .concat()
            .replace(['-', ' '], "");
        prop_assert_eq!(rejoined, words.concat());
    }
}
