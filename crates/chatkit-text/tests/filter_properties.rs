//! Property-based invariants of the markup filter.
//!
//! 1. Filtering is idempotent.
//! 2. Toggling one modern category leaves the tags of every other category
//!    untouched.
//! 3. Disabling legacy codes leaves modern tags untouched.
//! 4. A color passes the luminance floor exactly when its luminance is at
//!    least the threshold.
//! 5. The string and tree paths agree on the visible text.

use chatkit_style::Rgb;
use chatkit_text::{
    FilterConfig, FilterConfigBuilder, TagKind, Token, filter, parse_filtered, tokenize,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Gradient,
    Hex,
    Standard,
    Advanced,
}

const CATEGORIES: [Category; 4] = [
    Category::Gradient,
    Category::Hex,
    Category::Standard,
    Category::Advanced,
];

fn category(kind: TagKind) -> Option<Category> {
    match kind {
        TagKind::Gradient => Some(Category::Gradient),
        TagKind::HexColor(_) => Some(Category::Hex),
        TagKind::NamedColor(_) => Some(Category::Standard),
        TagKind::Advanced => Some(Category::Advanced),
        _ => None,
    }
}

fn all_on() -> FilterConfigBuilder {
    FilterConfig::standard().to_builder()
}

fn disable(builder: FilterConfigBuilder, category: Category) -> FilterConfigBuilder {
    match category {
        Category::Gradient => builder.gradients(false),
        Category::Hex => builder.hex_colors(false),
        Category::Standard => builder.standard_colors(false),
        Category::Advanced => builder.advanced_transformations(false),
    }
}

/// Raw opening tags of `category`, in order.
fn opening_tags(markup: &str, wanted: Option<Category>) -> Vec<String> {
    tokenize(markup)
        .into_iter()
        .filter_map(|token| match token {
            Token::Tag(tag) if !tag.closing && category(tag.kind()) == wanted => Some(tag.raw),
            _ => None,
        })
        .collect()
}

fn all_opening_tags(markup: &str) -> Vec<String> {
    tokenize(markup)
        .into_iter()
        .filter_map(|token| match token {
            Token::Tag(tag) if !tag.closing => Some(tag.raw),
            _ => None,
        })
        .collect()
}

const MODERN_PIECES: &[&str] = &[
    "Majek",
    "dor",
    " ",
    "!",
    "<gradient:#1eae98:#d8b5ff>",
    "</gradient>",
    "<rainbow>",
    "<#1eae98>",
    "<color:#d8b5ff>",
    "</color>",
    "<blue>",
    "<css:aqua>",
    "<aliceblue>",
    "</blue>",
    "<bold>",
    "</bold>",
    "<!italic>",
    "<hover:show_text:tip>",
    "<hover:show_text:'<red>tip'>",
    "</hover>",
    "<click:run_command:/spawn>",
    "<font:uniform>",
    "<reset>",
    "<player>",
];

const LEGACY_PIECES: &[&str] = &["&a", "&l", "&r", "&#363", "&#336633", "&x&f&a&c&a&d&e"];

fn markup_from(pieces: &'static [&'static str]) -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::sample::select(pieces), 0..16)
        .prop_map(|parts| parts.concat())
}

fn modern_markup() -> impl Strategy<Value = String> {
    markup_from(MODERN_PIECES)
}

fn mixed_markup() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            proptest::sample::select(MODERN_PIECES),
            proptest::sample::select(LEGACY_PIECES),
        ],
        0..16,
    )
    .prop_map(|parts| parts.concat())
}

fn config_strategy() -> impl Strategy<Value = FilterConfig> {
    (
        proptest::collection::vec(any::<bool>(), 5),
        0i32..=255,
        any::<bool>(),
    )
        .prop_map(|(flags, threshold, block_blue)| {
            let mut builder = FilterConfig::builder()
                .gradients(flags[0])
                .hex_colors(flags[1])
                .standard_colors(flags[2])
                .legacy_colors(flags[3])
                .advanced_transformations(flags[4])
                .prevent_luminance_below(threshold / 4);
            if block_blue {
                builder = builder.remove_colors(true, [chatkit_style::NamedColor::Blue]);
            }
            builder.build().unwrap()
        })
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn filtering_is_idempotent(markup in mixed_markup(), config in config_strategy()) {
        let once = filter(&markup, &config);
        let twice = filter(&once, &config);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn categories_are_independent(markup in modern_markup()) {
        let on = all_on().build().unwrap();
        let full = filter(&markup, &on);
        for disabled in CATEGORIES {
            let reduced = filter(&markup, &disable(all_on(), disabled).build().unwrap());
            prop_assert!(opening_tags(&reduced, Some(disabled)).is_empty());
            for other in CATEGORIES.into_iter().filter(|c| *c != disabled) {
                prop_assert_eq!(
                    opening_tags(&reduced, Some(other)),
                    opening_tags(&full, Some(other)),
                    "disabling {:?} changed {:?} tags", disabled, other
                );
            }
            prop_assert_eq!(opening_tags(&reduced, None), opening_tags(&full, None));
        }
    }

    #[test]
    fn legacy_toggle_leaves_modern_tags(markup in mixed_markup()) {
        let legacy_off = all_on().legacy_colors(false).build().unwrap();
        prop_assert_eq!(
            all_opening_tags(&filter(&markup, &legacy_off)),
            all_opening_tags(&markup)
        );
    }

    #[test]
    fn luminance_floor_is_monotonic(value in 0u32..=0xff_ffff, threshold in 0i32..=255) {
        let rgb = Rgb::from_u32(value);
        let markup = format!("<{rgb}>x");
        let config = FilterConfig::builder()
            .prevent_luminance_below(threshold)
            .build()
            .unwrap();
        let kept = filter(&markup, &config) == markup;
        prop_assert_eq!(kept, i32::from(rgb.luminance_u8()) >= threshold);
    }

    #[test]
    fn string_and_tree_paths_agree_on_text(markup in modern_markup(), config in config_strategy()) {
        let string_text = parse_filtered(&filter(&markup, &config), &config)
            .unwrap()
            .plain_text();
        let tree_text = parse_filtered(&markup, &config).unwrap().plain_text();
        prop_assert_eq!(string_text, tree_text);
    }
}
