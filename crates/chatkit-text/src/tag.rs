#![forbid(unsafe_code)]

//! Markup tag scanning and classification.
//!
//! Splits a markup string into literal text and `<tag>` tokens without
//! interpreting them. The scan is an explicit index walk over the
//! string's characters:
//!
//! - A tag runs from `<` to the next `>` outside single or double quotes.
//!   A `<` or newline outside quotes before that `>` means the `<` was
//!   literal text.
//! - `\<` is an escaped `<` and never starts a tag. The backslash stays in
//!   the text token; [`unescape`] removes it when text is materialized.
//! - A tag name must be non-empty and made of ASCII alphanumerics or
//!   `_ - . #`. Anything else is literal text.

use chatkit_style::{Color, Rgb, TextDecoration};

/// One lexical unit of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, still carrying `\<` escapes.
    Text(String),
    Tag(Tag),
}

/// A parsed `<...>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// The exact source text, brackets included.
    pub raw: String,
    /// Lowercased name without `/` or `!`.
    pub name: String,
    /// Colon-separated arguments with surrounding quotes removed.
    pub args: Vec<String>,
    pub closing: bool,
    /// `<!bold>` style negation.
    pub negated: bool,
}

/// What a tag does, for filtering purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Multi-color spans: `gradient`, `rainbow`.
    Gradient,
    /// `<#rrggbb>` or `<color:#rrggbb>`.
    HexColor(Rgb),
    /// Standard or CSS color name, including `<css:name>`.
    NamedColor(Color),
    Decoration(TextDecoration),
    Reset,
    /// Click, hover, font, insertion and other non-color transformations.
    Advanced,
    /// Placeholders and anything unrecognized.
    Other,
}

const COLOR_TAGS: [&str; 3] = ["color", "colour", "c"];

const GRADIENT_TAGS: [&str; 2] = ["gradient", "rainbow"];

const ADVANCED_TAGS: [&str; 16] = [
    "click",
    "hover",
    "key",
    "lang",
    "tr",
    "translate",
    "insert",
    "insertion",
    "font",
    "selector",
    "sel",
    "score",
    "nbt",
    "data",
    "newline",
    "br",
];

impl Tag {
    /// Parse the text of a complete tag (`<` and `>` included).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Tag> {
        let inner = raw.strip_prefix('<')?.strip_suffix('>')?;
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let (negated, inner) = match inner.strip_prefix('!') {
            Some(rest) if !closing => (true, rest),
            _ => (false, inner),
        };

        let mut parts = split_args(inner).into_iter();
        let name = parts.next()?.to_ascii_lowercase();
        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '#'));
        if !valid_name {
            return None;
        }

        Some(Tag {
            raw: raw.to_owned(),
            name,
            args: parts.collect(),
            closing,
            negated,
        })
    }

    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Classify the tag by name and arguments.
    #[must_use]
    pub fn kind(&self) -> TagKind {
        let name = self.name.as_str();
        if GRADIENT_TAGS.contains(&name) {
            return TagKind::Gradient;
        }
        if name.starts_with('#') {
            return match Rgb::from_hex(name) {
                Some(rgb) => TagKind::HexColor(rgb),
                None => TagKind::Other,
            };
        }
        if COLOR_TAGS.contains(&name) {
            let value = match (self.arg(0), self.arg(1)) {
                (Some(kind), Some(css_name)) if kind.eq_ignore_ascii_case("css") => {
                    format!("css:{css_name}")
                }
                (Some(arg), _) => arg.to_owned(),
                (None, _) => return TagKind::Other,
            };
            return color_kind(&value);
        }
        if name == "css" {
            return match self.arg(0) {
                Some(css_name) => color_kind(&format!("css:{css_name}")),
                None => TagKind::Other,
            };
        }
        if let Some(decoration) = TextDecoration::from_name(name) {
            return TagKind::Decoration(decoration);
        }
        if name == "reset" {
            return TagKind::Reset;
        }
        if ADVANCED_TAGS.contains(&name) {
            return TagKind::Advanced;
        }
        match Color::parse(name) {
            Some(color) => TagKind::NamedColor(color),
            None => TagKind::Other,
        }
    }

    /// Whether this closing tag ends the scope opened by `open`.
    ///
    /// Names match directly, decoration aliases match each other
    /// (`</b>` closes `<bold>`), and `</color>` closes any color tag.
    #[must_use]
    pub fn closes(&self, open: &Tag) -> bool {
        if !self.closing || open.closing {
            return false;
        }
        if self.name == open.name {
            return true;
        }
        match (self.kind(), open.kind()) {
            (TagKind::Decoration(a), TagKind::Decoration(b)) => a == b,
            (_, TagKind::HexColor(_) | TagKind::NamedColor(_)) => {
                COLOR_TAGS.contains(&self.name.as_str())
            }
            _ => false,
        }
    }

    /// Whether the tag is a "switch off" form: `<!bold>` or `<bold:false>`.
    #[must_use]
    pub fn is_negation(&self) -> bool {
        self.negated || self.arg(0).is_some_and(|a| a.eq_ignore_ascii_case("false"))
    }
}

fn color_kind(value: &str) -> TagKind {
    match Color::parse(value) {
        Some(Color::Rgb(rgb)) if value.starts_with('#') => TagKind::HexColor(rgb),
        Some(color) => TagKind::NamedColor(color),
        None => TagKind::Other,
    }
}

/// Split on `:` outside quotes, stripping one level of quotes per part.
fn split_args(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in inner.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch == ':' => parts.push(std::mem::take(&mut current)),
            None => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

/// Index of the `>` closing the tag opened at `start`, if any.
fn find_tag_end(chars: &[(usize, char)], start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut i = start + 1;
    while i < chars.len() {
        let ch = chars[i].1;
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '>' => return Some(i),
                '<' | '\n' => return None,
                '\'' | '"' => quote = Some(ch),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Split markup into text and tag tokens.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, ch) = chars[i];
        if ch == '\\' && chars.get(i + 1).is_some_and(|&(_, next)| next == '<') {
            i += 2;
            continue;
        }
        if ch == '<' {
            if let Some(end) = find_tag_end(&chars, i) {
                let end_byte = chars[end].0 + 1;
                if let Some(tag) = Tag::parse(&input[pos..end_byte]) {
                    if text_start < pos {
                        tokens.push(Token::Text(input[text_start..pos].to_owned()));
                    }
                    tokens.push(Token::Tag(tag));
                    text_start = end_byte;
                    i = end + 1;
                    continue;
                }
            }
        }
        i += 1;
    }

    if text_start < input.len() {
        tokens.push(Token::Text(input[text_start..].to_owned()));
    }
    tokens
}

/// Resolve `\<` escapes in a text token.
#[must_use]
pub fn unescape(text: &str) -> String {
    text.replace("\\<", "<")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatkit_style::NamedColor;

    fn tag(raw: &str) -> Tag {
        Tag::parse(raw).unwrap()
    }

    #[test]
    fn tokenize_text_and_tags() {
        let tokens = tokenize("<blue>Majek<light_purple>dor");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], Token::Text("Majek".into()));
        match &tokens[2] {
            Token::Tag(t) => assert_eq!(t.name, "light_purple"),
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_plain_text() {
        assert_eq!(tokenize("just text"), vec![Token::Text("just text".into())]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn tokenize_rejects_non_tags() {
        let input = "a < b and 1<2> nope <3 > <>";
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 2);
        match &tokens[1] {
            Token::Tag(t) => assert_eq!(t.name, "2"),
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_quoted_gt() {
        let tokens = tokenize("<hover:show_text:'a > b'>x</hover>");
        assert_eq!(tokens.len(), 3);
        match &tokens[0] {
            Token::Tag(t) => {
                assert_eq!(t.name, "hover");
                assert_eq!(t.args, vec!["show_text".to_string(), "a > b".to_string()]);
            }
            other => panic!("expected tag, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_escaped_tag_stays_text() {
        let tokens = tokenize("\\<bold>not bold");
        assert_eq!(tokens, vec![Token::Text("\\<bold>not bold".into())]);
        assert_eq!(unescape("\\<bold>not bold"), "<bold>not bold");
    }

    #[test]
    fn tokenize_multibyte_text() {
        let tokens = tokenize("héllo<red>wörld");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::Text("héllo".into()));
        assert_eq!(tokens[2], Token::Text("wörld".into()));
    }

    #[test]
    fn parse_closing_and_negated() {
        let close = tag("</gradient>");
        assert!(close.closing);
        assert_eq!(close.name, "gradient");

        let neg = tag("<!Bold>");
        assert!(neg.negated);
        assert_eq!(neg.name, "bold");
        assert!(neg.is_negation());
        assert!(tag("<bold:false>").is_negation());
        assert!(!tag("<bold>").is_negation());
    }

    #[test]
    fn classify_colors() {
        assert_eq!(
            tag("<#1eae98>").kind(),
            TagKind::HexColor(Rgb::from_u32(0x1eae98))
        );
        assert_eq!(
            tag("<color:#d8b5ff>").kind(),
            TagKind::HexColor(Rgb::from_u32(0xd8b5ff))
        );
        assert_eq!(
            tag("<blue>").kind(),
            TagKind::NamedColor(Color::Named(NamedColor::Blue))
        );
        assert_eq!(
            tag("<colour:gold>").kind(),
            TagKind::NamedColor(Color::Named(NamedColor::Gold))
        );
        assert_eq!(
            tag("<css:aqua>").kind(),
            TagKind::NamedColor(Color::rgb(0, 255, 255))
        );
        assert_eq!(
            tag("<color:css:aqua>").kind(),
            TagKind::NamedColor(Color::rgb(0, 255, 255))
        );
        assert_eq!(
            tag("<color:CSS:aqua>").kind(),
            TagKind::NamedColor(Color::rgb(0, 255, 255))
        );
        assert_eq!(
            tag("<aliceblue>").kind(),
            TagKind::NamedColor(Color::Rgb(Rgb::from_u32(0xf0f8ff)))
        );
        assert_eq!(tag("<#12>").kind(), TagKind::Other);
    }

    #[test]
    fn classify_other_categories() {
        assert_eq!(tag("<gradient:#1eae98:#d8b5ff>").kind(), TagKind::Gradient);
        assert_eq!(tag("<rainbow>").kind(), TagKind::Gradient);
        assert_eq!(
            tag("<b>").kind(),
            TagKind::Decoration(TextDecoration::Bold)
        );
        assert_eq!(tag("<reset>").kind(), TagKind::Reset);
        assert_eq!(tag("<hover:show_text:hi>").kind(), TagKind::Advanced);
        assert_eq!(tag("<click:run_command:/x>").kind(), TagKind::Advanced);
        assert_eq!(tag("<placeholder>").kind(), TagKind::Other);
    }

    #[test]
    fn closing_matches() {
        assert!(tag("</gradient>").closes(&tag("<gradient:#fff:#000>")));
        assert!(tag("</b>").closes(&tag("<bold>")));
        assert!(tag("</color>").closes(&tag("<#336633>")));
        assert!(tag("</c>").closes(&tag("<blue>")));
        assert!(!tag("</bold>").closes(&tag("<italic>")));
        assert!(!tag("<bold>").closes(&tag("<bold>")));
        assert!(!tag("</hover>").closes(&tag("<click:run_command:/x>")));
    }
}
