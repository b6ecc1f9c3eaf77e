#![forbid(unsafe_code)]

//! Legacy `&`-code dialect.
//!
//! | form | result |
//! |------|--------|
//! | `&0`..`&f` | the 16 named colors in palette order |
//! | `&k` `&l` `&m` `&n` `&o` | obfuscated, bold, strikethrough, underlined, italic |
//! | `&r` | reset |
//! | `&#RRGGBB` / `&#RGB` | hex color (compact form doubles each digit) |
//! | `&x&R&R&G&G&B&B` | hex color, one digit per code |
//! | `\&` | a literal `&` |
//!
//! Codes are case-insensitive. Anything malformed passes through verbatim.

use chatkit_style::{NamedColor, Rgb, TextDecoration};

/// Markup tag for a single-character code, if `code` is one.
fn code_tag(code: char) -> Option<String> {
    let code = code.to_ascii_lowercase();
    if let Some(index) = code.to_digit(16) {
        // `to_digit(16)` is at most 15.
        return NamedColor::from_index(index as u8).map(|color| format!("<{}>", color.name()));
    }
    let decoration = match code {
        'k' => TextDecoration::Obfuscated,
        'l' => TextDecoration::Bold,
        'm' => TextDecoration::Strikethrough,
        'n' => TextDecoration::Underlined,
        'o' => TextDecoration::Italic,
        'r' => return Some("<reset>".to_owned()),
        _ => return None,
    };
    Some(format!("<{}>", decoration.name()))
}

/// Whether `&` + `code` is a single-character legacy code, `x` included.
#[inline]
fn is_format_code(code: char) -> bool {
    matches!(code.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r' | 'x')
}

fn hex_run(chars: &[char], start: usize) -> usize {
    chars[start.min(chars.len())..]
        .iter()
        .take_while(|c| c.is_ascii_hexdigit())
        .count()
}

fn hex_tag(digits: &[char]) -> Option<String> {
    let text: String = digits.iter().collect();
    Rgb::from_hex(&text).map(|rgb| format!("<{rgb}>"))
}

/// Read `&R&R&G&G&B&B` starting at `start`.
fn bungee_digits(chars: &[char], start: usize) -> Option<[char; 6]> {
    let mut digits = ['0'; 6];
    for (n, digit) in digits.iter_mut().enumerate() {
        let at = start + n * 2;
        match (chars.get(at), chars.get(at + 1)) {
            (Some('&'), Some(c)) if c.is_ascii_hexdigit() => *digit = *c,
            _ => return None,
        }
    }
    Some(digits)
}

/// Translate legacy codes into modern tags.
///
/// # Example
/// ```
/// use chatkit_text::legacy;
///
/// assert_eq!(legacy::translate("&9&lHi &#363there"), "<blue><bold>Hi <#336633>there");
/// assert_eq!(legacy::translate("\\&b stays"), "&b stays");
/// ```
#[must_use]
pub fn translate(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();

        if ch == '\\' && next == Some('&') {
            out.push('&');
            i += 2;
            continue;
        }
        let Some(code) = next.filter(|_| ch == '&') else {
            out.push(ch);
            i += 1;
            continue;
        };

        match code {
            '#' => {
                let run = hex_run(&chars, i + 2);
                let len = if run >= 6 { 6 } else if run == 3 { 3 } else { 0 };
                match hex_tag(&chars[i + 2..i + 2 + len]) {
                    Some(tag) => {
                        out.push_str(&tag);
                        i += 2 + len;
                    }
                    None => {
                        out.push('&');
                        i += 1;
                    }
                }
            }
            'x' | 'X' => match bungee_digits(&chars, i + 2).and_then(|d| hex_tag(&d)) {
                Some(tag) => {
                    out.push_str(&tag);
                    i += 14;
                }
                None => {
                    out.push('&');
                    i += 1;
                }
            },
            _ => match code_tag(code) {
                Some(tag) => {
                    out.push_str(&tag);
                    i += 2;
                }
                None => {
                    out.push('&');
                    i += 1;
                }
            },
        }
    }
    out
}

/// Remove single-character legacy codes without translating them.
///
/// `&#…` sequences are left untouched and `\&` still yields a literal `&`.
///
/// # Example
/// ```
/// use chatkit_text::legacy;
///
/// assert_eq!(legacy::strip("&#336633Majek&ador"), "&#336633Majekdor");
/// ```
#[must_use]
pub fn strip(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();
        match (ch, next) {
            ('\\', Some('&')) => {
                out.push('&');
                i += 2;
            }
            ('&', Some(code)) if is_format_code(code) => i += 2,
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }
    out
}
