//! Conversion of arbitrary text into legal XML names and escaped content.
//!
//! Entity references written by [`legalize_content`] omit the trailing semicolon (`&lt`, not `&lt;`),
//! matching what the reader decodes in [`decode_content`].

/// The five predefined references, paired with the character they stand for.
const REFERENCES: [(&str, char); 5] = [
    ("quot", '"'),
    ("apos", '\''),
    ("lt", '<'),
    ("gt", '>'),
    ("amp", '&'),
];

/// Turns `text` into a valid XML name.
///
/// Text after the first NUL is ignored. Every code point not permitted by the XML `Name` production
/// at its position is replaced with `_`. An empty input produces `_`.
///
/// # Example
/// ```rust
/// use xmlentity::legalize_name;
///
/// assert_eq!(legalize_name("1st item"), "_st_item");
/// assert_eq!(legalize_name("ns:tag-name.v2"), "ns:tag-name.v2");
/// assert_eq!(legalize_name(""), "_");
/// ```
#[must_use]
pub fn legalize_name(text: &str) -> String {
    let mut chars = text.chars().take_while(|&c| c != '\0');

    let mut name = String::with_capacity(text.len().max(1));
    match chars.next() {
        Some(c) if is_name_start_char(c) => name.push(c),
        _ => name.push('_'),
    }

    for c in chars {
        name.push(if is_name_char(c) { c } else { '_' });
    }

    name
}

/// Replaces `<`, `>`, `"`, `'` and `&` in `text` with their entity references.
///
/// # Example
/// ```rust
/// use xmlentity::legalize_content;
///
/// assert_eq!(legalize_content("a < b & c"), "a &lt b &amp c");
/// ```
#[must_use]
pub fn legalize_content(text: &str) -> String {
    let mut content = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => content.push_str("&lt"),
            '>' => content.push_str("&gt"),
            '"' => content.push_str("&quot"),
            '\'' => content.push_str("&apos"),
            '&' => content.push_str("&amp"),
            _ => content.push(c),
        }
    }
    content
}

/// Decodes the five predefined entity references in `text`.
///
/// The trailing semicolon is not required, and not consumed.
/// An `&` that does not start a predefined reference is kept as-is.
///
/// # Example
/// ```rust
/// use xmlentity::{decode_content, legalize_content};
///
/// let text = r#"if (a < b && c > "d") 'e'"#;
/// assert_eq!(decode_content(&legalize_content(text)), text);
/// ```
#[must_use]
pub fn decode_content(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(i) = rest.find('&') {
        decoded.push_str(&rest[..i]);
        rest = &rest[i + 1..];

        match decode_reference(rest) {
            Some((c, len)) => {
                decoded.push(c);
                rest = &rest[len..];
            }
            None => decoded.push('&'),
        }
    }
    decoded.push_str(rest);
    decoded
}

/// Makes `text` safe to place inside `<!-- -->`.
///
/// `--` may not appear in a comment: every `---` becomes an em dash and every remaining `--`
/// becomes an en dash.
///
/// # Example
/// ```rust
/// use xmlentity::legalize_comment;
///
/// assert_eq!(legalize_comment("a---b--c"), "a\u{2014}b\u{2013}c");
/// ```
#[must_use]
pub fn legalize_comment(text: &str) -> String {
    text.replace("---", "\u{2014}").replace("--", "\u{2013}")
}

/// Matches a predefined reference name at the start of `text` (the text following an `&`).
///
/// Returns the decoded character and the number of bytes the reference name occupies.
pub(crate) fn decode_reference(text: &str) -> Option<(char, usize)> {
    REFERENCES
        .iter()
        .find(|(name, _)| text.starts_with(name))
        .map(|(name, c)| (*c, name.len()))
}

/// Code points allowed as the first character of a name.
fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

/// Code points allowed after the first character of a name.
fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_name_unchanged() {
        assert_eq!(legalize_name("root"), "root");
        assert_eq!(legalize_name("_a:b-c.d9"), "_a:b-c.d9");
        assert_eq!(legalize_name("Grüße"), "Grüße");
        assert_eq!(legalize_name("日本"), "日本");
    }

    #[test]
    fn test_illegal_first_char() {
        assert_eq!(legalize_name("9lives"), "_lives");
        assert_eq!(legalize_name("-dash"), "_dash");
        assert_eq!(legalize_name(".dot"), "_dot");
        assert_eq!(legalize_name("\u{300}mark"), "_mark");
    }

    #[test]
    fn test_illegal_following_chars() {
        assert_eq!(legalize_name("a b"), "a_b");
        assert_eq!(legalize_name("a<b>"), "a_b_");
        assert_eq!(legalize_name("a\u{B7}\u{300}\u{203F}"), "a\u{B7}\u{300}\u{203F}");
        assert_eq!(legalize_name("x\u{D7}y"), "x_y");
    }

    #[test]
    fn test_empty_and_nul() {
        assert_eq!(legalize_name(""), "_");
        assert_eq!(legalize_name("\0"), "_");
        assert_eq!(legalize_name("ab\0cd"), "ab");
    }

    #[test]
    fn test_name_idempotent() {
        for text in ["", "1 2 3", "a--b", "\u{300}\u{300}", "x y\tz", "::", "é-1"] {
            let once = legalize_name(text);
            assert_eq!(legalize_name(&once), once);
        }
    }

    #[test]
    fn test_content_escaping() {
        assert_eq!(legalize_content("plain"), "plain");
        assert_eq!(
            legalize_content(r#"<a href="x">'&'</a>"#),
            "&lta href=&quotx&quot&gt&apos&amp&apos&lt/a&gt"
        );
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_content("&lt&gt&quot&apos&amp"), "<>\"'&");
        assert_eq!(decode_content("&lt;"), "<;");
        assert_eq!(decode_content("a & b"), "a & b");
        assert_eq!(decode_content("&#65;"), "&#65;");
        assert_eq!(decode_content("trailing&"), "trailing&");
    }

    #[test]
    fn test_comment_dashes() {
        assert_eq!(legalize_comment("plain - text"), "plain - text");
        assert_eq!(legalize_comment("a--b"), "a\u{2013}b");
        assert_eq!(legalize_comment("a---b"), "a\u{2014}b");
        assert_eq!(legalize_comment("----"), "\u{2014}-");
        assert_eq!(legalize_comment("-----"), "\u{2014}\u{2013}");
        assert!(!legalize_comment("--x---y-----").contains("--"));
    }

    #[test]
    fn test_escape_decode_round_trip() {
        let text = "a<b>c\"d'e&f &amp; g";
        assert_eq!(decode_content(&legalize_content(text)), text);
    }
}
