use std::collections::BTreeSet;
use std::iter::Peekable;
use std::str::Chars;

// ---------------------------------------------------------------------------
// Topic-tag list decoding
// ---------------------------------------------------------------------------

/// Decode a string-encoded tag list such as `['Endometriosis', 'Humans']`.
///
/// Accepts single- or double-quoted items (so JSON arrays of strings work
/// too), backslash escapes including `\xHH`, `\uHHHH` (with JSON surrogate
/// pairs) and `\UHHHHHHHH`, and a trailing comma. Unrecognised escapes such
/// as `\q` stay literal, as in Python. A blank cell is an empty list.
/// Returns `None` when the text is not a list of quoted strings; the caller
/// decides how to treat that.
pub fn parse_tag_list(raw: &str) -> Option<BTreeSet<String>> {
    let text = raw.trim();
    if text.is_empty() {
        return Some(BTreeSet::new());
    }
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;

    let mut tags = BTreeSet::new();
    let mut chars = inner.chars().peekable();
    loop {
        skip_whitespace(&mut chars);
        match chars.next() {
            None => break,
            Some(quote @ ('\'' | '"')) => {
                tags.insert(read_quoted(&mut chars, quote)?);
                skip_whitespace(&mut chars);
                match chars.next() {
                    None => break,
                    Some(',') => continue,
                    Some(_) => return None,
                }
            }
            Some(_) => return None,
        }
    }
    Some(tags)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

/// Read up to the closing `quote`; the opening quote is already consumed.
fn read_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Option<String> {
    let mut out = String::new();
    loop {
        match chars.next()? {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'x' => out.push(char::from_u32(read_hex(chars, 2)?)?),
                'u' => out.push(read_utf16_escape(chars)?),
                'U' => out.push(char::from_u32(read_hex(chars, 8)?)?),
                c @ ('\\' | '\'' | '"' | '/') => out.push(c),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            c if c == quote => return Some(out),
            c => out.push(c),
        }
    }
}

fn read_hex(chars: &mut Peekable<Chars<'_>>, digits: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// Body of a `\u` escape. A high surrogate must be followed by `\uDC00..`.
fn read_utf16_escape(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    let unit = read_hex(chars, 4)?;
    if !(0xD800..0xDC00).contains(&unit) {
        return char::from_u32(unit);
    }
    if chars.next()? != '\\' || chars.next()? != 'u' {
        return None;
    }
    let low = read_hex(chars, 4)?;
    if !(0xDC00..0xE000).contains(&low) {
        return None;
    }
    char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_single_quoted_list() {
        let parsed = parse_tag_list("['Endometriosis', 'Humans', 'Female']").unwrap();
        assert_eq!(parsed, tags(&["Endometriosis", "Female", "Humans"]));
    }

    #[test]
    fn parses_json_style_list() {
        let parsed = parse_tag_list(r#"["Polycystic Ovary Syndrome","Adult"]"#).unwrap();
        assert_eq!(parsed, tags(&["Adult", "Polycystic Ovary Syndrome"]));
    }

    #[test]
    fn keeps_quotes_of_the_other_kind_and_escapes() {
        let parsed = parse_tag_list(r#"["Crohn's Disease", 'it\'s', 'a\\b']"#).unwrap();
        assert_eq!(parsed, tags(&["Crohn's Disease", "a\\b", "it's"]));
    }

    #[test]
    fn decodes_hex_and_unicode_escapes() {
        let raw = r#"['Sj\xf6gren', "Caf\u00e9", 'x\U0001F600', "\ud83d\ude00"]"#;
        let parsed = parse_tag_list(raw).unwrap();
        assert_eq!(parsed, tags(&["Café", "Sjögren", "x😀", "😀"]));
    }

    #[test]
    fn unknown_escapes_stay_literal() {
        assert_eq!(parse_tag_list(r"['a\qb']"), Some(tags(&["a\\qb"])));
    }

    #[test]
    fn broken_unicode_escapes_are_malformed() {
        for raw in [r"['\u00']", r"['\xZZ']", r"['\ud83d']", r#"["\ud83d\u0041"]"#] {
            assert_eq!(parse_tag_list(raw), None, "{raw:?} should be malformed");
        }
    }

    #[test]
    fn blank_and_empty_lists_have_no_tags() {
        assert_eq!(parse_tag_list(""), Some(BTreeSet::new()));
        assert_eq!(parse_tag_list("   "), Some(BTreeSet::new()));
        assert_eq!(parse_tag_list("[]"), Some(BTreeSet::new()));
        assert_eq!(parse_tag_list("[ ]"), Some(BTreeSet::new()));
    }

    #[test]
    fn trailing_comma_is_accepted() {
        assert_eq!(parse_tag_list("['Dysmenorrhea',]"), Some(tags(&["Dysmenorrhea"])));
    }

    #[test]
    fn malformed_encodings_are_rejected() {
        for raw in [
            "Endometriosis",
            "nan",
            "['Endometriosis'",
            "['Endometriosis]",
            "[Endometriosis]",
            "['a' 'b']",
            "[,]",
            "['a',,'b']",
        ] {
            assert_eq!(parse_tag_list(raw), None, "{raw:?} should be malformed");
        }
    }

    #[test]
    fn tags_are_case_sensitive_and_untrimmed() {
        let parsed = parse_tag_list("[' Endometriosis', 'endometriosis']").unwrap();
        assert!(!parsed.contains("Endometriosis"));
        assert_eq!(parsed.len(), 2);
    }
}
