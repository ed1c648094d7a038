/// Normalize a text fragment pulled out of the page.
///
/// Trims the ends first, then swaps non-breaking spaces for plain spaces and
/// drops line breaks. Whitespace exposed by the replacements is left alone.
/// The ASCII separators U+001C..U+001F count as trimmable whitespace too.
pub fn clean(text: &str) -> String {
    text.trim_matches(is_trimmable)
        .replace('\u{a0}', " ")
        .replace('\n', "")
        .replace('\r', "")
}

fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

// ── Tests ──
