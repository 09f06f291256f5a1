//! # Search Highlighting
//!
//! Wraps every case-insensitive occurrence of the query in `<strong>` and
//! HTML-escapes everything else, so a product name can never inject markup
//! into the results dropdown.
//!
//! The query is matched literally: `"c++"` or `"(65%)"` highlight as typed
//! instead of being compiled as a pattern.

use regex::RegexBuilder;

/// Highlights `query` inside `text`.
///
/// ```rust
/// use keyshop_core::highlight::highlight;
///
/// assert_eq!(highlight("GMK Keycaps", "key"), "GMK <strong>Key</strong>caps");
/// assert_eq!(highlight("Case (65%)", "(65"), "Case <strong>(65</strong>%)");
/// assert_eq!(highlight("<b>", "zz"), "&lt;b&gt;");
/// ```
pub fn highlight(text: &str, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return escape_html(text);
    }

    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(_) => return escape_html(text),
    };

    let mut out = String::with_capacity(text.len() + 17);
    let mut last = 0;
    for m in pattern.find_iter(text) {
        out.push_str(&escape_html(&text[last..m.start()]));
        out.push_str("<strong>");
        out.push_str(&escape_html(m.as_str()));
        out.push_str("</strong>");
        last = m.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlights_every_occurrence() {
        assert_eq!(
            highlight("Key Puller for keycaps", "key"),
            "<strong>Key</strong> Puller for <strong>key</strong>caps"
        );
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert_eq!(highlight("Switch.Tester", "."), "Switch<strong>.</strong>Tester");
        assert_eq!(highlight("Lube [205g0]", "[205"), "Lube <strong>[205</strong>g0]");
        assert_eq!(highlight("no match here", "a+"), "no match here");
    }

    #[test]
    fn test_escapes_markup_inside_and_outside_match() {
        assert_eq!(
            highlight("<Tom & Jerry>", "& j"),
            "&lt;Tom <strong>&amp; J</strong>erry&gt;"
        );
    }

    #[test]
    fn test_empty_query_only_escapes() {
        assert_eq!(highlight("\"Quoted\"", "   "), "&quot;Quoted&quot;");
    }
}
