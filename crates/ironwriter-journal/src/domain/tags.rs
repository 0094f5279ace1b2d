//! Command tag tokenizer.
//!
//! Entries embed commands as `[tag arg "quoted arg"]`. Spans do not nest:
//! the first `]` closes a span, and a span never crosses a line break.

/// One bracketed command with its arguments, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lowercased tag name.
    pub name: String,
    /// Arguments after the tag name, with one layer of quotes stripped.
    pub args: Vec<String>,
}

/// Parses every command tag in `text`.
#[must_use]
pub fn parse_tags(text: &str) -> Vec<Tag> {
    extract_spans(text)
        .into_iter()
        .filter_map(|span| {
            let mut tokens = split_tokens(span).into_iter();
            let name = tokens.next()?.to_lowercase();
            Some(Tag {
                name,
                args: tokens.collect(),
            })
        })
        .collect()
}

/// Returns the interior of every `[...]` span.
#[must_use]
pub fn extract_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        match after.find([']', '\n']) {
            Some(close) if after[close..].starts_with(']') => {
                spans.push(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => rest = after,
        }
    }
    spans
}

/// Splits a span on whitespace outside double quotes.
///
/// Whitespace separates tokens only when an even number of quote characters
/// precede it. Empty tokens are discarded, and a token wrapped in quotes
/// loses one layer of them.
#[must_use]
pub fn split_tokens(span: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quotes = 0usize;
    for c in span.chars() {
        if c == '"' {
            quotes += 1;
        }
        if c.is_whitespace() && quotes % 2 == 0 {
            if !current.is_empty() {
                tokens.push(strip_quotes(&current));
                current.clear();
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(strip_quotes(&current));
    }
    tokens
}

fn strip_quotes(token: &str) -> String {
    token
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(token)
        .to_owned()
}
