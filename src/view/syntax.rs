use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const MAX_HIGHLIGHT_LINES: usize = 200;
const RESET: &str = "\x1b[0m";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Highlight pretty-printed JSON as 24-bit terminal escapes.
/// Returns `None` for oversized bodies or when highlighting fails, so the
/// caller can fall back to plain agent-colored text.
pub fn highlight_json(text: &str) -> Option<String> {
    if text.lines().count() > MAX_HIGHLIGHT_LINES {
        return None;
    }

    let ss = &*SYNTAX_SET;
    let syntax = ss.find_syntax_by_extension("json")?;
    let mut h = HighlightLines::new(syntax, best_theme()?);

    let mut out = String::with_capacity(text.len() * 2);
    for line in LinesWithEndings::from(text) {
        let ranges = h.highlight_line(line, ss).ok()?;
        out.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
    }
    out.push_str(RESET);
    Some(out)
}

fn best_theme() -> Option<&'static Theme> {
    let ts = &*THEME_SET;
    ts.themes
        .get("base16-eighties.dark")
        .or_else(|| ts.themes.get("base16-ocean.dark"))
        .or_else(|| ts.themes.values().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_keeps_text_content() {
        let json = "{\n  \"a\": 1\n}";
        let highlighted = highlight_json(json).unwrap();
        assert!(highlighted.contains("\x1b["));
        assert!(highlighted.ends_with(RESET));

        let escapes = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        assert_eq!(escapes.replace_all(&highlighted, ""), json);
    }

    #[test]
    fn oversized_body_not_highlighted() {
        let json = format!("[\n{}\n]", vec!["  1,"; MAX_HIGHLIGHT_LINES + 5].join("\n"));
        assert!(highlight_json(&json).is_none());
    }
}
