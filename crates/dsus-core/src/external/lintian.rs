//! Parse lintian's one-line-per-tag output.
//!
//! Lines look like `E: pkg binary: some-tag extra info` or, for older
//! lintian, `W: pkg: some-tag`.

use super::{LintParser, LintTag};

#[derive(Debug, Clone, Copy, Default)]
pub struct LintianOutputParser;

impl LintParser for LintianOutputParser {
    fn parse_lintian_output(&self, output: &str) -> Vec<LintTag> {
        output.lines().filter_map(parse_line).collect()
    }
}

fn parse_line(line: &str) -> Option<LintTag> {
    let mut chars = line.chars();
    let severity = chars.next()?;
    if !"EWIPXON".contains(severity) || !line[1..].starts_with(": ") {
        return None;
    }
    let rest = &line[3..];
    let (who, what) = rest.split_once(": ")?;

    let mut who_parts = who.split_whitespace();
    let package = who_parts.next()?.to_string();
    let package_type = who_parts.next().map(String::from);

    let what = what.trim();
    let (tag, info) = match what.split_once(char::is_whitespace) {
        Some((tag, info)) => (tag, Some(info.trim().to_string())),
        None => (what, None),
    };
    if tag.is_empty() {
        return None;
    }

    Some(LintTag {
        severity,
        package,
        package_type,
        tag: tag.to_string(),
        info,
    })
}
