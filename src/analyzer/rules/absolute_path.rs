//! Absolute filesystem paths hard-coded in string literals.
//! A submission that only runs on the author's machine is blocked outright.

use super::{static_regex, Detection, ScanContext, ScanRule};
use crate::RuleId;
use regex::Regex;

const MESSAGE: &str = "CRITICAL: Absolute path found! Use relative paths.";

/// Rule for detecting quoted absolute paths
pub struct AbsolutePathRule;

impl AbsolutePathRule {
    pub fn new() -> Self {
        Self
    }

    /// A quote followed by `C:\`, `d:/` or `/segment/`
    fn pattern() -> &'static Regex {
        static_regex!(r#"["'`](?:[A-Za-z]:[\\/]|/\w+/)"#)
    }
}

impl Default for AbsolutePathRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanRule for AbsolutePathRule {
    fn rules(&self) -> &'static [RuleId] {
        &[RuleId::AbsolutePath]
    }

    fn check(&self, ctx: &ScanContext<'_>) -> Option<Detection> {
        Self::pattern()
            .find(ctx.text)
            .map(|m| Detection::new(RuleId::AbsolutePath, m.start(), MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Option<Detection> {
        AbsolutePathRule::new().check(&ScanContext::new(text, ""))
    }

    #[test]
    fn windows_drive_paths() {
        assert!(detect(r#"open("C:\\Users\\foo\\file.txt")"#).is_some());
        assert!(detect(r"path = 'D:\data\in.csv'").is_some());
        assert!(detect(r#"load("e:/projects/x.json")"#).is_some());
    }

    #[test]
    fn unix_paths() {
        assert!(detect(r#"fopen("/home/alice/notes.txt", "r")"#).is_some());
        assert!(detect("const p = `/Users/bob/`;").is_some());
    }

    #[test]
    fn relative_paths_and_urls_pass() {
        assert!(detect(r#"open("data/input.txt")"#).is_none());
        assert!(detect(r#"open("./input.txt")"#).is_none());
        assert!(detect(r#"fetch("https://example.com/api/")"#).is_none());
        assert!(detect(r#"x = "/""#).is_none());
    }

    #[test]
    fn unquoted_paths_pass() {
        assert!(detect("# lives in /usr/local/bin/").is_none());
    }

    #[test]
    fn reports_offset_of_opening_quote() {
        let text = "x = \"C:\\\\tmp\"";
        let d = detect(text).unwrap();
        assert_eq!(d.offset, 4);
        assert_eq!(d.rule, RuleId::AbsolutePath);
    }
}
