//! Deep indentation as a proxy for excessive nesting

use super::{static_regex, Detection, ScanContext, ScanRule};
use crate::RuleId;
use regex::Regex;

/// Leading whitespace characters that count as "too deep"
pub const MAX_INDENT: usize = 16;

const MESSAGE: &str = "Deep indentation (Spaghetti code). Refactor into functions.";

/// Rule for detecting deeply indented lines
pub struct DeepIndentationRule;

impl DeepIndentationRule {
    pub fn new() -> Self {
        Self
    }

    /// 16+ whitespace characters (any Unicode whitespace except the line
    /// break) at the start of a line
    fn pattern() -> &'static Regex {
        static_regex!(r"(?m)^[^\S\n]{16,}")
    }
}

impl Default for DeepIndentationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanRule for DeepIndentationRule {
    fn rules(&self) -> &'static [RuleId] {
        &[RuleId::DeepIndentation]
    }

    fn check(&self, ctx: &ScanContext<'_>) -> Option<Detection> {
        Self::pattern()
            .find(ctx.text)
            .map(|m| Detection::new(RuleId::DeepIndentation, m.start(), MESSAGE))
    }
}
