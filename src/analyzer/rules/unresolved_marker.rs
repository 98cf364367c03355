//! TODO / FIXME / XXX markers left in comments

use super::{static_regex, Detection, ScanContext, ScanRule};
use crate::RuleId;
use regex::Regex;

const MESSAGE: &str = "Resolve TODO comments.";

/// Rule for detecting unresolved work markers
pub struct UnresolvedMarkerRule;

impl UnresolvedMarkerRule {
    pub fn new() -> Self {
        Self
    }

    /// Marker right after a comment opener: `//`, `#`, `<!--`, `/*`, or a
    /// leading `*` inside a block comment
    fn pattern() -> &'static Regex {
        static_regex!(r"(?im)(?://|#|<!--|/\*+|^[ \t]*\*)[ \t]*(?:TODO|FIXME|XXX)\b")
    }
}

impl Default for UnresolvedMarkerRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanRule for UnresolvedMarkerRule {
    fn rules(&self) -> &'static [RuleId] {
        &[RuleId::UnresolvedMarker]
    }

    fn check(&self, ctx: &ScanContext<'_>) -> Option<Detection> {
        Self::pattern()
            .find(ctx.text)
            .map(|m| Detection::new(RuleId::UnresolvedMarker, m.start(), MESSAGE))
    }
}
