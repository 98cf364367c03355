//! Student name missing from the top of the file

use super::{Detection, ScanContext, ScanRule};
use crate::RuleId;

/// Lines that make up the header
pub const HEADER_LINES: usize = 10;

/// Rule for checking that the configured name appears in the header
pub struct MissingHeaderRule;

impl MissingHeaderRule {
    pub fn new() -> Self {
        Self
    }

    /// First `HEADER_LINES` lines, newlines included
    fn header(text: &str) -> &str {
        match text.match_indices('\n').nth(HEADER_LINES - 1) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }
}

impl Default for MissingHeaderRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanRule for MissingHeaderRule {
    fn rules(&self) -> &'static [RuleId] {
        &[RuleId::MissingHeader]
    }

    fn check(&self, ctx: &ScanContext<'_>) -> Option<Detection> {
        let name = ctx.student_name.trim();
        if name.is_empty() || Self::header(ctx.text).contains(name) {
            return None;
        }
        Some(Detection::new(
            RuleId::MissingHeader,
            0,
            format!("Header missing. Add your name: '{}' to top of file.", name),
        ))
    }
}
