//! Scan rules for code cleanliness

pub mod absolute_path;
pub mod debug_print;
pub mod deep_indentation;
pub mod empty_error_handler;
pub mod missing_header;
pub mod unresolved_marker;

pub use absolute_path::AbsolutePathRule;
pub use debug_print::DebugPrintRule;
pub use deep_indentation::DeepIndentationRule;
pub use empty_error_handler::EmptyErrorHandlerRule;
pub use missing_header::MissingHeaderRule;
pub use unresolved_marker::UnresolvedMarkerRule;

use crate::RuleId;

/// Inputs shared by every rule for one scan
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    /// Full document text
    pub text: &'a str,
    /// Configured display name (may be empty)
    pub student_name: &'a str,
}

impl<'a> ScanContext<'a> {
    pub fn new(text: &'a str, student_name: &'a str) -> Self {
        Self { text, student_name }
    }
}

/// A rule match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Rule to charge; a rule may report a refinement of itself
    pub rule: RuleId,
    /// Byte offset of the first match in the text
    pub offset: usize,
    pub message: String,
}

impl Detection {
    pub fn new(rule: RuleId, offset: usize, message: impl Into<String>) -> Self {
        Self {
            rule,
            offset,
            message: message.into(),
        }
    }
}

/// Trait for scan rules
///
/// Rules are pure and independent; each reports at most one detection per
/// document. `check` must be total over any string.
pub trait ScanRule: Send + Sync {
    /// Rule ids this check may report
    fn rules(&self) -> &'static [RuleId];

    /// Look for a violation in the document
    fn check(&self, ctx: &ScanContext<'_>) -> Option<Detection>;
}

/// Compile a pattern literal once per process.
macro_rules! static_regex {
    ($pattern:expr) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($pattern).expect("rule pattern is valid"))
    }};
}

pub(crate) use static_regex;
