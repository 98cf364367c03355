//! Debug output left in submitted code.
//!
//! Prints inside a loop body are charged as their own, heavier violation.
//! Loop bodies are found textually: a `for`/`while` keyword, the first `{`
//! within a short window after it, and everything up to the matching `}`.
//! Only one of the two violations is ever reported for a document.

use super::{static_regex, Detection, ScanContext, ScanRule};
use crate::RuleId;
use regex::Regex;

/// How far past the loop keyword to look for the opening brace
const LOOP_HEADER_WINDOW: usize = 160;

const PRINT_MESSAGE: &str = "Remove 'print/console.log' statements.";
const LOOP_MESSAGE: &str =
    "Debug print inside a loop. Remove 'print/console.log' calls from loop bodies.";

/// Rule for detecting debug print calls
pub struct DebugPrintRule {
    report_plain: bool,
    report_loop: bool,
}

impl DebugPrintRule {
    pub fn new() -> Self {
        Self {
            report_plain: true,
            report_loop: true,
        }
    }

    /// Restrict which of the two violations may be reported
    pub fn with_reports(report_plain: bool, report_loop: bool) -> Self {
        Self {
            report_plain,
            report_loop,
        }
    }

    fn print_pattern() -> &'static Regex {
        static_regex!(concat!(
            r"\bconsole\.(?:log|debug|info|warn|error|trace|dir|table)\s*\(",
            r"|\bSystem\.(?:out|err)\.print(?:ln|f)?\s*\(",
            r"|\bfmt\.(?:Print|Println|Printf)\s*\(",
            r"|\bLog\.[dv]\s*\(",
            r"|\b(?:print|printf|var_dump|print_r)\s*\(",
            r"|\b(?:e?println|e?print|dbg)!\s*\(",
            r"|\bputs\b",
            r"|\bstd::cout\b|\bcout\s*<<",
        ))
    }

    fn loop_pattern() -> &'static Regex {
        static_regex!(r"\b(?:for|while)\b")
    }

    /// Offsets of the `{` that opens each loop body, ascending
    fn loop_openers(text: &str) -> Vec<usize> {
        let bytes = text.as_bytes();
        let mut openers: Vec<usize> = Self::loop_pattern()
            .find_iter(text)
            .filter_map(|m| {
                let window_end = (m.end() + LOOP_HEADER_WINDOW).min(bytes.len());
                bytes[m.end()..window_end]
                    .iter()
                    .position(|&b| b == b'{')
                    .map(|rel| m.end() + rel)
            })
            .collect();
        openers.dedup();
        openers
    }

    /// Offset of the first print inside a loop body. One pass over the text
    /// with a brace stack; unbalanced bodies run to the end of the text.
    fn print_in_loop(text: &str) -> Option<usize> {
        let openers = Self::loop_openers(text);
        if openers.is_empty() {
            return None;
        }
        let mut openers = openers.into_iter().peekable();
        let mut prints = Self::print_pattern()
            .find_iter(text)
            .map(|m| m.start())
            .peekable();

        let mut stack: Vec<bool> = Vec::new();
        let mut open_loops = 0usize;
        for (i, &b) in text.as_bytes().iter().enumerate() {
            while prints.peek() == Some(&i) {
                if open_loops > 0 {
                    return Some(i);
                }
                prints.next();
            }
            match b {
                b'{' => {
                    let is_loop = openers.peek() == Some(&i);
                    if is_loop {
                        openers.next();
                        open_loops += 1;
                    }
                    stack.push(is_loop);
                }
                b'}' => {
                    if stack.pop() == Some(true) {
                        open_loops -= 1;
                    }
                }
                _ => {}
            }
            if prints.peek().is_none() {
                break;
            }
        }
        None
    }
}

impl Default for DebugPrintRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanRule for DebugPrintRule {
    fn rules(&self) -> &'static [RuleId] {
        &[RuleId::DebugPrint, RuleId::DebugPrintInLoop]
    }

    fn check(&self, ctx: &ScanContext<'_>) -> Option<Detection> {
        let first = Self::print_pattern().find(ctx.text)?;

        if self.report_loop {
            if let Some(offset) = Self::print_in_loop(ctx.text) {
                return Some(Detection::new(
                    RuleId::DebugPrintInLoop,
                    offset,
                    LOOP_MESSAGE,
                ));
            }
        }

        self.report_plain
            .then(|| Detection::new(RuleId::DebugPrint, first.start(), PRINT_MESSAGE))
    }
}
