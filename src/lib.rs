//! Grade Guardian: code cleanliness scanner
//!
//! This library scans the text of a single source file with a fixed, ordered
//! set of textual heuristics and produces a cleanliness score (0-100) with a
//! list of problems. It is deliberately not a parser: every rule is a pattern
//! match over raw text so it works the same for any language.

pub mod analyzer;
pub mod config;
pub mod controller;
pub mod presenter;
pub mod reporter;
pub mod watcher;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use analyzer::{Analyzer, RulePreset, RuleTable};
pub use controller::{ScanController, ScanTrigger, Settings, StatusUpdate};
pub use presenter::{Presenter, StatusView, Tier};
pub use reporter::IssueReport;

/// The complete output of one analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Cleanliness score (0-100)
    pub score: u8,
    /// True when a fatal rule triggered; forces the failure tier
    pub fatal: bool,
    /// Problems in rule evaluation order
    pub problems: Vec<Problem>,
}

impl ScanResult {
    /// A result with no problems
    pub fn clean() -> Self {
        Self {
            score: analyzer::scoring::START_SCORE,
            fatal: false,
            problems: Vec::new(),
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.score == analyzer::scoring::START_SCORE
    }

    /// Problem messages in evaluation order
    pub fn messages(&self) -> Vec<&str> {
        self.problems.iter().map(|p| p.message.as_str()).collect()
    }

    /// Sum of all deductions before clamping
    pub fn total_deduction(&self) -> u32 {
        self.problems.iter().map(|p| p.deduction as u32).sum()
    }

    pub fn has_rule(&self, rule: RuleId) -> bool {
        self.problems.iter().any(|p| p.rule == rule)
    }
}

/// A triggered rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Rule that triggered
    pub rule: RuleId,
    /// Human-readable message
    pub message: String,
    /// Points deducted for this problem
    pub deduction: u8,
    /// Where the first match was found
    pub location: Location,
}

/// Scan rules, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    /// Quoted absolute filesystem path (fatal)
    AbsolutePath,
    /// Debug print call outside any loop
    DebugPrint,
    /// Debug print call inside a loop body
    DebugPrintInLoop,
    /// TODO / FIXME / XXX comment
    UnresolvedMarker,
    /// catch {} or except: pass
    EmptyErrorHandler,
    /// Line indented by 16 or more whitespace characters
    DeepIndentation,
    /// Student name missing from the file header
    MissingHeader,
}

impl RuleId {
    /// Every rule in evaluation order
    pub const ALL: [RuleId; 7] = [
        RuleId::AbsolutePath,
        RuleId::DebugPrint,
        RuleId::DebugPrintInLoop,
        RuleId::UnresolvedMarker,
        RuleId::EmptyErrorHandler,
        RuleId::DeepIndentation,
        RuleId::MissingHeader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::AbsolutePath => "absolute-path",
            RuleId::DebugPrint => "debug-print",
            RuleId::DebugPrintInLoop => "debug-print-in-loop",
            RuleId::UnresolvedMarker => "unresolved-marker",
            RuleId::EmptyErrorHandler => "empty-error-handler",
            RuleId::DeepIndentation => "deep-indentation",
            RuleId::MissingHeader => "missing-header",
        }
    }

    /// Icon shown next to the message in reports
    pub fn icon(&self) -> &'static str {
        match self {
            RuleId::AbsolutePath => "🚨",
            RuleId::DebugPrint => "⚠️",
            RuleId::DebugPrintInLoop => "🔁",
            RuleId::UnresolvedMarker => "📝",
            RuleId::EmptyErrorHandler => "☠️",
            RuleId::DeepIndentation => "🍝",
            RuleId::MissingHeader => "📛",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleId {
    type Err = config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleId::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| config::ConfigError::UnknownRule(s.to_string()))
    }
}

/// Location in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Resolve a byte offset into `text`. Offsets past the end or inside a
    /// multi-byte character are snapped back to the previous boundary.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

/// Result of scanning one file on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileScan {
    /// Path to the scanned file
    pub file_path: PathBuf,
    #[serde(flatten)]
    pub result: ScanResult,
}

/// Aggregate numbers over a batch of scans
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub average_score: u8,
    pub perfect_files: usize,
    pub fatal_files: usize,
    pub total_problems: usize,
}

impl ScanSummary {
    pub fn from_scans(scans: &[FileScan]) -> Self {
        let files_scanned = scans.len();
        let average_score = if files_scanned == 0 {
            0
        } else {
            let sum: usize = scans.iter().map(|s| s.result.score as usize).sum();
            (sum / files_scanned) as u8
        };
        Self {
            files_scanned,
            average_score,
            perfect_files: scans.iter().filter(|s| s.result.is_perfect()).count(),
            fatal_files: scans.iter().filter(|s| s.result.fatal).count(),
            total_problems: scans.iter().map(|s| s.result.problems.len()).sum(),
        }
    }
}

fn default_analyzer() -> &'static Analyzer {
    static ANALYZER: OnceLock<Analyzer> = OnceLock::new();
    ANALYZER.get_or_init(Analyzer::new)
}

/// Scan `text` with the standard rule table.
///
/// `student_name` is the configured display name; an empty or
/// whitespace-only name disables the header check.
pub fn analyze(text: &str, student_name: &str) -> ScanResult {
    default_analyzer().analyze(text, student_name)
}

/// Public API: scan a single file on disk. Used by the LSP and other
/// programmatic consumers.
///
/// * `path` - file to scan
/// * `work_dir` - directory where the config search starts
/// * `config_path` - optional explicit config file
pub fn scan_file(
    path: &Path,
    work_dir: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<FileScan> {
    let config = config::load_config(work_dir, config_path)?;
    let settings = config.settings_for_file(path)?;
    Analyzer::from_table(settings.rule_table).analyze_file(path, &settings.student_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_from_offset_counts_lines_and_chars() {
        let text = "first\nsecond line\nthird";
        assert_eq!(Location::from_offset(text, 0), Location::new(1, 1));
        assert_eq!(Location::from_offset(text, 6), Location::new(2, 1));
        assert_eq!(Location::from_offset(text, 13), Location::new(2, 8));
        assert_eq!(Location::from_offset(text, 19), Location::new(3, 2));
    }

    #[test]
    fn location_from_offset_is_total() {
        assert_eq!(Location::from_offset("", 10), Location::new(1, 1));
        // 'é' is two bytes; offset 2 lands inside it
        assert_eq!(Location::from_offset("aé", 2), Location::new(1, 2));
    }

    #[test]
    fn rule_id_round_trips_through_str() {
        for rule in RuleId::ALL {
            assert_eq!(rule.as_str().parse::<RuleId>().unwrap(), rule);
        }
        assert!("not-a-rule".parse::<RuleId>().is_err());
    }

    #[test]
    fn rule_id_serializes_kebab_case() {
        let json = serde_json::to_string(&RuleId::DebugPrintInLoop).unwrap();
        assert_eq!(json, "\"debug-print-in-loop\"");
    }

    #[test]
    fn summary_averages_scores() {
        let scans = vec![
            FileScan {
                file_path: PathBuf::from("a.js"),
                result: ScanResult::clean(),
            },
            FileScan {
                file_path: PathBuf::from("b.js"),
                result: ScanResult {
                    score: 50,
                    fatal: true,
                    problems: vec![],
                },
            },
        ];
        let summary = ScanSummary::from_scans(&scans);
        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.average_score, 75);
        assert_eq!(summary.perfect_files, 1);
        assert_eq!(summary.fatal_files, 1);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let summary = ScanSummary::from_scans(&[]);
        assert_eq!(summary.files_scanned, 0);
        assert_eq!(summary.average_score, 0);
    }
}
