//! Analysis engine - runs the rule table over a document

use crate::{FileScan, Location, Problem, RuleId, ScanResult};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::rules::{
    AbsolutePathRule, DebugPrintRule, DeepIndentationRule, EmptyErrorHandlerRule,
    MissingHeaderRule, ScanContext, ScanRule, UnresolvedMarkerRule,
};
use super::{RuleTable, ScoreCalculator};

/// Main analysis engine. Holds the rule table and the rule checks built
/// from it; `analyze` is pure.
pub struct Analyzer {
    table: RuleTable,
    rules: Vec<Box<dyn ScanRule>>,
}

impl Analyzer {
    /// Analyzer with the standard rule table
    pub fn new() -> Self {
        Self::from_table(RuleTable::standard())
    }

    pub fn from_table(table: RuleTable) -> Self {
        let rules: Vec<Box<dyn ScanRule>> = vec![
            Box::new(AbsolutePathRule::new()),
            Box::new(DebugPrintRule::with_reports(
                table.is_enabled(RuleId::DebugPrint),
                table.is_enabled(RuleId::DebugPrintInLoop),
            )),
            Box::new(UnresolvedMarkerRule::new()),
            Box::new(EmptyErrorHandlerRule::new().with_except_pass(table.except_pass())),
            Box::new(DeepIndentationRule::new()),
            Box::new(MissingHeaderRule::new()),
        ];
        Self { table, rules }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Scan a document. Rules run in table order; every triggered rule
    /// deducts its penalty and appends one problem.
    pub fn analyze(&self, text: &str, student_name: &str) -> ScanResult {
        let ctx = ScanContext::new(text, student_name);
        let mut problems = Vec::new();
        let mut fatal = false;

        for rule in &self.rules {
            if !rule.rules().iter().any(|r| self.table.is_enabled(*r)) {
                continue;
            }
            let Some(detection) = rule.check(&ctx) else {
                continue;
            };
            let Some(entry) = self.table.entry(detection.rule).filter(|e| e.enabled) else {
                continue;
            };
            let location = Location::from_offset(text, detection.offset);
            log::debug!(
                "{} triggered at {}:{} (-{}{})",
                detection.rule,
                location.line,
                location.column,
                entry.penalty,
                if entry.fatal { ", fatal" } else { "" }
            );
            fatal |= entry.fatal;
            problems.push(Problem {
                rule: detection.rule,
                message: detection.message,
                deduction: entry.penalty,
                location,
            });
        }

        let score = ScoreCalculator::from_deductions(problems.iter().map(|p| p.deduction));
        ScanResult {
            score,
            fatal,
            problems,
        }
    }

    /// Read and scan a file
    pub fn analyze_file(&self, path: &Path, student_name: &str) -> Result<FileScan> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let result = self.analyze(&text, student_name);
        log::debug!("{}: score {}", path.display(), result.score);
        Ok(FileScan {
            file_path: path.to_path_buf(),
            result,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
