//! Rule table: the ordered (rule, penalty, fatal) records the engine applies

use crate::RuleId;
use serde::{Deserialize, Serialize};

/// One row of the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub rule: RuleId,
    /// Points deducted when the rule triggers
    pub penalty: u8,
    /// Triggering forces the failure tier
    pub fatal: bool,
    pub enabled: bool,
}

impl RuleEntry {
    const fn new(rule: RuleId, penalty: u8, fatal: bool) -> Self {
        Self {
            rule,
            penalty,
            fatal,
            enabled: true,
        }
    }
}

/// Named canonical rule tables.
///
/// Two weightings are in circulation; `Standard` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulePreset {
    /// TODO -10, empty handler -20, failure below 50
    #[default]
    Standard,
    /// TODO -5, empty handler -15, failure below 60
    Gentle,
}

impl RulePreset {
    pub fn rule_table(self) -> RuleTable {
        let (marker, handler) = match self {
            RulePreset::Standard => (10, 20),
            RulePreset::Gentle => (5, 15),
        };
        RuleTable {
            entries: vec![
                RuleEntry::new(RuleId::AbsolutePath, 40, true),
                RuleEntry::new(RuleId::DebugPrint, 10, false),
                RuleEntry::new(RuleId::DebugPrintInLoop, 25, false),
                RuleEntry::new(RuleId::UnresolvedMarker, marker, false),
                RuleEntry::new(RuleId::EmptyErrorHandler, handler, false),
                RuleEntry::new(RuleId::DeepIndentation, 10, false),
                RuleEntry::new(RuleId::MissingHeader, 5, false),
            ],
            except_pass: true,
        }
    }

    /// Scores below this land in the failure tier
    pub fn warn_threshold(self) -> u8 {
        match self {
            RulePreset::Standard => 50,
            RulePreset::Gentle => 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RulePreset::Standard => "standard",
            RulePreset::Gentle => "gentle",
        }
    }
}

impl std::fmt::Display for RulePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RulePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(RulePreset::Standard),
            "gentle" => Ok(RulePreset::Gentle),
            other => Err(format!(
                "unknown preset '{}' (expected 'standard' or 'gentle')",
                other
            )),
        }
    }
}

/// Ordered rule table plus rule options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
    /// Treat `except ...: pass` as an empty error handler
    except_pass: bool,
}

impl RuleTable {
    pub fn standard() -> Self {
        RulePreset::Standard.rule_table()
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn entry(&self, rule: RuleId) -> Option<&RuleEntry> {
        self.entries.iter().find(|e| e.rule == rule)
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        self.entry(rule).map(|e| e.enabled).unwrap_or(false)
    }

    pub fn except_pass(&self) -> bool {
        self.except_pass
    }

    pub fn set_except_pass(&mut self, on: bool) {
        self.except_pass = on;
    }

    pub fn set_penalty(&mut self, rule: RuleId, penalty: u8) {
        if let Some(e) = self.entry_mut(rule) {
            e.penalty = penalty;
        }
    }

    pub fn set_fatal(&mut self, rule: RuleId, fatal: bool) {
        if let Some(e) = self.entry_mut(rule) {
            e.fatal = fatal;
        }
    }

    pub fn set_enabled(&mut self, rule: RuleId, enabled: bool) {
        if let Some(e) = self.entry_mut(rule) {
            e.enabled = enabled;
        }
    }

    fn entry_mut(&mut self, rule: RuleId) -> Option<&mut RuleEntry> {
        self.entries.iter_mut().find(|e| e.rule == rule)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}
