//! Status presentation: maps a scan result to the persistent indicator

use crate::{RulePreset, ScanResult};
use serde::{Deserialize, Serialize};

const SUCCESS_COLOR: &str = "#50fa7b";
const WARNING_COLOR: &str = "#ffb86c";
const FAILURE_COLOR: &str = "#ff5555";

/// Visual tier of the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Perfect score
    Success,
    /// Passable, with problems
    Warning,
    /// Fatal problem or score below the warn threshold
    Failure,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Success => write!(f, "success"),
            Tier::Warning => write!(f, "warning"),
            Tier::Failure => write!(f, "failure"),
        }
    }
}

/// Everything a host needs to draw the status indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub tier: Tier,
    pub score: u8,
    /// Indicator text without the icon
    pub text: String,
    /// Codicon name, if the tier has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Hex color
    pub color: String,
    pub tooltip: String,
}

impl StatusView {
    /// Text with the icon in `$(name)` form, as editors render it
    pub fn label(&self) -> String {
        match self.icon {
            Some(ref icon) => format!("$({}) {}", icon, self.text),
            None => self.text.clone(),
        }
    }
}

/// Maps results to status views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presenter {
    warn_threshold: u8,
}

impl Presenter {
    pub fn new(warn_threshold: u8) -> Self {
        Self { warn_threshold }
    }

    pub fn warn_threshold(&self) -> u8 {
        self.warn_threshold
    }

    pub fn tier(&self, result: &ScanResult) -> Tier {
        if result.is_perfect() {
            Tier::Success
        } else if result.fatal || result.score < self.warn_threshold {
            Tier::Failure
        } else {
            Tier::Warning
        }
    }

    pub fn present(&self, result: &ScanResult) -> StatusView {
        let tier = self.tier(result);
        let score = result.score;
        let (text, icon, color, tooltip) = match tier {
            Tier::Success => (
                format!("Grade: {}", score),
                Some("verified"),
                SUCCESS_COLOR,
                "Ready to Submit!",
            ),
            Tier::Failure => (
                format!("Grade: {}", score),
                Some("alert"),
                FAILURE_COLOR,
                "Submission BLOCKED. Click for details.",
            ),
            Tier::Warning => (
                format!("Grade: {}/100", score),
                None,
                WARNING_COLOR,
                "Passable, but clean it up. Click for details.",
            ),
        };
        StatusView {
            tier,
            score,
            text,
            icon: icon.map(str::to_string),
            color: color.to_string(),
            tooltip: tooltip.to_string(),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(RulePreset::Standard.warn_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u8, fatal: bool) -> ScanResult {
        ScanResult {
            score,
            fatal,
            problems: vec![],
        }
    }

    #[test]
    fn perfect_score_is_success() {
        let view = Presenter::default().present(&ScanResult::clean());
        assert_eq!(view.tier, Tier::Success);
        assert_eq!(view.label(), "$(verified) Grade: 100");
        assert_eq!(view.color, "#50fa7b");
        assert_eq!(view.tooltip, "Ready to Submit!");
    }

    #[test]
    fn fatal_is_failure_even_with_high_score() {
        let view = Presenter::default().present(&result(90, true));
        assert_eq!(view.tier, Tier::Failure);
        assert_eq!(view.label(), "$(alert) Grade: 90");
        assert!(view.tooltip.contains("BLOCKED"));
    }

    #[test]
    fn perfect_score_wins_over_zero_penalty_fatal() {
        assert_eq!(Presenter::default().tier(&result(100, true)), Tier::Success);
    }

    #[test]
    fn below_threshold_is_failure() {
        let presenter = Presenter::new(50);
        assert_eq!(presenter.tier(&result(49, false)), Tier::Failure);
        assert_eq!(presenter.tier(&result(50, false)), Tier::Warning);
    }

    #[test]
    fn threshold_is_configurable() {
        let presenter = Presenter::new(60);
        assert_eq!(presenter.tier(&result(55, false)), Tier::Failure);
        assert_eq!(presenter.tier(&result(60, false)), Tier::Warning);
    }

    #[test]
    fn warning_tier_has_no_icon() {
        let view = Presenter::default().present(&result(85, false));
        assert_eq!(view.tier, Tier::Warning);
        assert_eq!(view.label(), "Grade: 85/100");
        assert_eq!(view.color, "#ffb86c");
    }

    #[test]
    fn view_serializes_camel_case() {
        let view = Presenter::default().present(&result(85, false));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["tier"], "warning");
        assert!(json.get("icon").is_none());
    }
}
