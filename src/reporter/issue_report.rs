//! On-demand report shown when the user activates the status indicator

use crate::ScanResult;
use serde::Serialize;

pub const PERFECT_MESSAGE: &str = "🎉 Perfect Score! You are ready to submit.";

/// Either a one-shot congratulation or a selectable list of problems
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum IssueReport {
    Perfect { message: String },
    Issues { header: String, items: Vec<String> },
}

impl IssueReport {
    pub fn from_result(result: &ScanResult) -> Self {
        if result.is_perfect() {
            return IssueReport::Perfect {
                message: PERFECT_MESSAGE.to_string(),
            };
        }
        IssueReport::Issues {
            header: format!("Current Score: {}/100. Fix these issues:", result.score),
            items: result
                .problems
                .iter()
                .map(|p| format!("{} {}", p.rule.icon(), p.message))
                .collect(),
        }
    }
}
