//! JSON reporter for machine-readable output

use crate::{FileScan, Presenter, ScanSummary, StatusView};
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    presenter: Presenter,
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new(presenter: Presenter) -> Self {
        Self {
            presenter,
            pretty: false,
        }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Report a single scan as JSON
    pub fn report(&self, scan: &FileScan) -> String {
        self.to_json(&self.entry(scan), "{}")
    }

    /// Report multiple scans with summary
    pub fn report_with_summary(&self, scans: &[FileScan], summary: &ScanSummary) -> String {
        let output = JsonOutput {
            results: scans.iter().map(|s| self.entry(s)).collect(),
            summary,
        };
        self.to_json(&output, "{}")
    }

    fn entry<'a>(&self, scan: &'a FileScan) -> JsonEntry<'a> {
        JsonEntry {
            scan,
            status: self.presenter.present(&scan.result),
        }
    }

    fn to_json<T: Serialize>(&self, value: &T, fallback: &str) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| {
            log::warn!("failed to serialize report: {}", e);
            fallback.to_string()
        })
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new(Presenter::default())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEntry<'a> {
    #[serde(flatten)]
    scan: &'a FileScan,
    status: StatusView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    results: Vec<JsonEntry<'a>>,
    summary: &'a ScanSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;
    use std::path::PathBuf;

    fn make_scan(path: &str, text: &str) -> FileScan {
        FileScan {
            file_path: PathBuf::from(path),
            result: analyze(text, ""),
        }
    }

    #[test]
    fn single_report_has_result_and_status() {
        let reporter = JsonReporter::default();
        let json = reporter.report(&make_scan("a.js", "console.log(1)"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["filePath"], "a.js");
        assert_eq!(value["score"], 90);
        assert_eq!(value["fatal"], false);
        assert_eq!(value["problems"][0]["rule"], "debug-print");
        assert_eq!(value["problems"][0]["location"]["line"], 1);
        assert_eq!(value["status"]["tier"], "warning");
    }

    #[test]
    fn summary_report_lists_all_files() {
        let reporter = JsonReporter::default().pretty();
        let scans = vec![make_scan("a.js", "x"), make_scan("b.js", "'/usr/bin/x'")];
        let summary = ScanSummary::from_scans(&scans);
        let json = reporter.report_with_summary(&scans, &summary);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["results"][1]["status"]["tier"], "failure");
        assert_eq!(value["summary"]["filesScanned"], 2);
        assert_eq!(value["summary"]["fatalFiles"], 1);
    }
}
