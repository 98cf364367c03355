//! Scan controller: owns the last scan result and turns host triggers into
//! status updates.
//!
//! Hosts (the CLI watcher, the language server) subscribe to their own change
//! notifications and forward each one as a [`ScanTrigger`] together with the
//! text of the currently active document. Every trigger re-runs the analyzer
//! and replaces the stored result wholesale; the most recent scan wins.

use crate::{Analyzer, IssueReport, Presenter, RulePreset, RuleTable, ScanResult, StatusView};

/// Host events that cause a re-scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    ActiveDocumentChanged,
    DocumentChanged,
    ConfigurationChanged,
}

/// What the host should do with its status indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Show(StatusView),
    /// No active document
    Hide,
}

/// Everything a scan depends on besides the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub student_name: String,
    pub rule_table: RuleTable,
    pub warn_threshold: u8,
}

impl Default for Settings {
    fn default() -> Self {
        let preset = RulePreset::default();
        Self {
            student_name: String::new(),
            rule_table: preset.rule_table(),
            warn_threshold: preset.warn_threshold(),
        }
    }
}

pub struct ScanController {
    analyzer: Analyzer,
    presenter: Presenter,
    student_name: String,
    last: Option<ScanResult>,
}

impl ScanController {
    pub fn new(settings: Settings) -> Self {
        Self {
            analyzer: Analyzer::from_table(settings.rule_table),
            presenter: Presenter::new(settings.warn_threshold),
            student_name: settings.student_name,
            last: None,
        }
    }

    /// Swap in new settings. The stored result is kept until the next trigger.
    pub fn reconfigure(&mut self, settings: Settings) {
        log::info!(
            "settings changed (name: {:?}, warn threshold: {})",
            settings.student_name,
            settings.warn_threshold
        );
        *self = Self {
            last: self.last.take(),
            ..Self::new(settings)
        };
    }

    /// Re-scan `document` (the active document's text) in response to `trigger`
    pub fn handle(&mut self, trigger: ScanTrigger, document: Option<&str>) -> StatusUpdate {
        let Some(text) = document else {
            log::debug!("{:?} with no active document; hiding status", trigger);
            self.last = None;
            return StatusUpdate::Hide;
        };
        let result = self.analyzer.analyze(text, &self.student_name);
        log::debug!("{:?}: score {}", trigger, result.score);
        let view = self.presenter.present(&result);
        self.last = Some(result);
        StatusUpdate::Show(view)
    }

    /// Result of the most recent scan, if a document is active
    pub fn current(&self) -> Option<&ScanResult> {
        self.last.as_ref()
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Report for the most recent scan
    pub fn report(&self) -> Option<IssueReport> {
        self.last.as_ref().map(IssueReport::from_result)
    }
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tier;

    #[test]
    fn no_document_hides_and_clears() {
        let mut controller = ScanController::default();
        controller.handle(ScanTrigger::ActiveDocumentChanged, Some("print(1)"));
        assert!(controller.current().is_some());

        let update = controller.handle(ScanTrigger::ActiveDocumentChanged, None);
        assert_eq!(update, StatusUpdate::Hide);
        assert!(controller.current().is_none());
        assert!(controller.report().is_none());
    }

    #[test]
    fn latest_scan_replaces_previous() {
        let mut controller = ScanController::default();
        controller.handle(ScanTrigger::ActiveDocumentChanged, Some("// TODO"));
        assert_eq!(controller.current().unwrap().score, 90);

        let update = controller.handle(ScanTrigger::DocumentChanged, Some("done"));
        let StatusUpdate::Show(view) = update else {
            panic!("expected status");
        };
        assert_eq!(view.tier, Tier::Success);
        assert!(controller.current().unwrap().problems.is_empty());
    }

    #[test]
    fn reconfigure_applies_on_next_trigger() {
        let mut controller = ScanController::default();
        let text = "int main() {}";
        controller.handle(ScanTrigger::ActiveDocumentChanged, Some(text));
        assert_eq!(controller.current().unwrap().score, 100);

        controller.reconfigure(Settings {
            student_name: "Jane Doe".to_string(),
            ..Settings::default()
        });
        assert_eq!(controller.current().unwrap().score, 100);

        controller.handle(ScanTrigger::ConfigurationChanged, Some(text));
        let result = controller.current().unwrap();
        assert_eq!(result.score, 95);
        assert!(result.messages()[0].contains("Jane Doe"));
    }

    #[test]
    fn warn_threshold_follows_settings() {
        let mut controller = ScanController::new(Settings {
            warn_threshold: 95,
            ..Settings::default()
        });
        let StatusUpdate::Show(view) =
            controller.handle(ScanTrigger::DocumentChanged, Some("print(1)"))
        else {
            panic!("expected status");
        };
        assert_eq!(view.tier, Tier::Failure);
        assert_eq!(controller.presenter().warn_threshold(), 95);
    }

    #[test]
    fn report_reflects_last_scan() {
        let mut controller = ScanController::default();
        controller.handle(ScanTrigger::DocumentChanged, Some("fine"));
        assert!(matches!(controller.report(), Some(IssueReport::Perfect { .. })));
        controller.handle(ScanTrigger::DocumentChanged, Some("puts x"));
        assert!(matches!(controller.report(), Some(IssueReport::Issues { .. })));
    }
}
