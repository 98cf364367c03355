//! Grade Guardian LSP server: live cleanliness score for the active document.

use grade_guardian::config::{find_project_root, load_config, Config};
use grade_guardian::{
    IssueReport, Location, Problem, RulePreset, RuleTable, ScanController, ScanResult, ScanTrigger, Settings,
    StatusUpdate, StatusView,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

const SHOW_REPORT_COMMAND: &str = "gradeGuardian.showReport";
const SOURCE: &str = "grade-guardian";

/// Status indicator update pushed to the client
enum StatusNotification {}

impl Notification for StatusNotification {
    type Params = StatusParams;
    const METHOD: &'static str = "gradeGuardian/status";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum StatusParams {
    Visible(StatusView),
    Hidden { hidden: bool },
}

impl From<StatusUpdate> for StatusParams {
    fn from(update: StatusUpdate) -> Self {
        match update {
            StatusUpdate::Show(view) => StatusParams::Visible(view),
            StatusUpdate::Hide => StatusParams::Hidden { hidden: true },
        }
    }
}

/// The `gradeGuardian` section of the client's settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditorSettings {
    #[serde(default)]
    student_name: Option<String>,
    #[serde(default)]
    preset: Option<RulePreset>,
    #[serde(default)]
    warn_threshold: Option<u8>,
}

impl EditorSettings {
    /// Accepts either `{ "gradeGuardian": {...} }` or the bare section
    fn from_value(value: &serde_json::Value) -> Option<Self> {
        let section = value.get("gradeGuardian").unwrap_or(value);
        match serde_json::from_value(section.clone()) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("ignoring malformed gradeGuardian settings: {}", e);
                None
            }
        }
    }

    /// Layer editor settings over the file config. Editor values win.
    fn apply(&self, config: Config) -> Config {
        let mut config = config.merge_with_cli(self.student_name.clone(), self.preset, None);
        if self.warn_threshold.is_some() {
            config.warn_threshold = self.warn_threshold;
        }
        config
    }
}

struct State {
    controller: ScanController,
    settings: Settings,
    documents: HashMap<Url, String>,
    active: Option<Url>,
    root: Option<PathBuf>,
    config: Config,
    editor: EditorSettings,
}

impl State {
    fn new() -> Self {
        Self {
            controller: ScanController::default(),
            settings: Settings::default(),
            documents: HashMap::new(),
            active: None,
            root: None,
            config: Config::default(),
            editor: EditorSettings::default(),
        }
    }

    fn reload_config(&mut self) -> Result<(), grade_guardian::config::ConfigError> {
        let work_dir = self
            .root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        self.config = load_config(&work_dir, None)?;
        Ok(())
    }

    /// Re-scan the active document and return the status plus its diagnostics
    fn rescan(&mut self, trigger: ScanTrigger) -> (StatusUpdate, Option<(Url, Vec<Diagnostic>)>) {
        let config = self.editor.apply(self.config.clone());
        let settings = match self.active.as_ref().and_then(|u| u.to_file_path().ok()) {
            Some(path) => config.settings_for_file(&path),
            None => config.settings(),
        };
        match settings {
            Ok(settings) if settings != self.settings => {
                self.settings = settings.clone();
                self.controller.reconfigure(settings);
            }
            Ok(_) => {}
            Err(e) => log::warn!("keeping previous settings: {}", e),
        }

        let text = self
            .active
            .as_ref()
            .and_then(|uri| self.documents.get(uri))
            .map(String::as_str);
        let update = self.controller.handle(trigger, text);

        let diagnostics = match (&self.active, text, self.controller.current()) {
            (Some(uri), Some(text), Some(result)) => Some((
                uri.clone(),
                result_to_diagnostics(text, result, &self.settings.rule_table),
            )),
            _ => None,
        };
        (update, diagnostics)
    }
}

struct Backend {
    client: Client,
    state: Mutex<State>,
}

/// LSP position of a 1-indexed line/char-column location. Columns are
/// counted in UTF-16 code units.
fn utf16_range(text: &str, location: &Location) -> Range {
    let line = location.line.saturating_sub(1);
    let chars_before = location.column.saturating_sub(1);
    let mut rest = text
        .split('\n')
        .nth(line)
        .unwrap_or_default()
        .chars();
    let start: usize = rest
        .by_ref()
        .take(chars_before)
        .map(char::len_utf16)
        .sum();
    let width = rest.next().map(char::len_utf16).unwrap_or(1);
    Range::new(
        Position::new(line as u32, start as u32),
        Position::new(line as u32, (start + width) as u32),
    )
}

fn problem_to_diagnostic(text: &str, problem: &Problem, fatal: bool) -> Diagnostic {
    Diagnostic {
        range: utf16_range(text, &problem.location),
        severity: Some(if fatal {
            DiagnosticSeverity::ERROR
        } else {
            DiagnosticSeverity::WARNING
        }),
        code: Some(NumberOrString::String(problem.rule.to_string())),
        code_description: None,
        source: Some(SOURCE.to_string()),
        message: format!("{} (-{})", problem.message, problem.deduction),
        related_information: None,
        tags: None,
        data: None,
    }
}

fn result_to_diagnostics(text: &str, result: &ScanResult, table: &RuleTable) -> Vec<Diagnostic> {
    result
        .problems
        .iter()
        .map(|p| {
            let fatal = result.fatal && table.entry(p.rule).map(|e| e.fatal).unwrap_or(false);
            problem_to_diagnostic(text, p, fatal)
        })
        .collect()
}

impl Backend {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn publish(&self, update: StatusUpdate, diagnostics: Option<(Url, Vec<Diagnostic>)>) {
        if let Some((uri, diagnostics)) = diagnostics {
            self.client.publish_diagnostics(uri, diagnostics, None).await;
        }
        self.client
            .send_notification::<StatusNotification>(update.into())
            .await;
    }

    async fn rescan(&self, trigger: ScanTrigger) {
        let (update, diagnostics) = self.state().rescan(trigger);
        self.publish(update, diagnostics).await;
    }

    async fn show_report(&self) {
        let report = self.state().controller.report();
        match report {
            None => {
                self.client
                    .show_message(MessageType::INFO, "No active document to grade.")
                    .await;
            }
            Some(IssueReport::Perfect { message }) => {
                self.client.show_message(MessageType::INFO, message).await;
            }
            Some(IssueReport::Issues { header, items }) => {
                let actions = items
                    .into_iter()
                    .map(|title| MessageActionItem {
                        title,
                        properties: HashMap::new(),
                    })
                    .collect();
                if let Err(e) = self
                    .client
                    .show_message_request(MessageType::WARNING, header, Some(actions))
                    .await
                {
                    log::warn!("showMessageRequest failed: {}", e);
                }
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        let root = params
            .root_uri
            .as_ref()
            .and_then(|u| u.to_file_path().ok())
            .or_else(|| {
                std::env::current_dir()
                    .ok()
                    .and_then(|cwd| find_project_root(&cwd))
            });
        {
            let mut state = self.state();
            state.root = root;
            if let Some(editor) = params
                .initialization_options
                .as_ref()
                .and_then(EditorSettings::from_value)
            {
                state.editor = editor;
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![SHOW_REPORT_COMMAND.to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "grade-guardian-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let loaded = self.state().reload_config();
        match loaded {
            Ok(()) => {
                self.client
                    .log_message(MessageType::INFO, "Grade Guardian LSP initialized")
                    .await;
            }
            Err(e) => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Grade Guardian config not loaded: {}", e),
                    )
                    .await;
            }
        }
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        {
            let mut state = self.state();
            let doc = params.text_document;
            state.documents.insert(doc.uri.clone(), doc.text);
            state.active = Some(doc.uri);
        }
        self.rescan(ScanTrigger::ActiveDocumentChanged).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let trigger = {
            let mut state = self.state();
            let uri = params.text_document.uri;
            // Full sync: the last change carries the whole text
            if let Some(change) = params.content_changes.into_iter().last() {
                state.documents.insert(uri.clone(), change.text);
            }
            if state.active.as_ref() == Some(&uri) {
                ScanTrigger::DocumentChanged
            } else {
                state.active = Some(uri);
                ScanTrigger::ActiveDocumentChanged
            }
        };
        self.rescan(trigger).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        let was_active = {
            let mut state = self.state();
            state.documents.remove(&uri);
            if state.active.as_ref() == Some(&uri) {
                state.active = None;
                true
            } else {
                false
            }
        };
        self.client.publish_diagnostics(uri, vec![], None).await;
        if was_active {
            self.rescan(ScanTrigger::ActiveDocumentChanged).await;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let reload = {
            let mut state = self.state();
            if let Some(editor) = EditorSettings::from_value(&params.settings) {
                state.editor = editor;
            }
            state.reload_config()
        };
        if let Err(e) = reload {
            self.client
                .log_message(
                    MessageType::WARNING,
                    format!("Grade Guardian config not reloaded: {}", e),
                )
                .await;
        }
        self.rescan(ScanTrigger::ConfigurationChanged).await;
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> LspResult<Option<serde_json::Value>> {
        if params.command == SHOW_REPORT_COMMAND {
            self.show_report().await;
        } else {
            log::warn!("unknown command {}", params.command);
        }
        Ok(None)
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| Backend {
        client,
        state: Mutex::new(State::new()),
    });
    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use grade_guardian::{RuleId, Tier};

    fn problem(rule: RuleId, line: usize, column: usize) -> Problem {
        Problem {
            rule,
            message: "msg".to_string(),
            deduction: 10,
            location: Location::new(line, column),
        }
    }

    #[test]
    fn diagnostic_is_zero_indexed() {
        let text = "a\nb\n    // TODO\n";
        let d = problem_to_diagnostic(text, &problem(RuleId::UnresolvedMarker, 3, 5), false);
        assert_eq!(d.range.start, Position::new(2, 4));
        assert_eq!(d.range.end, Position::new(2, 5));
        assert_eq!(d.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(
            d.code,
            Some(NumberOrString::String("unresolved-marker".to_string()))
        );
        assert_eq!(d.source.as_deref(), Some(SOURCE));
        assert_eq!(d.message, "msg (-10)");
    }

    #[test]
    fn columns_after_astral_chars_use_utf16_units() {
        let text = "// 🎓 notes\nlet s = \"😀\"; console.log(s)";
        let result = grade_guardian::analyze(text, "");
        let location = result.problems[0].location;
        assert_eq!((location.line, location.column), (2, 14));

        let d = problem_to_diagnostic(text, &result.problems[0], false);
        assert_eq!(d.range.start, Position::new(1, 14));
        assert_eq!(d.range.end, Position::new(1, 15));
    }

    #[test]
    fn location_past_text_is_clamped_to_line() {
        let d = problem_to_diagnostic("", &problem(RuleId::MissingHeader, 1, 1), false);
        assert_eq!(d.range, Range::new(Position::new(0, 0), Position::new(0, 1)));
    }

    #[test]
    fn only_fatal_rule_is_an_error() {
        let text = "let p = \"C:\\\\x\"; // TODO";
        let result = grade_guardian::analyze(text, "");
        let diagnostics = result_to_diagnostics(text, &result, &RuleTable::standard());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostics[1].severity, Some(DiagnosticSeverity::WARNING));
    }

    #[test]
    fn editor_settings_from_section() {
        let value = serde_json::json!({
            "gradeGuardian": { "studentName": "Jane Doe", "preset": "gentle", "warnThreshold": 70 }
        });
        let settings = EditorSettings::from_value(&value).unwrap();
        assert_eq!(settings.student_name.as_deref(), Some("Jane Doe"));
        assert_eq!(settings.preset, Some(RulePreset::Gentle));
        assert_eq!(settings.warn_threshold, Some(70));
    }

    #[test]
    fn editor_settings_override_config() {
        let editor = EditorSettings {
            student_name: Some("Jane Doe".to_string()),
            preset: None,
            warn_threshold: Some(80),
        };
        let settings = editor.apply(Config::default()).settings().unwrap();
        assert_eq!(settings.student_name, "Jane Doe");
        assert_eq!(settings.warn_threshold, 80);
    }

    #[test]
    fn malformed_settings_are_ignored() {
        let value = serde_json::json!({ "gradeGuardian": { "warnThreshold": "high" } });
        assert!(EditorSettings::from_value(&value).is_none());
    }

    #[test]
    fn status_params_serialize() {
        let hidden = serde_json::to_value(StatusParams::from(StatusUpdate::Hide)).unwrap();
        assert_eq!(hidden, serde_json::json!({ "hidden": true }));

        let view = grade_guardian::Presenter::default().present(&ScanResult::clean());
        let visible = serde_json::to_value(StatusParams::from(StatusUpdate::Show(view))).unwrap();
        assert_eq!(visible["text"], "Grade: 100");
        assert_eq!(visible["tier"], serde_json::json!(Tier::Success));
    }

    #[test]
    fn state_rescan_tracks_active_document() {
        let mut state = State::new();
        let uri = Url::parse("file:///tmp/hw1.py").unwrap();
        state.documents.insert(uri.clone(), "print(1)".to_string());
        state.active = Some(uri.clone());

        let (update, diagnostics) = state.rescan(ScanTrigger::ActiveDocumentChanged);
        let StatusUpdate::Show(view) = update else {
            panic!("expected status");
        };
        assert_eq!(view.score, 90);
        let (published, list) = diagnostics.unwrap();
        assert_eq!(published, uri);
        assert_eq!(list.len(), 1);

        state.active = None;
        let (update, diagnostics) = state.rescan(ScanTrigger::ActiveDocumentChanged);
        assert_eq!(update, StatusUpdate::Hide);
        assert!(diagnostics.is_none());
    }

    #[test]
    fn state_applies_editor_name() {
        let mut state = State::new();
        let uri = Url::parse("file:///tmp/hw2.py").unwrap();
        state.documents.insert(uri.clone(), "x = 1\n".to_string());
        state.active = Some(uri);
        state.editor.student_name = Some("Jane Doe".to_string());

        let (update, _) = state.rescan(ScanTrigger::ConfigurationChanged);
        let StatusUpdate::Show(view) = update else {
            panic!("expected status");
        };
        assert_eq!(view.score, 95);
    }
}
