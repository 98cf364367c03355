//! Config schema and deserialization

use super::ConfigError;
use crate::controller::Settings;
use crate::{RuleId, RulePreset, RuleTable};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Shorthand rule switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleToggle {
    On,
    /// Disable the rule entirely
    Off,
}

/// Per-rule adjustments; unset fields keep the preset's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleOverride {
    #[serde(default)]
    pub penalty: Option<u8>,
    #[serde(default)]
    pub fatal: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Value of an entry in `rules`: `"off"`, `"on"` or `{ "penalty": 5 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleSetting {
    Toggle(RuleToggle),
    Custom(RuleOverride),
}

impl RuleSetting {
    fn apply(self, rule: RuleId, table: &mut RuleTable) {
        match self {
            RuleSetting::Toggle(RuleToggle::On) => table.set_enabled(rule, true),
            RuleSetting::Toggle(RuleToggle::Off) => table.set_enabled(rule, false),
            RuleSetting::Custom(o) => {
                if let Some(penalty) = o.penalty {
                    table.set_penalty(rule, penalty);
                }
                if let Some(fatal) = o.fatal {
                    table.set_fatal(rule, fatal);
                }
                if let Some(enabled) = o.enabled {
                    table.set_enabled(rule, enabled);
                }
            }
        }
    }
}

/// Per-path override configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverride {
    /// Glob patterns this override applies to
    pub files: Vec<String>,

    /// Name expected in the header of matched files
    #[serde(default)]
    pub student_name: Option<String>,

    /// Rule adjustments for matched files
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
}

/// Root config structure for .gradeguardianrc.json
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default)]
    pub extends: Option<String>,

    /// Name that must appear in the first lines of every file. Default: ""
    #[serde(default)]
    pub student_name: Option<String>,

    /// Canonical rule table to start from. Default: standard
    #[serde(default)]
    pub preset: Option<RulePreset>,

    /// Scores below this are shown as blocked. Default: from preset
    #[serde(default)]
    pub warn_threshold: Option<u8>,

    /// Minimum score for the CLI to exit successfully
    #[serde(default)]
    pub threshold: Option<u8>,

    /// Treat `except: pass` as an empty handler. Default: true
    #[serde(default)]
    pub except_pass: Option<bool>,

    /// Per-rule overrides. Key is the rule id in kebab-case.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,

    /// Glob patterns for files/directories to exclude from directory scans
    #[serde(default)]
    pub ignore: Vec<String>,

    /// File extensions to scan in directories (default: common source types)
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Per-path configuration overrides
    #[serde(default)]
    pub overrides: Vec<ConfigOverride>,
}

const DEFAULT_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cs", "go", "h", "hpp", "html", "java", "js", "jsx", "kt", "php", "py",
    "rb", "rs", "swift", "ts", "tsx",
];

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        cli_name: Option<String>,
        cli_preset: Option<RulePreset>,
        cli_threshold: Option<u8>,
    ) -> Self {
        if cli_name.is_some() {
            self.student_name = cli_name;
        }
        if cli_preset.is_some() {
            self.preset = cli_preset;
        }
        if cli_threshold.is_some() {
            self.threshold = cli_threshold;
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        if self.student_name.is_none() {
            self.student_name = base.student_name;
        }
        if self.preset.is_none() {
            self.preset = base.preset;
        }
        if self.warn_threshold.is_none() {
            self.warn_threshold = base.warn_threshold;
        }
        if self.threshold.is_none() {
            self.threshold = base.threshold;
        }
        if self.except_pass.is_none() {
            self.except_pass = base.except_pass;
        }
        if self.extends.is_none() {
            self.extends = base.extends;
        }

        // Merge rules (this config takes precedence)
        for (rule, setting) in base.rules {
            self.rules.entry(rule).or_insert(setting);
        }

        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;

        if self.extensions.is_empty() {
            self.extensions = base.extensions;
        }

        // Prepend base overrides
        let mut all_overrides = base.overrides;
        all_overrides.append(&mut self.overrides);
        self.overrides = all_overrides;
    }

    pub fn preset(&self) -> RulePreset {
        self.preset.unwrap_or_default()
    }

    /// Scan settings ignoring per-path overrides
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        self.build_settings(None)
    }

    /// Scan settings for a specific file, applying matching overrides in order
    pub fn settings_for_file(&self, file_path: &Path) -> Result<Settings, ConfigError> {
        self.build_settings(Some(file_path))
    }

    fn build_settings(&self, file_path: Option<&Path>) -> Result<Settings, ConfigError> {
        let preset = self.preset();
        let mut table = preset.rule_table();
        if let Some(on) = self.except_pass {
            table.set_except_pass(on);
        }
        apply_rules(&self.rules, &mut table)?;

        let mut student_name = self.student_name.clone().unwrap_or_default();
        if let Some(path) = file_path {
            for override_cfg in &self.overrides {
                if Self::matches_override(path, &override_cfg.files) {
                    if let Some(ref name) = override_cfg.student_name {
                        student_name = name.clone();
                    }
                    apply_rules(&override_cfg.rules, &mut table)?;
                }
            }
        }

        Ok(Settings {
            student_name,
            rule_table: table,
            warn_threshold: self.warn_threshold.unwrap_or(preset.warn_threshold()),
        })
    }

    /// Check if a file path matches any of the override patterns
    fn matches_override(file_path: &Path, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| match globset::Glob::new(pattern) {
            Ok(glob) => glob.compile_matcher().is_match(file_path),
            Err(e) => {
                log::warn!("Ignoring invalid override pattern {}: {}", pattern, e);
                false
            }
        })
    }

    /// Extensions scanned in directory mode, without the leading dot
    pub fn get_extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.to_vec()
        } else {
            self.extensions
                .iter()
                .map(|s| s.trim_start_matches('.'))
                .collect()
        }
    }
}

fn apply_rules(
    rules: &BTreeMap<String, RuleSetting>,
    table: &mut RuleTable,
) -> Result<(), ConfigError> {
    for (key, setting) in rules {
        let rule: RuleId = key.parse()?;
        setting.apply(rule, table);
    }
    Ok(())
}
