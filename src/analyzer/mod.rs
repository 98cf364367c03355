//! Analyzer module - rule table, rules and scoring

pub mod engine;
pub mod rules;
pub mod scoring;
pub mod table;

pub use engine::Analyzer;
pub use scoring::ScoreCalculator;
pub use table::{RuleEntry, RulePreset, RuleTable};
