//! Console reporter with colored output

use crate::analyzer::ScoreCalculator;
use crate::{FileScan, IssueReport, Presenter, Problem, ScanSummary, StatusView, Tier};
use colored::{ColoredString, Colorize};

/// Reporter for terminal output
pub struct ConsoleReporter {
    presenter: Presenter,
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new(presenter: Presenter) -> Self {
        Self {
            presenter,
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Report a single scan
    pub fn report(&self, scan: &FileScan) {
        print!("{}", self.render(scan));
    }

    /// Report multiple scans with summary
    pub fn report_many(&self, scans: &[FileScan], summary: &ScanSummary) {
        for scan in scans {
            self.report(scan);
            println!("{}", "─".repeat(60));
        }
        print!("{}", self.render_summary(summary));
    }

    /// Report in quiet mode (just score)
    pub fn report_quiet(&self, scan: &FileScan) {
        println!("{}", self.render_quiet(scan));
    }

    pub fn render_quiet(&self, scan: &FileScan) -> String {
        let view = self.presenter.present(&scan.result);
        format!(
            "{}: {} ({})",
            scan.file_path.display(),
            scan.result.score,
            self.paint(&view.tier.to_string(), view.tier)
        )
    }

    /// Full report for one file
    pub fn render(&self, scan: &FileScan) -> String {
        let view = self.presenter.present(&scan.result);
        let mut out = String::new();
        out.push('\n');
        out.push_str(&format!(
            "{}\n",
            self.bold(&format!("🎓 Grade Guardian: {}", scan.file_path.display()))
        ));
        out.push_str(&format!("   {}\n", self.status_line(&view)));
        out.push_str(&format!(
            "   {}\n\n",
            self.dim(&format!(
                "{} | {}",
                ScoreCalculator::label(view.score),
                view.tooltip
            ))
        ));

        match IssueReport::from_result(&scan.result) {
            IssueReport::Perfect { message } => {
                out.push_str(&format!("   {}\n", message));
            }
            IssueReport::Issues { header, .. } => {
                out.push_str(&format!("   {}\n", self.bold(&header)));
                for problem in &scan.result.problems {
                    out.push_str(&self.render_problem(problem));
                }
            }
        }
        out.push('\n');
        out
    }

    fn render_problem(&self, problem: &Problem) -> String {
        let location = format!("L{}:{}", problem.location.line, problem.location.column);
        let mut line = format!(
            "   {} {} {} {}\n",
            problem.rule.icon(),
            self.dim(&location),
            problem.message,
            self.dim(&format!("(-{})", problem.deduction))
        );
        if self.verbose {
            line.push_str(&format!("       {} {}\n", self.dim("↳"), self.dim(problem.rule.as_str())));
        }
        line
    }

    fn render_summary(&self, summary: &ScanSummary) -> String {
        let mut out = String::new();
        out.push('\n');
        out.push_str(&format!("{}\n", "═".repeat(60)));
        out.push_str(&format!("{}\n", self.bold("Summary")));
        out.push_str(&format!("{}\n", "═".repeat(60)));
        out.push_str(&format!("   Files scanned:  {}\n", summary.files_scanned));
        out.push_str(&format!("   Average score:  {}\n", summary.average_score));
        out.push_str(&format!("   Perfect files:  {}\n", summary.perfect_files));
        out.push_str(&format!("   Blocked (fatal): {}\n", summary.fatal_files));
        out.push_str(&format!("   Total problems: {}\n\n", summary.total_problems));
        out
    }

    fn status_line(&self, view: &StatusView) -> String {
        let bar = self.create_score_bar(view.score);
        format!("{} {}", self.paint(&bar, view.tier), self.paint(&view.label(), view.tier))
    }

    fn create_score_bar(&self, score: u8) -> String {
        let filled = (score as usize * 20) / 100;
        let empty = 20 - filled;
        format!("[{}{}] {:>3}%", "█".repeat(filled), "░".repeat(empty), score)
    }

    fn paint(&self, s: &str, tier: Tier) -> String {
        if !self.use_colors {
            return s.to_string();
        }
        let colored: ColoredString = match tier {
            Tier::Success => s.green().bold(),
            Tier::Warning => s.truecolor(255, 184, 108),
            Tier::Failure => s.red().bold(),
        };
        colored.to_string()
    }

    fn bold(&self, s: &str) -> String {
        if self.use_colors {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn dim(&self, s: &str) -> String {
        if self.use_colors {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(Presenter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;
    use std::path::PathBuf;

    fn scan(path: &str, text: &str) -> FileScan {
        FileScan {
            file_path: PathBuf::from(path),
            result: analyze(text, ""),
        }
    }

    #[test]
    fn render_lists_problems_with_locations() {
        let reporter = ConsoleReporter::default().without_colors();
        let out = reporter.render(&scan("app.js", "let x;\n// TODO\n"));
        assert!(out.contains("app.js"));
        assert!(out.contains("Current Score: 90/100. Fix these issues:"));
        assert!(out.contains("L2:1 Resolve TODO comments. (-10)"));
        assert!(out.contains("Grade: 90/100"));
    }

    #[test]
    fn render_perfect_file() {
        let reporter = ConsoleReporter::default().without_colors();
        let out = reporter.render(&scan("ok.py", "x = 1\n"));
        assert!(out.contains("Perfect Score!"));
        assert!(out.contains("$(verified) Grade: 100"));
    }

    #[test]
    fn verbose_shows_rule_ids() {
        let reporter = ConsoleReporter::default().without_colors().verbose();
        let out = reporter.render(&scan("a.c", "printf(\"x\");"));
        assert!(out.contains("debug-print"));
    }

    #[test]
    fn quiet_line_has_path_score_and_tier() {
        let reporter = ConsoleReporter::default().without_colors();
        let line = reporter.render_quiet(&scan("bad.js", "f('/etc/passwd/')"));
        assert_eq!(line, "bad.js: 60 (failure)");
    }

    #[test]
    fn summary_has_counts() {
        let reporter = ConsoleReporter::default().without_colors();
        let scans = vec![scan("a.js", "x"), scan("b.js", "// TODO")];
        let out = reporter.render_summary(&ScanSummary::from_scans(&scans));
        assert!(out.contains("Files scanned:  2"));
        assert!(out.contains("Average score:  95"));
    }

    #[test]
    fn score_bar_width_is_constant() {
        let reporter = ConsoleReporter::default();
        for score in [0u8, 37, 100] {
            let bar = reporter.create_score_bar(score);
            assert_eq!(bar.chars().filter(|c| *c == '█' || *c == '░').count(), 20);
        }
    }
}
