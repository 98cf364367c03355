//! Grade Guardian: code cleanliness scanner CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use grade_guardian::config::{
    build_ignore_set, is_ignored, load_config, Config, CONFIG_FILENAME,
};
use grade_guardian::reporter::{ConsoleReporter, JsonReporter};
use grade_guardian::watcher::{DocumentWatcher, WatchEvent};
use grade_guardian::{
    Analyzer, FileScan, Presenter, RulePreset, ScanController, ScanSummary, ScanTrigger,
    StatusUpdate,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Grade Guardian: code cleanliness scanner
#[derive(Parser, Debug)]
#[command(name = "grade-guardian")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source file or directory to scan (omit when using a subcommand)
    #[arg(required = true)]
    path: Option<PathBuf>,

    /// Name that must appear in the first 10 lines (overrides studentName)
    #[arg(long, short)]
    name: Option<String>,

    /// Rule weighting: standard or gentle
    #[arg(long, value_name = "PRESET")]
    preset: Option<RulePreset>,

    /// Output format as JSON
    #[arg(long, short)]
    json: bool,

    /// Minimum score threshold (exit 1 if any file is below it or blocked)
    #[arg(long, short)]
    threshold: Option<u8>,

    /// Quiet mode (one line per file)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output (rule ids, debug logging)
    #[arg(long, short)]
    verbose: bool,

    /// Path to config file (default: search .gradeguardianrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch for file changes and re-scan
    #[arg(long)]
    watch: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Scan directory files in parallel (default for more than 10 files)
    #[arg(long)]
    parallel: bool,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .gradeguardianrc.json with sensible defaults
    Init {
        /// Name expected in every file header
        #[arg(long)]
        name: Option<String>,

        /// Rule weighting: standard or gentle
        #[arg(long)]
        preset: Option<RulePreset>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Some(ref cmd) = args.command {
        match cmd {
            Commands::Init { name, preset, dir } => {
                return run_init(name.clone(), *preset, dir.as_deref());
            }
        }
    }

    let path = args
        .path
        .clone()
        .context("a path is required when not using a subcommand")?;

    if args.watch {
        return run_watch(&args, &path);
    }

    let work_dir = work_dir_for(&path);
    let config = load_config(work_dir, args.config.as_deref())?.merge_with_cli(
        args.name.clone(),
        args.preset,
        args.threshold,
    );

    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let files = collect_source_files(&path, ignore_set.as_ref(), &config.get_extensions())?;
    if files.is_empty() {
        eprintln!("{}: No source files found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }

    if let Some(jobs) = args.jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            log::warn!("could not size the thread pool to {} jobs: {}", jobs, e);
        }
    }

    let use_parallel = args.parallel || files.len() > 10;
    let (scans, had_errors) = if use_parallel {
        scan_files_parallel(&files, &config, args.quiet)
    } else {
        scan_files_sequential(&files, &config, args.quiet)
    };

    if scans.is_empty() {
        eprintln!("{}: All files failed to scan", "Error".red());
        return Ok(ExitCode::from(2));
    }

    let summary = ScanSummary::from_scans(&scans);
    let presenter = Presenter::new(config.settings()?.warn_threshold);

    if args.json {
        let reporter = JsonReporter::new(presenter).pretty();
        if scans.len() == 1 {
            println!("{}", reporter.report(&scans[0]));
        } else {
            println!("{}", reporter.report_with_summary(&scans, &summary));
        }
    } else if args.quiet {
        let reporter = ConsoleReporter::new(presenter);
        for scan in &scans {
            reporter.report_quiet(scan);
        }
    } else {
        let mut reporter = ConsoleReporter::new(presenter);
        if args.verbose {
            reporter = reporter.verbose();
        }
        if scans.len() == 1 {
            reporter.report(&scans[0]);
        } else {
            reporter.report_many(&scans, &summary);
        }
    }

    if let Some(threshold) = config.threshold {
        let failing: Vec<&FileScan> = scans
            .iter()
            .filter(|s| s.result.fatal || s.result.score < threshold)
            .collect();
        if !failing.is_empty() {
            if !args.quiet && !args.json {
                for scan in &failing {
                    eprintln!(
                        "{}: {} scored {}{} (threshold {})",
                        "Failed".red().bold(),
                        scan.file_path.display(),
                        scan.result.score,
                        if scan.result.fatal { ", blocked" } else { "" },
                        threshold
                    );
                }
            }
            return Ok(ExitCode::from(1));
        }
    }

    if had_errors {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn work_dir_for(path: &Path) -> &Path {
    if path.is_file() {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    } else {
        path
    }
}

fn run_init(name: Option<String>, preset: Option<RulePreset>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let preset = preset.unwrap_or_default();
    let name = name.unwrap_or_default();

    let json = format!(
        r#"{{
  "studentName": {},
  "preset": "{}",
  "warnThreshold": {},
  "exceptPass": true,
  "rules": {{
    "absolute-path": {{ "penalty": 40, "fatal": true }},
    "deep-indentation": "on"
  }},
  "ignore": [
    "**/node_modules/**",
    "**/target/**",
    "**/*.min.js"
  ]
}}
"#,
        serde_json::to_string(&name)?,
        preset,
        preset.warn_threshold()
    );

    std::fs::write(&config_path, json)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {} with preset={}",
        "Done".green().bold(),
        config_path.display(),
        preset
    );
    Ok(ExitCode::SUCCESS)
}

fn run_watch(args: &Args, path: &Path) -> Result<ExitCode> {
    let work_dir = work_dir_for(path).to_path_buf();
    let load = |work_dir: &Path| -> Result<Config> {
        Ok(load_config(work_dir, args.config.as_deref())?.merge_with_cli(
            args.name.clone(),
            args.preset,
            args.threshold,
        ))
    };

    let mut config = load(&work_dir)?;
    let extensions: Vec<String> = config
        .get_extensions()
        .iter()
        .map(|e| e.to_string())
        .collect();
    let ext_refs: Vec<&str> = extensions.iter().map(String::as_str).collect();

    let mut active: Option<PathBuf> = path.is_file().then(|| path.to_path_buf());
    let mut settings = match active {
        Some(ref file) => config.settings_for_file(file)?,
        None => config.settings()?,
    };
    let mut controller = ScanController::new(settings.clone());

    let watcher =
        DocumentWatcher::watch(path, &ext_refs).context("Failed to create file watcher")?;
    eprintln!("{}: Watching for changes... (Ctrl+C to stop)", "Info".blue());

    if let Some(ref file) = active {
        let text = std::fs::read_to_string(file).ok();
        let update = controller.handle(ScanTrigger::ActiveDocumentChanged, text.as_deref());
        print_update(&controller, &update, file, args.quiet);
    }

    loop {
        for event in watcher.next_changes() {
            let trigger = match event {
                WatchEvent::Configuration => {
                    match load(&work_dir) {
                        Ok(fresh) => config = fresh,
                        Err(e) => {
                            log::warn!("keeping previous config: {:#}", e);
                            continue;
                        }
                    }
                    ScanTrigger::ConfigurationChanged
                }
                WatchEvent::Document(changed) => {
                    if let Some(ref set) = config_ignore_set(&config) {
                        if is_ignored(&changed, set) {
                            continue;
                        }
                    }
                    let trigger = if active.as_ref() == Some(&changed) {
                        ScanTrigger::DocumentChanged
                    } else {
                        ScanTrigger::ActiveDocumentChanged
                    };
                    active = Some(changed);
                    trigger
                }
            };

            let Some(ref file) = active else {
                continue;
            };

            match config.settings_for_file(file) {
                Ok(fresh) if fresh != settings => {
                    settings = fresh;
                    controller.reconfigure(settings.clone());
                }
                Ok(_) => {}
                Err(e) => log::warn!("invalid settings for {}: {}", file.display(), e),
            }

            let text = std::fs::read_to_string(file).ok();
            let update = controller.handle(trigger, text.as_deref());
            print_update(&controller, &update, file, args.quiet);
        }
    }
}

fn config_ignore_set(config: &Config) -> Option<globset::GlobSet> {
    if config.ignore.is_empty() {
        return None;
    }
    build_ignore_set(&config.ignore)
        .map_err(|e| log::warn!("{}", e))
        .ok()
}

fn print_update(controller: &ScanController, update: &StatusUpdate, file: &Path, quiet: bool) {
    match (update, controller.current()) {
        (StatusUpdate::Show(_), Some(result)) => {
            let scan = FileScan {
                file_path: file.to_path_buf(),
                result: result.clone(),
            };
            let reporter = ConsoleReporter::new(*controller.presenter());
            if quiet {
                reporter.report_quiet(&scan);
            } else {
                reporter.report(&scan);
            }
        }
        _ => eprintln!(
            "{}: {} is no longer readable; status hidden",
            "Info".blue(),
            file.display()
        ),
    }
}

/// Collect files to scan. An explicit file is always scanned; directories
/// are walked for files with a configured extension.
fn collect_source_files(
    path: &Path,
    ignore_set: Option<&globset::GlobSet>,
    extensions: &[&str],
) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if let Some(set) = ignore_set {
            if is_ignored(path, set) {
                return Ok(vec![]);
            }
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let extensions: Vec<String> = extensions.iter().map(|e| e.to_string()).collect();
    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if entry.file_type().is_file() && DocumentWatcher::is_source_file(file_path, &extensions)
        {
            if let Some(set) = ignore_set {
                if is_ignored(file_path, set) {
                    continue;
                }
            }
            files.push(file_path.to_path_buf());
        }
    }

    // Sort for consistent output
    files.sort();

    Ok(files)
}

fn scan_one(file: &Path, config: &Config) -> Result<FileScan> {
    let settings = config.settings_for_file(file)?;
    Analyzer::from_table(settings.rule_table).analyze_file(file, &settings.student_name)
}

fn report_failure(file: &Path, e: &anyhow::Error, quiet: bool) {
    if !quiet {
        eprintln!("{}: Failed to scan {}: {:#}", "Error".red(), file.display(), e);
    }
}

/// Scan files one by one
fn scan_files_sequential(files: &[PathBuf], config: &Config, quiet: bool) -> (Vec<FileScan>, bool) {
    let mut scans = Vec::new();
    let mut had_errors = false;

    for file in files {
        match scan_one(file, config) {
            Ok(scan) => scans.push(scan),
            Err(e) => {
                report_failure(file, &e, quiet);
                had_errors = true;
            }
        }
    }

    (scans, had_errors)
}

/// Scan files in parallel
fn scan_files_parallel(files: &[PathBuf], config: &Config, quiet: bool) -> (Vec<FileScan>, bool) {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    let had_errors = AtomicBool::new(false);

    let scans: Vec<_> = files
        .par_iter()
        .filter_map(|file| match scan_one(file, config) {
            Ok(scan) => Some(scan),
            Err(e) => {
                had_errors.store(true, Ordering::Relaxed);
                report_failure(file, &e, quiet);
                None
            }
        })
        .collect();

    (scans, had_errors.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_source_files_filters_extensions() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1").unwrap();
        std::fs::write(dir.path().join("b.md"), "# notes").unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules").join("c.js"), "x").unwrap();

        let files = collect_source_files(dir.path(), None, &["py", "js"]).unwrap();
        assert_eq!(files, vec![dir.path().join("a.py")]);
    }

    #[test]
    fn test_collect_source_files_respects_ignore() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("starter")).unwrap();
        std::fs::write(dir.path().join("starter").join("given.py"), "x").unwrap();
        std::fs::write(dir.path().join("mine.py"), "x").unwrap();

        let set = build_ignore_set(&["**/starter/**".to_string()]).unwrap();
        let files = collect_source_files(dir.path(), Some(&set), &["py"]).unwrap();
        assert_eq!(files, vec![dir.path().join("mine.py")]);
    }

    #[test]
    fn test_explicit_file_ignores_extension_filter() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "x").unwrap();
        let files = collect_source_files(&file, None, &["py"]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_missing_path_is_error() {
        let err = collect_source_files(Path::new("no/such/dir"), None, &["py"]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_work_dir_for_bare_file_name() {
        assert_eq!(work_dir_for(Path::new("missing.py")), Path::new("missing.py"));
    }
}
