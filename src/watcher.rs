//! File system watcher for watch mode

use crate::config::CONFIG_FILENAME;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

const DEBOUNCE_MS: u64 = 300;

/// A debounced change relevant to scanning
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum WatchEvent {
    /// A source file was created or modified
    Document(PathBuf),
    /// A config file was created or modified
    Configuration,
}

/// Watches a file or directory for source and config changes. Dropping the
/// watcher unsubscribes from the file system.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<notify::Event>>,
    extensions: Vec<String>,
}

fn is_create_or_modify(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

impl DocumentWatcher {
    /// Start watching the given path (file or directory)
    pub fn watch(path: &Path, extensions: &[&str]) -> notify::Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_millis(DEBOUNCE_MS)),
        )?;

        if path.is_dir() {
            watcher.watch(path, RecursiveMode::Recursive)?;
        } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            watcher.watch(parent, RecursiveMode::Recursive)?;
        } else {
            watcher.watch(Path::new("."), RecursiveMode::Recursive)?;
        }
        log::info!("watching {}", path.display());

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        })
    }

    /// Check if the path is a file we scan
    pub fn is_source_file(p: &Path, extensions: &[String]) -> bool {
        if p.components().any(|c| {
            let c = c.as_os_str();
            c == "node_modules" || c == ".git" || c == "target"
        }) {
            return false;
        }
        p.extension()
            .and_then(|e| e.to_str())
            .map(|ext| extensions.iter().any(|x| x == ext))
            .unwrap_or(false)
    }

    fn is_config_file(p: &Path) -> bool {
        p.file_name().and_then(|n| n.to_str()) == Some(CONFIG_FILENAME)
    }

    /// Collect relevant changes from an event
    fn events_from(&self, event: &notify::Event) -> Vec<WatchEvent> {
        if !is_create_or_modify(&event.kind) {
            return vec![];
        }
        event
            .paths
            .iter()
            .filter_map(|p| {
                if Self::is_config_file(p) {
                    Some(WatchEvent::Configuration)
                } else if Self::is_source_file(p, &self.extensions) {
                    Some(WatchEvent::Document(p.clone()))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Wait for the next batch of changes (debounced). Blocks until at least
    /// one change, then drains for DEBOUNCE_MS. Configuration changes sort
    /// after document changes.
    pub fn next_changes(&self) -> Vec<WatchEvent> {
        let mut all = BTreeSet::new();

        match self.receiver.recv_timeout(Duration::from_secs(3600)) {
            Ok(Ok(event)) => all.extend(self.events_from(&event)),
            Ok(Err(e)) => {
                log::warn!("watch error: {}", e);
                return vec![];
            }
            Err(_) => return vec![],
        }

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS));
        while let Ok(ev) = self.receiver.try_recv() {
            if let Ok(event) = ev {
                all.extend(self.events_from(&event));
            }
        }

        all.into_iter().collect()
    }
}
