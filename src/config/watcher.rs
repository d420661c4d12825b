//! Hot reload of the gateway's TOML file.
//!
//! The file's directory is watched rather than the file, so saves that
//! replace it (write a temporary file, rename it over the original) keep
//! being seen. Events are coalesced until writes settle, and empty or
//! unchanged content never produces an update.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::GatewayConfig;

/// Quiet period after the last file event before the file is read.
const SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Sends a fresh `GatewayConfig` whenever the file on disk changes to a valid one.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Must be called from within a Tokio runtime.
    ///
    /// Updates stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| notify::Error::generic("config path has no file name").add_path(self.path.clone()))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if touches(&event, &file_name) {
                        let _ = event_tx.send(());
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let current = std::fs::read_to_string(&self.path).ok();
        tokio::spawn(reload_on_change(self.path.clone(), event_rx, self.update_tx, current));

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn touches(event: &Event, file_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

async fn reload_on_change(
    path: PathBuf,
    mut events: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<GatewayConfig>,
    mut applied: Option<String>,
) {
    while events.recv().await.is_some() {
        // One save is several events (truncate, write, close, rename).
        loop {
            match tokio::time::timeout(SETTLE_DELAY, events.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Config file unreadable, keeping current configuration");
                continue;
            }
        };
        if content.trim().is_empty() {
            tracing::debug!(path = ?path, "Config file is empty, waiting for content");
            continue;
        }
        if applied.as_deref() == Some(content.as_str()) {
            continue;
        }

        match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = ?path, "Config file change detected, reloading");
                if updates.send(config).is_err() {
                    return;
                }
                applied = Some(content);
            }
            Err(e) => {
                tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const WAIT: Duration = Duration::from_secs(5);
    const QUIET: Duration = Duration::from_millis(1000);

    fn with_cookie(name: &str) -> String {
        format!("[session]\ncookie_name = \"{}\"\n", name)
    }

    async fn next_cookie(rx: &mut mpsc::UnboundedReceiver<GatewayConfig>) -> Option<String> {
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .ok()
            .flatten()
            .map(|config| config.session.cookie_name)
    }

    async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<GatewayConfig>) {
        let update = tokio::time::timeout(QUIET, rx.recv()).await;
        assert!(update.is_err(), "unexpected reload: {:?}", update.ok().flatten().map(|c| c.session.cookie_name));
    }

    #[tokio::test]
    async fn test_reloads_follow_in_place_and_replacing_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        fs::write(&path, with_cookie("a_jwt")).unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        fs::write(&path, with_cookie("b_jwt")).unwrap();
        assert_eq!(next_cookie(&mut rx).await.as_deref(), Some("b_jwt"));

        let staged = dir.path().join("gateway.toml.swp");
        fs::write(&staged, with_cookie("c_jwt")).unwrap();
        fs::rename(&staged, &path).unwrap();
        assert_eq!(next_cookie(&mut rx).await.as_deref(), Some("c_jwt"));

        fs::write(&path, with_cookie("d_jwt")).unwrap();
        assert_eq!(next_cookie(&mut rx).await.as_deref(), Some("d_jwt"));
    }

    #[tokio::test]
    async fn test_invalid_and_empty_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        fs::write(&path, with_cookie("a_jwt")).unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        fs::write(&path, "[session\ncookie_name = ").unwrap();
        assert_quiet(&mut rx).await;

        fs::write(&path, with_cookie("bad name;")).unwrap();
        assert_quiet(&mut rx).await;

        fs::write(&path, "").unwrap();
        assert_quiet(&mut rx).await;

        fs::write(&path, with_cookie("b_jwt")).unwrap();
        assert_eq!(next_cookie(&mut rx).await.as_deref(), Some("b_jwt"));
    }

    #[tokio::test]
    async fn test_unchanged_content_and_other_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        fs::write(&path, with_cookie("a_jwt")).unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        fs::write(dir.path().join("other.toml"), with_cookie("x_jwt")).unwrap();
        assert_quiet(&mut rx).await;

        fs::write(&path, with_cookie("a_jwt")).unwrap();
        assert_quiet(&mut rx).await;
    }
}
