use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::engine::{HiddenSizes, Visibility};

/// Quiet window before a requested write actually hits disk.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// On-disk layout record, one JSON file per storage key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLayout {
    pub sizes: [f64; 3],
    pub visibility: Visibility,
    pub previous_sizes: HiddenSizes,
}

impl SavedLayout {
    /// Reject records whose numbers cannot have come from a healthy run:
    /// non-finite or negative sizes, a hidden pane with a nonzero size, or
    /// an all-zero layout.
    pub fn is_structurally_valid(&self) -> bool {
        let finite = self.sizes.iter().all(|s| s.is_finite() && *s >= 0.0);
        let cached_ok = [self.previous_sizes.first, self.previous_sizes.third]
            .iter()
            .flatten()
            .all(|s| s.is_finite() && *s >= 0.0);
        let hidden_zero = (self.visibility.first || self.sizes[0] == 0.0)
            && (self.visibility.third || self.sizes[2] == 0.0);
        finite && cached_ok && hidden_zero && self.sizes.iter().sum::<f64>() > 0.0
    }
}

pub(crate) fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trisplit")
}

/// Strip a storage key down to filename-safe characters.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

pub fn layout_file_path(key: &str) -> PathBuf {
    data_dir().join(format!("{}.json", sanitize_key(key)))
}

pub fn load(key: &str) -> Option<SavedLayout> {
    load_from(&layout_file_path(key))
}

// Path-parameterized variants for testability

pub fn save_to(layout: &SavedLayout, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(layout)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_from(path: &Path) -> Option<SavedLayout> {
    let json = fs::read_to_string(path).ok()?;
    let layout: SavedLayout = serde_json::from_str(&json).ok()?;
    layout.is_structurally_valid().then_some(layout)
}

/// Debounced, last-write-wins persistence.
///
/// Requests never block the caller; a write happens only after the quiet
/// window elapses with no newer request, so a burst of drags collapses to
/// one disk write of the final layout. Failures are logged and dropped —
/// the layout itself is never at risk, only its restoration after restart.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<SavedLayout>,
}

impl DebouncedSaver {
    /// Spawn the writer task for a storage key. Returns `None` when the
    /// key sanitizes down to nothing usable as a file name.
    pub fn for_key(key: &str) -> Option<Self> {
        if sanitize_key(key).is_empty() {
            return None;
        }
        Some(Self::spawn(layout_file_path(key), SAVE_DEBOUNCE))
    }

    pub fn spawn(path: PathBuf, window: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SavedLayout>();
        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    match tokio::time::timeout(window, rx.recv()).await {
                        // A newer request within the window supersedes.
                        Ok(Some(newer)) => latest = newer,
                        // Channel closed: flush what we have and stop.
                        Ok(None) => {
                            write_layout(&latest, &path);
                            return;
                        }
                        Err(_) => break,
                    }
                }
                write_layout(&latest, &path);
            }
        });
        Self { tx }
    }

    /// Queue a write of the given layout. The newest request wins.
    pub fn request(&self, layout: SavedLayout) {
        let _ = self.tx.send(layout);
    }
}

fn write_layout(layout: &SavedLayout, path: &Path) {
    if let Err(err) = save_to(layout, path) {
        warn!(path = %path.display(), %err, "failed to persist layout");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_layout() -> SavedLayout {
        SavedLayout {
            sizes: [300.0, 600.0, 0.0],
            visibility: Visibility {
                first: true,
                third: false,
            },
            previous_sizes: HiddenSizes {
                first: None,
                third: Some(300.0),
            },
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        let layout = make_layout();

        save_to(&layout, &path).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, layout);
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let json = serde_json::to_string(&make_layout()).unwrap();
        assert!(json.contains("\"previousSizes\""));
        assert!(json.contains("\"visibility\""));
        assert!(json.contains("\"sizes\""));
    }

    #[test]
    fn test_load_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_from(&path).is_none());
    }

    #[test]
    fn test_load_rejects_hidden_pane_with_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.json");
        let mut layout = make_layout();
        layout.sizes[2] = 120.0; // third is hidden, must be zero
        save_to(&layout, &path).unwrap();
        assert!(load_from(&path).is_none());
    }

    #[test]
    fn test_load_rejects_null_in_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.json");
        fs::write(
            &path,
            r#"{"sizes":[300.0,null,0.0],"visibility":{"first":true,"third":false},"previousSizes":{"first":null,"third":null}}"#,
        )
        .unwrap();
        assert!(load_from(&path).is_none());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("editor-layout_v2.main"), "editor-layout_v2.main");
        assert_eq!(sanitize_key("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_key("a b/c"), "abc");
        assert_eq!(sanitize_key("///"), "");
    }

    #[tokio::test]
    async fn test_debounce_collapses_to_last_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debounced.json");
        let saver = DebouncedSaver::spawn(path.clone(), Duration::from_millis(50));

        let mut layout = make_layout();
        saver.request(layout);
        layout.sizes = [250.0, 650.0, 0.0];
        saver.request(layout);
        layout.sizes = [200.0, 700.0, 0.0];
        saver.request(layout);

        // Nothing lands before the quiet window elapses.
        assert!(!path.exists());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.sizes, [200.0, 700.0, 0.0]);
    }

    #[tokio::test]
    async fn test_debounce_later_request_supersedes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("supersede.json");
        let saver = DebouncedSaver::spawn(path.clone(), Duration::from_millis(50));

        let mut layout = make_layout();
        saver.request(layout);
        tokio::time::sleep(Duration::from_millis(20)).await;
        layout.sizes = [100.0, 800.0, 0.0];
        saver.request(layout);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(load_from(&path).unwrap().sizes, [100.0, 800.0, 0.0]);
    }
}
