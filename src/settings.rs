/// Persisted player preferences.
///
/// A single JSON record, `{"dark_mode": bool}`. Read once at startup and
/// rewritten whole on every change.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    pub dark_mode: bool,
}

impl Settings {
    /// Load from `path`. A missing file means defaults; anything else that
    /// goes wrong (unreadable, malformed) is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading settings from {}", path.display()));
            }
        };

        let settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Overwrite `path` with the current settings.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).context("encoding settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        log::info!("Settings saved (dark_mode={})", self.dark_mode);
        Ok(())
    }

    /// Flip dark mode and persist immediately.
    pub fn toggle_dark_mode(&mut self, path: &Path) -> Result<()> {
        self.dark_mode = !self.dark_mode;
        self.save(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fresh, not-yet-existing path under the system temp dir.
    pub(crate) fn scratch_path(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir()
            .join(format!("jumption-{}-{}-{}.json", tag, std::process::id(), n));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_gives_light_mode() {
        let path = scratch_path("missing");
        assert_eq!(Settings::load(&path).unwrap(), Settings { dark_mode: false });
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = scratch_path("roundtrip");
        Settings { dark_mode: true }.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), Settings { dark_mode: true });
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_format_is_a_json_mapping() {
        let path = scratch_path("format");
        Settings { dark_mode: true }.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["dark_mode"], serde_json::Value::Bool(true));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn toggle_writes_through() {
        let path = scratch_path("toggle");
        let mut s = Settings::default();
        s.toggle_dark_mode(&path).unwrap();
        assert!(s.dark_mode);
        assert!(Settings::load(&path).unwrap().dark_mode);

        s.toggle_dark_mode(&path).unwrap();
        assert!(!Settings::load(&path).unwrap().dark_mode);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_content_is_an_error() {
        let path = scratch_path("malformed");
        std::fs::write(&path, "{dark_mode: yes").unwrap();
        assert!(Settings::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let dir = std::env::temp_dir().join(format!("jumption-no-such-dir-{}", std::process::id()));
        let path = dir.join("nested").join("settings.json");
        assert!(Settings { dark_mode: true }.save(&path).is_err());
    }
}
