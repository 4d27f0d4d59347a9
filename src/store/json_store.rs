use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::store::schema::{SCHEMA_VERSION, SessionSnapshot};

const SESSION_FILE: &str = "session.json";

/// Flat-file key-value store under the platform data dir. The only key the
/// quiz uses is the auto-saved session snapshot; writes are atomic
/// (tmp + rename) so a crash mid-save never leaves a torn file behind.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("logiq");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        self.save(SESSION_FILE, snapshot)
    }

    /// Load the saved session, if there is a usable one. Corrupt files,
    /// schema mismatches, inconsistent arrays, and saves older than 24
    /// hours are all treated the same way: removed and reported as absent.
    pub fn load_snapshot(&self, now_ms: i64) -> Option<SessionSnapshot> {
        let path = self.file_path(SESSION_FILE);
        if !path.exists() {
            return None;
        }

        let parsed: Option<SessionSnapshot> = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok());

        match parsed {
            Some(snap)
                if snap.schema_version == SCHEMA_VERSION
                    && !snap.is_expired(now_ms)
                    && snap.is_consistent() =>
            {
                Some(snap)
            }
            _ => {
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    pub fn has_snapshot(&self, now_ms: i64) -> bool {
        self.load_snapshot(now_ms).is_some()
    }

    pub fn clear_snapshot(&self) {
        let _ = fs::remove_file(self.file_path(SESSION_FILE));
    }
}
