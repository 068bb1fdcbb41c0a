use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use volume_core::{format_timestamp, parse_timestamp, reset_if_stale_day, start_of_utc_day, DailyTotals};

use super::{StateStore, StoreError};

/// Default file name of the totals record
pub const TOTALS_FILE: &str = "daily-trades.json";

/// Default file name of the watermark record
pub const WATERMARK_FILE: &str = "last-tx.txt";

/// File-backed state store.
///
/// File layout:
/// - totals: pretty JSON `{"buys": .., "sells": ..}`
/// - watermark: one RFC 3339 line, or empty when no trade has been folded yet
///
/// Every write goes to a sibling temp file which is fsynced and renamed over
/// the target, so a crash leaves either the old or the new record on disk.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    totals_path: PathBuf,
    watermark_path: PathBuf,
}

impl FileStateStore {
    pub fn new(totals_path: impl Into<PathBuf>, watermark_path: impl Into<PathBuf>) -> Self {
        Self {
            totals_path: totals_path.into(),
            watermark_path: watermark_path.into(),
        }
    }

    /// Store using the default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(TOTALS_FILE), dir.join(WATERMARK_FILE))
    }

    pub fn totals_path(&self) -> &Path {
        &self.totals_path
    }

    pub fn watermark_path(&self) -> &Path {
        &self.watermark_path
    }

    /// Raw watermark as stored, without the day-rollover rule.
    ///
    /// A missing or empty file is `Ok(None)`; unparseable content is an error.
    pub fn load_watermark(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(content) = read_optional(&self.watermark_path)? else {
            return Ok(None);
        };

        let value = content.trim();
        if value.is_empty() {
            return Ok(None);
        }

        parse_timestamp(value)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: self.watermark_path.clone(),
                reason: e.to_string(),
            })
    }

    /// Raw totals as stored. A missing file is zero totals.
    pub fn load_totals(&self) -> Result<DailyTotals, StoreError> {
        let Some(content) = read_optional(&self.totals_path)? else {
            return Ok(DailyTotals::zero());
        };

        let totals: DailyTotals =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: self.totals_path.clone(),
                reason: e.to_string(),
            })?;

        if !totals.is_valid() {
            return Err(StoreError::Corrupt {
                path: self.totals_path.clone(),
                reason: format!("totals must be finite and non-negative, got {:?}", totals),
            });
        }

        Ok(totals)
    }
}

impl StateStore for FileStateStore {
    fn init(&self) -> Result<(), StoreError> {
        for path in [&self.totals_path, &self.watermark_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        if !self.totals_path.exists() {
            tracing::info!("Initializing totals file at {}", self.totals_path.display());
            self.write_totals(&DailyTotals::zero())?;
        }

        if !self.watermark_path.exists() {
            tracing::info!("Initializing watermark file at {}", self.watermark_path.display());
            write_durably(&self.watermark_path, b"")?;
        }

        Ok(())
    }

    fn read_watermark(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.load_watermark() {
            Ok(stored) => reset_if_stale_day(stored, now),
            Err(e) => {
                tracing::warn!("Falling back to start of day watermark: {}", e);
                start_of_utc_day(now)
            }
        }
    }

    fn write_watermark(&self, watermark: DateTime<Utc>) -> Result<(), StoreError> {
        let line = format!("{}\n", format_timestamp(watermark));
        write_durably(&self.watermark_path, line.as_bytes())
    }

    fn read_totals(&self) -> DailyTotals {
        self.load_totals().unwrap_or_else(|e| {
            tracing::warn!("Falling back to zero totals: {}", e);
            DailyTotals::zero()
        })
    }

    fn write_totals(&self, totals: &DailyTotals) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(totals)?;
        write_durably(&self.totals_path, json.as_bytes())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `contents` to `path` via temp file + fsync + rename
fn write_durably(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file = File::create(&tmp_path).map_err(io_err)?;
    file.write_all(contents).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(io_err)?;
    sync_parent_dir(path).map_err(io_err)
}

/// Persist the rename itself
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => File::open(parent)?.sync_all(),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_in_dir_uses_default_names() {
        let store = FileStateStore::in_dir("/var/lib/bot");
        assert_eq!(store.totals_path(), Path::new("/var/lib/bot/daily-trades.json"));
        assert_eq!(store.watermark_path(), Path::new("/var/lib/bot/last-tx.txt"));
    }

    #[test]
    fn test_watermark_roundtrip_same_day() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::in_dir(dir.path());

        let w = Utc.with_ymd_and_hms(2025, 6, 1, 11, 59, 30).unwrap();
        store.write_watermark(w).unwrap();

        assert_eq!(store.load_watermark().unwrap(), Some(w));
        assert_eq!(store.read_watermark(now()), w);
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::in_dir(dir.path());
        store.write_totals(&DailyTotals::new(1.0, 2.0)).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![TOTALS_FILE.to_string()]);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::in_dir(dir.path().join("missing"));
        let err = store.write_totals(&DailyTotals::zero()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
