//! JSON-file history store with atomic replacement.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::error::HistoryError;
use crate::fingerprint::Fingerprint;
use crate::sanitize::redact_path;
use crate::selector::CanonicalBooking;

pub const HISTORY_VERSION: u32 = 1;

/// What to do with a canonical booking given the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// Code never forwarded, or the booking has no code.
    New,
    /// Code forwarded before with a different fingerprint.
    Update,
    /// Code forwarded before with the same fingerprint.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFlightEntry {
    pub fingerprint: Fingerprint,
    pub last_forwarded_at: DateTime<Utc>,
    /// Reference returned by the forwarder for the outbound message.
    pub forwarded_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryDocument {
    version: u32,
    #[serde(default)]
    confirmations: BTreeMap<String, ProcessedFlightEntry>,
}

/// Summary of the history contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub entries: usize,
    pub last_forwarded_at: Option<DateTime<Utc>>,
}

/// Loaded once per run, consulted for decisions, and written after each
/// successful forward.
#[derive(Debug, Default)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    confirmations: BTreeMap<String, ProcessedFlightEntry>,
}

impl HistoryStore {
    /// Opens the history at `path`. A missing file is an empty history; a
    /// file that cannot be parsed is an error, never an empty history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history at {}, starting empty", redact_path(&path));
                return Ok(Self {
                    path: Some(path),
                    confirmations: BTreeMap::new(),
                });
            }
            Err(e) => return Err(HistoryError::Read { path, source: e }),
        };

        let document: HistoryDocument = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => {
                warn!("History file {} is corrupt: {}", redact_path(&path), e);
                return Err(HistoryError::Corrupt { path, source: e });
            }
        };

        if document.version > HISTORY_VERSION {
            return Err(HistoryError::UnsupportedVersion {
                path,
                found: document.version,
            });
        }

        debug!(
            "Loaded {} history entries from {}",
            document.confirmations.len(),
            redact_path(&path)
        );

        Ok(Self {
            path: Some(path),
            confirmations: document.confirmations,
        })
    }

    /// A history that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.confirmations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confirmations.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&ProcessedFlightEntry> {
        self.confirmations.get(&normalize_code(code))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ProcessedFlightEntry)> {
        self.confirmations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// NEW, UPDATE or SKIP for `booking`. Bookings without a code are
    /// always NEW.
    pub fn decide(&self, booking: &CanonicalBooking) -> Decision {
        let Some(code) = booking.confirmation_code.as_deref() else {
            return Decision::New;
        };
        match self.get(code) {
            None => Decision::New,
            Some(entry) if entry.fingerprint == booking.fingerprint => Decision::Skip,
            Some(_) => Decision::Update,
        }
    }

    /// Records a successful forward of `booking` and persists the history.
    ///
    /// Overwrites any previous entry for the code. Returns `false` without
    /// touching the history when the booking has no code.
    pub fn commit(
        &mut self,
        booking: &CanonicalBooking,
        forwarded_message: &str,
        forwarded_at: DateTime<Utc>,
    ) -> Result<bool, HistoryError> {
        let Some(code) = booking.confirmation_code.as_deref() else {
            return Ok(false);
        };

        let record = &booking.record;
        let entry = ProcessedFlightEntry {
            fingerprint: booking.fingerprint.clone(),
            last_forwarded_at: forwarded_at,
            forwarded_message: forwarded_message.to_string(),
            route: record.route.as_ref().map(|r| r.to_string()),
            flight_date: record.flight_date,
            flight_number: record.flight_number.clone(),
        };

        let previous = self.confirmations.insert(normalize_code(code), entry);
        if let Err(e) = self.save() {
            // Keep memory consistent with disk.
            match previous {
                Some(previous) => self.confirmations.insert(normalize_code(code), previous),
                None => self.confirmations.remove(&normalize_code(code)),
            };
            return Err(e);
        }

        debug!("Committed booking {} to history", code);
        Ok(true)
    }

    /// Clears every entry and persists the empty history.
    pub fn reset(&mut self) -> Result<(), HistoryError> {
        let cleared = self.confirmations.len();
        self.confirmations.clear();
        self.save()?;
        info!("History reset, {} entries cleared", cleared);
        Ok(())
    }

    /// Deletes the history file at `path` and any leftover temporary or
    /// backup files next to it, without parsing anything. Works on a corrupt
    /// history. Returns the files removed.
    pub fn reset_file(path: &Path) -> Result<Vec<PathBuf>, HistoryError> {
        let mut removed = Vec::new();
        let remove = |target: &Path, removed: &mut Vec<PathBuf>| match fs::remove_file(target) {
            Ok(()) => {
                removed.push(target.to_path_buf());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HistoryError::Write {
                path: target.to_path_buf(),
                source: e,
            }),
        };

        remove(path, &mut removed)?;

        let (Some(dir), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str())) else {
            return Ok(removed);
        };
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        let temp_prefix = format!(".{}.", name);
        let backup = format!("{}.bak", name);

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
            Err(e) => {
                return Err(HistoryError::Read {
                    path: dir.to_path_buf(),
                    source: e,
                })
            }
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let is_temp = file_name.starts_with(&temp_prefix) && file_name.ends_with(".tmp");
            if is_temp || file_name == backup {
                remove(&entry.path(), &mut removed)?;
            }
        }

        info!("Removed {} history file(s) for {}", removed.len(), redact_path(path));
        Ok(removed)
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            entries: self.confirmations.len(),
            last_forwarded_at: self
                .confirmations
                .values()
                .map(|e| e.last_forwarded_at)
                .max(),
        }
    }

    /// Writes the whole document to a temp file in the target directory and
    /// renames it over the history file.
    fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let document = HistoryDocument {
            version: HISTORY_VERSION,
            confirmations: self.confirmations.clone(),
        };
        let json = serde_json::to_vec_pretty(&document).map_err(HistoryError::Serialize)?;

        let write_err = |source: std::io::Error| HistoryError::Write {
            path: path.clone(),
            source,
        };

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("history");
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", name))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(write_err)?;
        temp.write_all(&json).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(path).map_err(|e| write_err(e.error))?;

        Ok(())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
