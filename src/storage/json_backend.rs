use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CoreError;
use crate::matching::ReconciliationMatch;
use crate::schedule::{OccurrenceException, RecurrenceRule};
use crate::utils::app_data_dir;

const BOOK_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";
const BOOKS_DIR: &str = "books";

pub const BOOK_SCHEMA_VERSION: u32 = 1;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Serializable snapshot of the core-owned reconciliation state: rules,
/// their exception overrides, and the match history. Concrete transactions
/// belong to the host ledger and are not part of the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationBook {
    #[serde(default = "ReconciliationBook::schema_version_default")]
    pub schema_version: u32,
    #[serde(default)]
    pub rules: Vec<RecurrenceRule>,
    #[serde(default)]
    pub exceptions: Vec<OccurrenceException>,
    #[serde(default)]
    pub matches: Vec<ReconciliationMatch>,
    pub saved_at: DateTime<Utc>,
}

impl ReconciliationBook {
    pub fn new(
        rules: Vec<RecurrenceRule>,
        exceptions: Vec<OccurrenceException>,
        matches: Vec<ReconciliationMatch>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            schema_version: BOOK_SCHEMA_VERSION,
            rules,
            exceptions,
            matches,
            saved_at,
        }
    }

    fn schema_version_default() -> u32 {
        BOOK_SCHEMA_VERSION
    }
}

/// File-backed persistence for reconciliation books, one JSON file per
/// named book under the application data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    books_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = root.unwrap_or_else(app_data_dir);
        let books_dir = base.join(BOOKS_DIR);
        ensure_dir(&books_dir)?;
        Ok(Self { books_dir })
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }

    pub fn save(&self, name: &str, book: &ReconciliationBook) -> Result<()> {
        let path = self.book_path(name);
        let json = serde_json::to_string_pretty(book)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<ReconciliationBook> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(CoreError::Storage(format!(
                "reconciliation book `{}` not found",
                name
            )));
        }
        let data = fs::read_to_string(&path)?;
        let book: ReconciliationBook = serde_json::from_str(&data)?;
        if book.schema_version > BOOK_SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "reconciliation book `{}` is from a newer schema version",
                name
            )));
        }
        Ok(book)
    }

    pub fn list(&self) -> Result<Vec<String>> {
        if !self.books_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if fs::read_to_string(&path)
                .ok()
                .and_then(|data| serde_json::from_str::<ReconciliationBook>(&data).ok())
                .is_none()
            {
                warn!(path = %path.display(), "skipping unreadable reconciliation book");
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn canonical_name(name: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !slug.is_empty() && !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "book".to_string()
    } else {
        trimmed.to_string()
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
