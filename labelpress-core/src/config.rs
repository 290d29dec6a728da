//! Runtime configuration
//!
//! Paths are loaded once from a JSON file and passed into the resolver and
//! dispatcher at construction time. A missing file is written back with
//! defaults; missing keys are filled in and the file is rewritten.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator sheet printed after a label run, resolved in `aux_pdf_dir`.
pub const DEFAULT_SEPARATOR: &str = "分割72.pdf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one pre-rendered label PDF per SKU
    pub sku_pdf_dir: PathBuf,
    /// Directory holding auxiliary documents (separator sheets etc.)
    pub aux_pdf_dir: PathBuf,
    /// Plain-text file with one printer name per line
    pub printer_list_file: PathBuf,
    /// File name of the separator sheet inside `aux_pdf_dir`
    pub separator_name: String,
    /// History ledger CSV file
    pub history_file: PathBuf,
    /// Explicit Ghostscript executable, overrides discovery
    pub ghostscript_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        #[cfg(windows)]
        let (sku_pdf_dir, aux_pdf_dir) =
            (PathBuf::from(r"D:\temuskupdf"), PathBuf::from(r"D:\other"));
        #[cfg(not(windows))]
        let (sku_pdf_dir, aux_pdf_dir) = (PathBuf::from("temuskupdf"), PathBuf::from("other"));

        Self {
            sku_pdf_dir,
            aux_pdf_dir,
            printer_list_file: PathBuf::from("print_set.txt"),
            separator_name: DEFAULT_SEPARATOR.to_string(),
            history_file: PathBuf::from("print_log.csv"),
            ghostscript_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file is created with defaults. Keys absent from an existing
    /// file are filled with their defaults and the file is rewritten.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let text = fs::read_to_string(path)?;
        let mut value: Value = serde_json::from_str(&text)?;
        let defaults = serde_json::to_value(Self::default())?;

        let mut changed = false;
        if let (Value::Object(map), Value::Object(default_map)) = (&mut value, defaults) {
            for (key, default_value) in default_map {
                if !map.contains_key(&key) {
                    map.insert(key, default_value);
                    changed = true;
                }
            }
        }

        let config: Self = serde_json::from_value(value)?;
        if changed {
            config.save(path)?;
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Read the configured printer list, one name per line.
///
/// A missing file yields an empty list; blank lines are skipped.
pub fn read_printer_list(path: &Path) -> io::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
