//! User color palette persisted as a small JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Colors offered before the user customizes anything.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#5865f2", "#57f287", "#fee75c", "#ed4245", "#eb459e", "#3498db", "#9b59b6", "#1abc9c",
];

/// Palette persistence errors.
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type for palette operations.
pub type PaletteResult<T> = Result<T, PaletteError>;

/// An ordered list of custom colors. Changes are saved immediately when a
/// file path is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
    file_path: Option<PathBuf>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            file_path: None,
        }
    }
}

impl ColorPalette {
    /// An in-memory palette with the default colors.
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/notecanvas/palette.json`.
    pub fn default_path() -> PaletteResult<PathBuf> {
        let base = dirs::config_dir().ok_or(PaletteError::NoConfigDir)?;
        Ok(base.join("notecanvas").join("palette.json"))
    }

    /// Load from the default location, falling back to the defaults.
    pub fn load_default() -> Self {
        match Self::default_path() {
            Ok(path) => Self::load_or_default(path),
            Err(e) => {
                log::warn!("Palette will not be persisted: {}", e);
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing or unreadable file yields the defaults;
    /// later changes are still saved to `path`.
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let colors = match Self::read(&path) {
            Ok(colors) => colors,
            Err(PaletteError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No palette at {}, using defaults", path.display());
                None
            }
            Err(e) => {
                log::warn!("Failed to read palette {}: {}", path.display(), e);
                None
            }
        };
        Self {
            colors: colors.unwrap_or_else(|| Self::default().colors),
            file_path: Some(path),
        }
    }

    fn read(path: &Path) -> PaletteResult<Option<Vec<String>>> {
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Colors in the order they were added.
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Where changes are saved, if anywhere.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Append `color` unless it is already present.
    pub fn add(&mut self, color: &str) -> bool {
        if self.colors.iter().any(|c| c == color) {
            return false;
        }
        self.colors.push(color.to_string());
        self.persist();
        true
    }

    /// Remove `color`. Returns `false` if it was not in the palette.
    pub fn remove(&mut self, color: &str) -> bool {
        let Some(idx) = self.colors.iter().position(|c| c == color) else {
            return false;
        };
        self.colors.remove(idx);
        self.persist();
        true
    }

    /// Write to the configured path, creating parent directories.
    pub fn save(&self) -> PaletteResult<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(&self.colors)?)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::error!("Failed to save palette: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_ignores_duplicates() {
        let mut palette = ColorPalette::new();
        assert!(!palette.add("#5865f2"));
        assert!(palette.add("#123456"));
        assert_eq!(palette.colors().len(), 9);
        assert!(palette.remove("#123456"));
        assert!(!palette.remove("#123456"));
    }

    #[test]
    fn test_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("palette.json");

        let mut palette = ColorPalette::load_or_default(&path);
        assert_eq!(palette.colors().len(), DEFAULT_PALETTE.len());
        palette.add("#abcdef");
        palette.remove("#5865f2");

        let reloaded = ColorPalette::load_or_default(&path);
        assert_eq!(reloaded.colors(), palette.colors());
        assert_eq!(reloaded.colors().last().map(String::as_str), Some("#abcdef"));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palette.json");
        fs::write(&path, "not json").unwrap();
        let palette = ColorPalette::load_or_default(&path);
        assert_eq!(palette.colors()[0], "#5865f2");
        assert_eq!(palette.file_path(), Some(path.as_path()));
    }
}
