//! On-disk definition cache.
//!
//! Each definition lives in `<dir>/<name>.lcdef.json`, so a model-written
//! definition can be reviewed, edited, and reused across runs without
//! another completion request.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::function::Definition;

/// File suffix of cached definitions.
pub const DEFINITION_SUFFIX: &str = ".lcdef.json";

/// Directory of cached definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionCache {
    dir: PathBuf,
}

impl DefinitionCache {
    /// Cache rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the definition of `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            anyhow::bail!("Invalid definition name '{}'", name);
        }
        Ok(self.dir.join(format!("{}{}", name, DEFINITION_SUFFIX)))
    }

    /// Load the definition of `name`; `Ok(None)` when no file exists.
    pub fn load(&self, name: &str) -> Result<Option<Definition>> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read definition: {}", path.display()))?;
        let definition = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse definition: {}", path.display()))?;

        debug!(path = %path.display(), "loaded cached definition");
        Ok(Some(definition))
    }

    /// Save `definition` under its name.
    ///
    /// Without `overwrite` an existing file is left untouched. Returns
    /// whether the file was written.
    pub fn save(&self, definition: &Definition, overwrite: bool) -> Result<bool> {
        let path = self.path_for(&definition.name)?;
        if !overwrite && path.exists() {
            debug!(path = %path.display(), "definition already cached");
            return Ok(false);
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;
        let json = serde_json::to_string(definition)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write definition: {}", path.display()))?;

        debug!(path = %path.display(), "saved definition");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn weather() -> Definition {
        Definition::new(
            "weather",
            "Weather in a city",
            json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        )
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DefinitionCache::new(temp_dir.path());
        assert!(cache.load("weather").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DefinitionCache::new(temp_dir.path().join("defs"));

        assert!(cache.save(&weather(), false).unwrap());
        assert!(temp_dir.path().join("defs/weather.lcdef.json").exists());
        assert_eq!(cache.load("weather").unwrap(), Some(weather()));
    }

    #[test]
    fn test_save_respects_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DefinitionCache::new(temp_dir.path());
        cache.save(&weather(), false).unwrap();

        let edited = Definition::without_parameters("weather", "edited");
        assert!(!cache.save(&edited, false).unwrap());
        assert_eq!(cache.load("weather").unwrap(), Some(weather()));

        assert!(cache.save(&edited, true).unwrap());
        assert_eq!(cache.load("weather").unwrap(), Some(edited));
    }

    #[test]
    fn test_null_parameters_persist() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DefinitionCache::new(temp_dir.path());
        cache.save(&Definition::without_parameters("no", "Nothing fits"), false).unwrap();

        let raw = fs::read_to_string(temp_dir.path().join("no.lcdef.json")).unwrap();
        assert!(raw.contains("\"parameters\":null"));
        assert!(cache.load("no").unwrap().unwrap().parameters.is_none());
    }

    #[test]
    fn test_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.lcdef.json"), "{not json").unwrap();
        let cache = DefinitionCache::new(temp_dir.path());
        let err = cache.load("bad").unwrap_err();
        assert!(err.to_string().contains("Failed to parse definition"));
    }

    #[test]
    fn test_invalid_names() {
        let cache = DefinitionCache::new("defs");
        assert!(cache.path_for("../escape").is_err());
        assert!(cache.path_for("").is_err());
        assert!(cache.path_for("ok_name").is_ok());
    }
}
