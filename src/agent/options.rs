//! Registration options.

use std::path::{Path, PathBuf};

/// How [`Agent::register_fn`](super::Agent::register_fn) obtains and stores
/// a definition.
///
/// # Example
///
/// ```
/// use nlcall::agent::RegisterOptions;
///
/// let opts = RegisterOptions::new()
///     .load_from("defs")
///     .save_to("defs")
///     .ignore([0]);
/// assert_eq!(opts.ignored, vec![0]);
/// assert!(!opts.overwrite);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Directory to look for a cached definition before asking the definer.
    pub load_dir: Option<PathBuf>,
    /// Directory to save the definition to after registration.
    pub save_dir: Option<PathBuf>,
    /// Replace an existing cached definition when saving.
    pub overwrite: bool,
    /// Slots supplied at invocation time.
    pub ignored: Vec<usize>,
}

impl RegisterOptions {
    /// Options with nothing cached and no ignored slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load cached definitions from `dir`.
    pub fn load_from(mut self, dir: impl AsRef<Path>) -> Self {
        self.load_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Save definitions to `dir`.
    pub fn save_to(mut self, dir: impl AsRef<Path>) -> Self {
        self.save_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Replace existing cached definitions.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Defer `indices` to invocation time.
    pub fn ignore(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.ignored.extend(indices);
        self
    }

    /// Options for a given ignored set, reusing the cache settings of `self`.
    pub fn with_ignored(&self, indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            ignored: indices.into_iter().collect(),
            ..self.clone()
        }
    }

    /// Defaults from the `[definitions]` configuration section.
    #[cfg(feature = "config")]
    pub fn from_config(config: &crate::config::DefinitionsConfig) -> Self {
        Self {
            load_dir: config.load_dir.clone(),
            save_dir: config.save_dir.clone(),
            overwrite: config.overwrite,
            ignored: Vec::new(),
        }
    }
}
