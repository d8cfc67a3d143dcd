//! Environment variable loading and management.

use std::env;
use std::path::Path;

/// API key for the completion endpoint.
pub const API_KEY_VAR: &str = "NLCALL_API_KEY";
/// Overrides `[llm] url`.
pub const BASE_URL_VAR: &str = "NLCALL_BASE_URL";
/// Overrides `[llm] model`.
pub const MODEL_VAR: &str = "NLCALL_MODEL";

/// Loads environment variables from a .env file and the system environment.
///
/// Values are read once, when the loader is created.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Only an explicitly given file is loaded.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file.filter(|p| p.exists()) {
            if let Err(e) = dotenv::from_path(path) {
                tracing::warn!("Failed to load .env file {}: {}", path.display(), e);
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
            api_key: read_var(API_KEY_VAR),
            base_url: read_var(BASE_URL_VAR),
            model: read_var(MODEL_VAR),
        }
    }

    /// The .env file given at creation.
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// API key from `NLCALL_API_KEY`.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Endpoint override from `NLCALL_BASE_URL`.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Model override from `NLCALL_MODEL`.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_env_file_loading() {
        let temp_dir = TempDir::new().unwrap();
        let env_path = temp_dir.path().join(".env");
        fs::write(
            &env_path,
            "NLCALL_API_KEY=sk-test\nNLCALL_MODEL=local-model\nNLCALL_BASE_URL=\n",
        )
        .unwrap();

        let env_loader = EnvironmentLoader::new(Some(&env_path));
        assert_eq!(env_loader.api_key(), Some("sk-test"));
        assert_eq!(env_loader.model(), Some("local-model"));
        assert_eq!(env_loader.base_url(), None);
        assert!(env_loader.env_file().unwrap().ends_with(".env"));

        env::remove_var(API_KEY_VAR);
        env::remove_var(MODEL_VAR);
        env::remove_var(BASE_URL_VAR);
    }

    #[test]
    fn test_missing_env_file() {
        let env_loader = EnvironmentLoader::new(Some(Path::new("/nonexistent/.env")));
        assert_eq!(env_loader.env_file(), Some("/nonexistent/.env"));
    }
}
