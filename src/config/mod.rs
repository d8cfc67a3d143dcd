//! Configuration management.
//!
//! TOML configuration for the completion endpoint, the definition cache,
//! and the session log, plus `.env` loading for secrets.
//!
//! # Example
//!
//! ```no_run
//! use nlcall::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(Some(Path::new(".env")));
//! let loader = ConfigurationLoader::new(Some(Path::new("nlcall.toml"))).unwrap();
//!
//! println!("Model: {}", env.model().unwrap_or(&loader.config.llm.model));
//! ```

pub mod config;
pub mod environment;

pub use self::config::{
    Configuration, ConfigurationLoader, DefinitionsConfig, LlmConfig, LoggingConfig,
};
pub use self::environment::EnvironmentLoader;
