//! Markdown session log of definitions, resolutions, and bindings.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::function::{Call, Definition, Params};

/// Logger writing a markdown session log.
///
/// Every entry is a level-3 heading with an RFC 3339 timestamp followed by
/// bold field labels, so logs read well rendered and grep well raw.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO").
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let mut dir = std::env::temp_dir();
                dir.push("nlcall-logs");
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create log directory: {}", dir.display())
                })?;
                let filename = format!(
                    "session_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        let log_level = log_level.unwrap_or("INFO").to_uppercase();

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level,
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Function Call Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    fn is_debug(&self) -> bool {
        self.log_level == "DEBUG"
    }

    /// Log a definition obtained for registration.
    ///
    /// # Arguments
    /// * `definition` - The definition.
    /// * `source` - Where it came from (`cache` or `definer`).
    pub fn log_definition(&self, definition: &Definition, source: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Definition - {}\n\n**Function:** {}\n**Source:** {}\n**Description:** {}\n\n",
            now.to_rfc3339(),
            definition.name,
            source,
            definition.description
        );

        if self.is_debug() {
            let schema = definition
                .parameters
                .as_ref()
                .map(|p| serde_json::to_string_pretty(p).unwrap_or_default())
                .unwrap_or_else(|| "null".to_string());
            content.push_str(&format!("**Parameters:**\n```json\n{}\n```\n\n", schema));
        }

        self.append_to_log(&content)?;
        tracing::info!(function = %definition.name, source, "definition logged");
        Ok(())
    }

    /// Log a resolved call.
    ///
    /// # Arguments
    /// * `input` - User input.
    /// * `call` - Call chosen by the resolver.
    pub fn log_resolution(&self, input: &str, call: &Call) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Resolution - {}\n\n**Input:** {}\n**Call:** `{}({})`\n\n",
            now.to_rfc3339(),
            input,
            call.name,
            format_params(&call.params)
        );

        self.append_to_log(&content)?;
        Ok(())
    }

    /// Log a successful binding.
    ///
    /// # Arguments
    /// * `function` - Function name.
    /// * `deferred` - Number of slots left for invocation time.
    pub fn log_binding(&self, function: &str, deferred: usize) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Binding - {}\n\n**Function:** {}\n**Deferred slots:** {}\n\n",
            now.to_rfc3339(),
            function,
            deferred
        );

        self.append_to_log(&content)?;
        Ok(())
    }

    /// Log the outcome of invoking a bound call.
    ///
    /// # Arguments
    /// * `function` - Function name.
    /// * `result` - Rendered results or error message.
    /// * `success` - Whether the invocation succeeded.
    pub fn log_invocation(&self, function: &str, result: &str, success: bool) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let status = if success { "Result" } else { "Error" };
        let content = format!(
            "### Invocation - {}\n\n**Function:** {}\n**{}:** {}\n\n",
            now.to_rfc3339(),
            function,
            status,
            result
        );

        self.append_to_log(&content)?;
        Ok(())
    }

    /// Log error with the input that caused it.
    ///
    /// # Arguments
    /// * `error` - Error message.
    /// * `input` - User input, if any.
    pub fn log_error(&self, error: &str, input: Option<&str>) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Error - {}\n\n**Error:** {}\n\n",
            now.to_rfc3339(),
            error
        );

        if let Some(input) = input {
            content.push_str(&format!("**Input:** {}\n\n", input));
        }

        self.append_to_log(&content)?;
        tracing::error!("{}", error);
        Ok(())
    }

    /// Log custom content.
    ///
    /// # Arguments
    /// * `title` - Log entry title.
    /// * `content` - Log content.
    pub fn log_custom(&self, title: &str, content: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let log_content = format!("### {} - {}\n\n{}\n\n", title, now.to_rfc3339(), content);
        self.append_to_log(&log_content)
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

fn format_params(params: &Params) -> String {
    match params {
        Params::Raw(fragments) => fragments.join(","),
        Params::Typed(values) => values
            .iter()
            .map(|v| {
                v.to_json()
                    .map(|j| j.to_string())
                    .unwrap_or_else(|| format!("{:?}", v))
            })
            .collect::<Vec<_>>()
            .join(","),
    }
}

#[cfg(test)]
mod tests;
