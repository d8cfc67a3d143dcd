//! Calling metadata of a registered function.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Name, description and parameter schema of a function.
///
/// `name` is the unique registry key. `parameters` is an opaque JSON Schema
/// chosen by whoever defines the function; `None` means the function takes
/// no externally supplied parameters.
///
/// # Example
///
/// ```
/// use nlcall::function::Definition;
/// use serde_json::json;
///
/// let def = Definition::new(
///     "greet",
///     "Return a greeting",
///     json!({
///         "type": "object",
///         "properties": {
///             "name": { "type": "string" },
///             "age": { "type": "integer" }
///         }
///     }),
/// );
///
/// let schema = def.to_openai_function();
/// assert_eq!(schema["function"]["name"], "greet");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Definition {
	/// Unique function name.
	pub name: String,

	/// Human-readable description for LLM consumption.
	pub description: String,

	/// JSON Schema describing the external parameters, or `null`.
	#[serde(default)]
	pub parameters: Option<Value>,
}

impl Definition {
	/// Create a definition with a parameter schema.
	pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
		Self {
			name: name.into(),
			description: description.into(),
			parameters: (!parameters.is_null()).then_some(parameters),
		}
	}

	/// Create a definition for a function without external parameters.
	pub fn without_parameters(name: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: description.into(),
			parameters: None,
		}
	}

	/// Generate an OpenAI-compatible function calling schema.
	pub fn to_openai_function(&self) -> Value {
		json!({
			"type": "function",
			"function": {
				"name": self.name,
				"description": self.description,
				"parameters": self.parameters.clone().unwrap_or_else(|| json!({
					"type": "object",
					"properties": {}
				})),
			}
		})
	}

	/// Check if the schema declares any properties.
	pub fn has_parameters(&self) -> bool {
		self.parameters
			.as_ref()
			.and_then(|p| p.get("properties"))
			.and_then(Value::as_object)
			.is_some_and(|props| !props.is_empty())
	}

	/// Property names declared by the schema.
	pub fn property_names(&self) -> Vec<&str> {
		self.parameters
			.as_ref()
			.and_then(|p| p.get("properties"))
			.and_then(Value::as_object)
			.map(|props| props.keys().map(String::as_str).collect())
			.unwrap_or_default()
	}
}

/// Single-line JSON, as listed in resolver prompts.
impl fmt::Display for Definition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match serde_json::to_string(self) {
			Ok(s) => f.write_str(&s),
			Err(_) => Err(fmt::Error),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_with_null_schema() {
		let def = Definition::new("no", "Fallback", Value::Null);
		assert!(def.parameters.is_none());
		assert!(!def.has_parameters());
	}

	#[test]
	fn test_has_parameters() {
		let def = Definition::new(
			"weather",
			"Weather in a city",
			json!({"type": "object", "properties": {"city": {"type": "string"}}}),
		);
		assert!(def.has_parameters());
		assert_eq!(def.property_names(), vec!["city"]);

		let empty = Definition::new("t", "d", json!({"type": "object", "properties": {}}));
		assert!(!empty.has_parameters());
	}

	#[test]
	fn test_display_is_single_line_json() {
		let def = Definition::without_parameters("no", "Nothing fits");
		assert_eq!(
			def.to_string(),
			r#"{"name":"no","description":"Nothing fits","parameters":null}"#
		);
	}

	#[test]
	fn test_deserialize_missing_parameters() {
		let def: Definition = serde_json::from_str(r#"{"name":"a","description":"b"}"#).unwrap();
		assert!(def.parameters.is_none());
	}

	#[test]
	fn test_openai_function_without_schema() {
		let schema = Definition::without_parameters("no", "Nothing fits").to_openai_function();
		assert_eq!(schema["type"], "function");
		assert_eq!(schema["function"]["parameters"]["type"], "object");
	}

	#[test]
	fn test_serde_roundtrip() {
		let def = Definition::new("add", "Sum", json!({"type": "object"}));
		let parsed: Definition = serde_json::from_str(&def.to_string()).unwrap();
		assert_eq!(def, parsed);
	}
}
