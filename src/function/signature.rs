//! Slot types and function signatures.

use crate::function::Value;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

/// Declared type of one positional slot.
///
/// Every registered function states its slot types explicitly; raw
/// parameters are coerced against them and typed parameters are checked
/// against them.
///
/// # Example
///
/// ```
/// use nlcall::function::{SlotType, Value};
///
/// let ty = SlotType::seq(SlotType::Int);
/// assert_eq!(ty.coerce_raw("[1,2]").unwrap(), Value::from(vec![1, 2]));
/// assert!(ty.coerce_raw("[1.5]").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotType {
	/// JSON boolean.
	Bool,
	/// JSON number without a fractional part, fitting in `i64`.
	Int,
	/// Any JSON number.
	Float,
	/// JSON string.
	Str,
	/// JSON array of one element type.
	Seq(Box<SlotType>),
	/// JSON object with values of one element type.
	Object(Box<SlotType>),
	/// Any JSON document, kept verbatim.
	Message,
	/// Any JSON document, converted without a target type.
	Any,
	/// Host object; only suppliable through an ignored slot.
	Opaque,
}

impl SlotType {
	/// Sequence of `elem`.
	pub fn seq(elem: SlotType) -> Self {
		Self::Seq(Box::new(elem))
	}

	/// String-keyed map of `elem`.
	pub fn object(elem: SlotType) -> Self {
		Self::Object(Box::new(elem))
	}

	/// Parse a raw JSON fragment and coerce it into this type.
	pub fn coerce_raw(&self, raw: &str) -> Result<Value, String> {
		let json: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
		self.coerce_json(json)
	}

	/// Coerce an already-parsed JSON document into this type.
	pub fn coerce_json(&self, json: serde_json::Value) -> Result<Value, String> {
		use serde_json::Value as Json;

		match (self, json) {
			(Self::Message, doc) => Ok(Value::Message(doc)),
			(Self::Any, doc) => Ok(Value::from(doc)),
			(Self::Opaque, _) => Err("opaque slots cannot be supplied as JSON".to_string()),
			(Self::Bool, Json::Bool(b)) => Ok(Value::Bool(b)),
			(Self::Int, Json::Number(n)) => n
				.as_i64()
				.map(Value::Int)
				.ok_or_else(|| format!("expected int, found {}", n)),
			(Self::Float, Json::Number(n)) => n
				.as_f64()
				.map(Value::Float)
				.ok_or_else(|| format!("expected float, found {}", n)),
			(Self::Str, Json::String(s)) => Ok(Value::Str(s)),
			(Self::Seq(elem), Json::Array(items)) => items
				.into_iter()
				.enumerate()
				.map(|(i, item)| elem.coerce_json(item).map_err(|e| format!("element {}: {}", i, e)))
				.collect::<Result<Vec<_>, _>>()
				.map(Value::Seq),
			(Self::Object(elem), Json::Object(map)) => map
				.into_iter()
				.map(|(k, v)| match elem.coerce_json(v) {
					Ok(v) => Ok((k, v)),
					Err(e) => Err(format!("key {:?}: {}", k, e)),
				})
				.collect::<Result<BTreeMap<_, _>, _>>()
				.map(Value::Object),
			(ty, other) => Err(format!("expected {}, found {}", ty, json_kind(&other))),
		}
	}

	/// Check a typed value against this type, widening `Int` into `Float`.
	///
	/// Returns the (possibly widened) value, or `None` on mismatch.
	pub fn conform(&self, value: Value) -> Option<Value> {
		match (self, value) {
			(Self::Any, v) => Some(v),
			(Self::Message, Value::Message(doc)) => Some(Value::Message(doc)),
			(Self::Message, v) => v.to_json().map(Value::Message),
			(Self::Bool, v @ Value::Bool(_)) => Some(v),
			(Self::Int, v @ Value::Int(_)) => Some(v),
			(Self::Float, v @ Value::Float(_)) => Some(v),
			(Self::Float, Value::Int(n)) => Some(Value::Float(n as f64)),
			(Self::Str, v @ Value::Str(_)) => Some(v),
			(Self::Opaque, v @ Value::Opaque(_)) => Some(v),
			(Self::Seq(elem), Value::Seq(items)) => items
				.into_iter()
				.map(|item| elem.conform(item))
				.collect::<Option<Vec<_>>>()
				.map(Value::Seq),
			(Self::Object(elem), Value::Object(map)) => map
				.into_iter()
				.map(|(k, v)| elem.conform(v).map(|v| (k, v)))
				.collect::<Option<BTreeMap<_, _>>>()
				.map(Value::Object),
			_ => None,
		}
	}

	/// JSON Schema fragment describing this type.
	pub fn json_schema(&self) -> serde_json::Value {
		match self {
			Self::Bool => json!({"type": "boolean"}),
			Self::Int => json!({"type": "integer"}),
			Self::Float => json!({"type": "number"}),
			Self::Str => json!({"type": "string"}),
			Self::Seq(elem) => json!({"type": "array", "items": elem.json_schema()}),
			Self::Object(elem) => json!({"type": "object", "additionalProperties": elem.json_schema()}),
			Self::Message => json!({"type": "object"}),
			Self::Any | Self::Opaque => json!({}),
		}
	}
}

impl fmt::Display for SlotType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool => write!(f, "bool"),
			Self::Int => write!(f, "int"),
			Self::Float => write!(f, "float"),
			Self::Str => write!(f, "string"),
			Self::Seq(elem) => write!(f, "seq<{}>", elem),
			Self::Object(elem) => write!(f, "object<{}>", elem),
			Self::Message => write!(f, "message"),
			Self::Any => write!(f, "any"),
			Self::Opaque => write!(f, "opaque"),
		}
	}
}

fn json_kind(json: &serde_json::Value) -> &'static str {
	match json {
		serde_json::Value::Null => "null",
		serde_json::Value::Bool(_) => "bool",
		serde_json::Value::Number(_) => "number",
		serde_json::Value::String(_) => "string",
		serde_json::Value::Array(_) => "array",
		serde_json::Value::Object(_) => "object",
	}
}

/// Positional parameter list of a registered function.
///
/// A variadic signature stores its tail as `Seq(elem)`: the parameter source
/// presents one sequence for all trailing arguments, which the binder then
/// spreads into individual positional arguments.
///
/// # Example
///
/// ```
/// use nlcall::function::{Signature, SlotType};
///
/// let sig = Signature::new().param(SlotType::Opaque).variadic(SlotType::Int);
/// assert_eq!(sig.arity(), 2);
/// assert!(sig.is_variadic());
/// assert_eq!(sig.slot_type(1), Some(&SlotType::seq(SlotType::Int)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
	slots: Vec<SlotType>,
	variadic: bool,
}

impl Signature {
	/// Create an empty signature.
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a signature from its slots.
	///
	/// When `variadic` is set, the last slot is the variadic element type.
	pub fn from_slots(slots: Vec<SlotType>, variadic: bool) -> Self {
		let mut sig = Self {
			slots,
			variadic: false,
		};
		if variadic {
			if let Some(elem) = sig.slots.pop() {
				sig = sig.variadic(elem);
			}
		}
		sig
	}

	/// Append a fixed positional slot.
	///
	/// # Panics
	///
	/// Panics when called after [`Signature::variadic`].
	pub fn param(mut self, ty: SlotType) -> Self {
		assert!(!self.variadic, "variadic tail must be the final slot");
		self.slots.push(ty);
		self
	}

	/// Append the variadic tail with element type `elem`.
	///
	/// # Panics
	///
	/// Panics when the signature is already variadic.
	pub fn variadic(mut self, elem: SlotType) -> Self {
		assert!(!self.variadic, "signature already has a variadic tail");
		self.slots.push(SlotType::seq(elem));
		self.variadic = true;
		self
	}

	/// Total number of positional slots, counting the variadic tail once.
	pub fn arity(&self) -> usize {
		self.slots.len()
	}

	/// Whether the last slot is a variadic tail.
	pub fn is_variadic(&self) -> bool {
		self.variadic
	}

	/// Whether slot `index` is the variadic tail.
	pub fn is_variadic_slot(&self, index: usize) -> bool {
		self.variadic && index + 1 == self.slots.len()
	}

	/// Declared type of slot `index`; `Seq(elem)` for the variadic tail.
	pub fn slot_type(&self, index: usize) -> Option<&SlotType> {
		self.slots.get(index)
	}

	/// Element type of the variadic tail.
	pub fn variadic_elem(&self) -> Option<&SlotType> {
		match self.slots.last() {
			Some(SlotType::Seq(elem)) if self.variadic => Some(elem),
			_ => None,
		}
	}

	/// All slot types in positional order.
	pub fn slots(&self) -> &[SlotType] {
		&self.slots
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "(")?;
		for (i, slot) in self.slots.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			match (self.is_variadic_slot(i), slot) {
				(true, SlotType::Seq(elem)) => write!(f, "...{}", elem)?,
				_ => write!(f, "{}", slot)?,
			}
		}
		write!(f, ")")
	}
}
