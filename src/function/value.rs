//! Typed argument and result values.

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A value passed to or returned from a registered function.
///
/// Values form a closed set of variants so that coercion from resolver
/// output can be checked per slot. `Opaque` carries host objects such as a
/// session handle; it only ever enters a call through an ignored slot.
///
/// # Example
///
/// ```
/// use nlcall::function::Value;
///
/// let v = Value::from(vec![1, 2, 3]);
/// assert_eq!(v.kind(), "seq");
/// assert_eq!(serde_json::to_string(&v).unwrap(), "[1,2,3]");
/// ```
#[derive(Clone, Debug)]
pub enum Value {
	/// JSON `null`.
	Null,
	/// Boolean value.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Floating point number.
	Float(f64),
	/// UTF-8 string.
	Str(String),
	/// Ordered sequence.
	Seq(Vec<Value>),
	/// String-keyed map.
	Object(BTreeMap<String, Value>),
	/// Nested structured document kept as JSON.
	Message(serde_json::Value),
	/// Host object supplied out-of-band.
	Opaque(Opaque),
}

impl Value {
	/// Short name of the variant, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Float(_) => "float",
			Self::Str(_) => "string",
			Self::Seq(_) => "seq",
			Self::Object(_) => "object",
			Self::Message(_) => "message",
			Self::Opaque(_) => "opaque",
		}
	}

	/// Get the integer, if this is an `Int`.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(n) => Some(*n),
			_ => None,
		}
	}

	/// Get the number as `f64`, widening integers.
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(n) => Some(*n),
			Self::Int(n) => Some(*n as f64),
			_ => None,
		}
	}

	/// Get the string slice, if this is a `Str`.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Get the boolean, if this is a `Bool`.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Get the elements, if this is a `Seq`.
	pub fn as_seq(&self) -> Option<&[Value]> {
		match self {
			Self::Seq(items) => Some(items),
			_ => None,
		}
	}

	/// Get the entries, if this is an `Object`.
	pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
		match self {
			Self::Object(map) => Some(map),
			_ => None,
		}
	}

	/// Downcast an `Opaque` value to a concrete host type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		match self {
			Self::Opaque(o) => o.downcast_ref(),
			_ => None,
		}
	}

	/// Check for `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Convert to a JSON document.
	///
	/// Returns `None` when the value (or one nested in it) is `Opaque`.
	pub fn to_json(&self) -> Option<serde_json::Value> {
		serde_json::to_value(self).ok()
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::Seq(a), Self::Seq(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => a == b,
			(Self::Message(a), Self::Message(b)) => a == b,
			(Self::Opaque(a), Self::Opaque(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(b) => serializer.serialize_bool(*b),
			Self::Int(n) => serializer.serialize_i64(*n),
			Self::Float(n) => serializer.serialize_f64(*n),
			Self::Str(s) => serializer.serialize_str(s),
			Self::Seq(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Object(entries) => {
				let mut map = serializer.serialize_map(Some(entries.len()))?;
				for (k, v) in entries {
					map.serialize_entry(k, v)?;
				}
				map.end()
			}
			Self::Message(doc) => doc.serialize(serializer),
			Self::Opaque(o) => Err(S::Error::custom(format!(
				"opaque value of type {} cannot be serialized",
				o.type_name()
			))),
		}
	}
}

/// Untyped conversion: integers become `Int`, other numbers `Float`.
impl From<serde_json::Value> for Value {
	fn from(json: serde_json::Value) -> Self {
		match json {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(b) => Self::Bool(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Self::Int(i),
				None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
			},
			serde_json::Value::String(s) => Self::Str(s),
			serde_json::Value::Array(items) => Self::Seq(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(map) => {
				Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
			}
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Self::Int(n)
	}
}

impl From<i32> for Value {
	fn from(n: i32) -> Self {
		Self::Int(n.into())
	}
}

impl From<f64> for Value {
	fn from(n: f64) -> Self {
		Self::Float(n)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Self::Str(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Self::Str(s)
	}
}

impl From<Opaque> for Value {
	fn from(o: Opaque) -> Self {
		Self::Opaque(o)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(items: Vec<T>) -> Self {
		Self::Seq(items.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
	fn from(entries: BTreeMap<String, T>) -> Self {
		Self::Object(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
	}
}

/// A shared, type-erased host object.
///
/// Equality is identity: two `Opaque` values are equal only when they
/// point at the same allocation.
#[derive(Clone)]
pub struct Opaque {
	inner: Arc<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl Opaque {
	/// Wrap a host object.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			inner: Arc::new(value),
			type_name: std::any::type_name::<T>(),
		}
	}

	/// Wrap an object the host keeps a handle to.
	pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
		Self {
			inner: value,
			type_name: std::any::type_name::<T>(),
		}
	}

	/// Borrow the object as `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.inner.downcast_ref::<T>()
	}

	/// Name of the wrapped type.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Check whether both handles share the same allocation.
	pub fn ptr_eq(&self, other: &Opaque) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Opaque {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Opaque<{}>", self.type_name)
	}
}
