//! Parameter sources and resolved calls.

use crate::function::Value;

/// Externally supplied parameters for one call.
///
/// Either already-typed values or raw JSON fragments, one per external
/// slot. For a variadic tail the source holds a single sequence (typically a
/// JSON array) for all trailing arguments.
///
/// # Example
///
/// ```
/// use nlcall::function::Params;
///
/// let p = Params::raw(["\"Ann\"", "30"]);
/// assert!(p.is_raw());
/// assert_eq!(p.len(), 2);
/// assert_eq!(p.raw_at(1), Some("30"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
	/// Already-typed values.
	Typed(Vec<Value>),
	/// Independent JSON fragments.
	Raw(Vec<String>),
}

impl Params {
	/// Typed parameters.
	pub fn typed<I, V>(values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		Self::Typed(values.into_iter().map(Into::into).collect())
	}

	/// Raw JSON fragments.
	pub fn raw<I, S>(fragments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Raw(fragments.into_iter().map(Into::into).collect())
	}

	/// No parameters.
	pub fn empty() -> Self {
		Self::Raw(Vec::new())
	}

	/// Whether the fragments still need JSON coercion.
	pub fn is_raw(&self) -> bool {
		matches!(self, Self::Raw(_))
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		match self {
			Self::Typed(values) => values.len(),
			Self::Raw(fragments) => fragments.len(),
		}
	}

	/// Whether there are no parameters.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Typed value `index`; `None` in raw mode.
	pub fn get(&self, index: usize) -> Option<&Value> {
		match self {
			Self::Typed(values) => values.get(index),
			Self::Raw(_) => None,
		}
	}

	/// Raw fragment `index`; `None` in typed mode.
	pub fn raw_at(&self, index: usize) -> Option<&str> {
		match self {
			Self::Raw(fragments) => fragments.get(index).map(String::as_str),
			Self::Typed(_) => None,
		}
	}
}

impl Default for Params {
	fn default() -> Self {
		Self::empty()
	}
}

/// A function name and its parameters, as produced by a resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
	/// Registry key of the target function.
	pub name: String,
	/// Parameters for the external slots.
	pub params: Params,
}

impl Call {
	/// Create a resolved call.
	pub fn new(name: impl Into<String>, params: Params) -> Self {
		Self {
			name: name.into(),
			params,
		}
	}
}
