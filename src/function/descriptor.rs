//! Function descriptors: a callable plus its calling metadata.

use crate::function::{Definition, FuncInfo, FunctionError, FunctionResult, NativeFn, Signature};
use std::fmt;
use std::sync::Arc;

/// A registered, bindable function.
///
/// Holds the native callable, its [`Definition`] and the ascending set of
/// ignored slots: positional arguments the resolver never supplies and the
/// caller passes at invocation time instead. Immutable after construction
/// apart from the lazily cached introspection record, so a descriptor can be
/// shared and bound concurrently.
///
/// # Example
///
/// ```
/// use nlcall::function::{Args, Definition, Function, NativeFn, Signature, SlotType, Value};
/// use serde_json::json;
///
/// let native = NativeFn::new(
///     "add",
///     Signature::new().param(SlotType::Opaque).param(SlotType::Int).param(SlotType::Int),
///     |args: Args| Ok(vec![Value::Int(args.int(1)? + args.int(2)?)]),
/// );
/// let def = Definition::new("add", "Add two numbers", json!({"type": "object"}));
///
/// let f = Function::new(native, def, [0]).unwrap();
/// assert_eq!(f.ignored(), &[0]);
/// assert_eq!(f.external_arity(), 2);
/// ```
#[derive(Clone)]
pub struct Function {
	native: NativeFn,
	definition: Definition,
	ignored: Arc<[usize]>,
}

impl Function {
	/// Build a descriptor.
	///
	/// `ignored` may be given in any order and may repeat indices; it is
	/// stored sorted and deduplicated.
	///
	/// # Errors
	///
	/// * `InvalidIgnoreIndex` when an index is not below the arity.
	/// * `ArityMismatch` when external parameters remain but the definition
	///   has no parameter schema.
	pub fn new(
		native: NativeFn,
		definition: Definition,
		ignored: impl IntoIterator<Item = usize>,
	) -> FunctionResult<Self> {
		let arity = native.arity();
		let mut slots = Vec::new();
		for index in ignored {
			if index >= arity {
				return Err(FunctionError::invalid_ignore_index(&definition.name, index, arity));
			}
			slots.push(index);
		}
		slots.sort_unstable();
		slots.dedup();

		let external_arity = arity - slots.len();
		if definition.parameters.is_none() && external_arity != 0 {
			return Err(FunctionError::arity_mismatch(
				&definition.name,
				external_arity,
				slots.len(),
			));
		}

		Ok(Self {
			native,
			definition,
			ignored: slots.into(),
		})
	}

	/// Unique registry key.
	pub fn name(&self) -> &str {
		&self.definition.name
	}

	/// Calling metadata.
	pub fn definition(&self) -> &Definition {
		&self.definition
	}

	/// Ignored slot indices, ascending.
	pub fn ignored(&self) -> &[usize] {
		&self.ignored
	}

	/// Whether slot `index` is deferred to invocation time.
	pub fn is_ignored(&self, index: usize) -> bool {
		self.ignored.binary_search(&index).is_ok()
	}

	/// The wrapped callable.
	pub fn native(&self) -> &NativeFn {
		&self.native
	}

	/// Declared signature.
	pub fn signature(&self) -> &Signature {
		self.native.signature()
	}

	/// Total number of positional slots.
	pub fn arity(&self) -> usize {
		self.native.arity()
	}

	/// Number of slots the resolver must supply.
	pub fn external_arity(&self) -> usize {
		self.arity() - self.ignored.len()
	}

	/// Cached introspection record of the callable.
	///
	/// See [`NativeFn::info`].
	pub fn info(&self) -> FunctionResult<Arc<FuncInfo>> {
		self.native.info()
	}

	pub(crate) fn ignored_shared(&self) -> Arc<[usize]> {
		Arc::clone(&self.ignored)
	}
}

impl fmt::Debug for Function {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Function")
			.field("name", &self.definition.name)
			.field("signature", self.signature())
			.field("ignored", &self.ignored)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::function::{SlotType, Value};
	use serde_json::json;

	fn native(arity: usize) -> NativeFn {
		let sig = Signature::from_slots(vec![SlotType::Any; arity], false);
		NativeFn::new("f", sig, |args| Ok(args.into_values()))
	}

	fn schema_def(name: &str) -> Definition {
		Definition::new(name, "test", json!({"type": "object", "properties": {}}))
	}

	#[test]
	fn test_ignored_sorted_and_deduplicated() {
		let f = Function::new(native(4), schema_def("f"), [3, 1, 3, 0]).unwrap();
		assert_eq!(f.ignored(), &[0, 1, 3]);
		assert_eq!(f.external_arity(), 1);
		assert!(f.is_ignored(1));
		assert!(!f.is_ignored(2));
	}

	#[test]
	fn test_invalid_ignore_index() {
		let err = Function::new(native(2), schema_def("f"), [0, 2]).unwrap_err();
		match err {
			FunctionError::InvalidIgnoreIndex { name, index, arity } => {
				assert_eq!(name, "f");
				assert_eq!(index, 2);
				assert_eq!(arity, 2);
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn test_missing_schema_with_external_params() {
		let def = Definition::without_parameters("f", "no schema");
		let err = Function::new(native(2), def, [0]).unwrap_err();
		assert!(matches!(
			err,
			FunctionError::ArityMismatch { external_arity: 1, ignored: 1, .. }
		));
	}

	#[test]
	fn test_missing_schema_allowed_when_fully_deferred() {
		let def = Definition::without_parameters("f", "no schema");
		let f = Function::new(native(2), def.clone(), [1, 0]).unwrap();
		assert_eq!(f.external_arity(), 0);

		let nullary = Function::new(native(0), def, []).unwrap();
		assert_eq!(nullary.arity(), 0);
	}

	#[test]
	fn test_construction_does_not_invoke() {
		let sig = Signature::new();
		let native = NativeFn::new("boom", sig, |_| -> anyhow::Result<Vec<Value>> {
			panic!("must not be called")
		});
		let f = Function::new(native, Definition::without_parameters("boom", "x"), []).unwrap();
		assert_eq!(f.name(), "boom");
		assert!(format!("{:?}", f).contains("boom"));
	}
}
