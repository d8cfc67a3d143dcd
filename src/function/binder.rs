//! Binding parameters to a descriptor and invoking the result.

use crate::function::{Args, Function, FunctionError, FunctionResult, NativeFn, Params, Value};
use std::fmt;
use std::sync::Arc;

impl Function {
	/// Bind a parameter source, producing a [`Thunk`] that awaits only the
	/// values of the ignored slots.
	///
	/// Slots are walked in positional order; ignored slots are skipped
	/// without consuming a parameter. Raw fragments are parsed as JSON into
	/// the slot type and typed values are checked against it, so both modes
	/// report mismatches here rather than at call time. A failed bind leaves
	/// nothing behind.
	///
	/// # Errors
	///
	/// * `ParamCountMismatch` when `params.len() != external_arity()`.
	/// * `TypeCoercion` when a raw fragment does not parse into its slot type.
	/// * `TypeMismatch` when a typed value does not fit its slot type.
	///
	/// # Example
	///
	/// ```
	/// use nlcall::function::{Args, Definition, Function, NativeFn, Params, Signature, SlotType, Value};
	/// use serde_json::json;
	///
	/// let sum = NativeFn::new("sum", Signature::new().variadic(SlotType::Int), |args: Args| {
	///     let mut total = 0;
	///     for i in 0..args.len() {
	///         total += args.int(i)?;
	///     }
	///     Ok(vec![Value::Int(total)])
	/// });
	/// let def = Definition::new("sum", "Sum integers", json!({"type": "object"}));
	/// let f = Function::new(sum, def, []).unwrap();
	///
	/// let thunk = f.bind(&Params::raw(["[1,2,3]"])).unwrap();
	/// assert_eq!(thunk.invoke(vec![]).unwrap(), vec![Value::Int(6)]);
	/// ```
	pub fn bind(&self, params: &Params) -> FunctionResult<Thunk> {
		let signature = self.signature();
		let arity = signature.arity();
		let expected = self.external_arity();
		if params.len() != expected {
			return Err(FunctionError::param_count_mismatch(self.name(), expected, params.len()));
		}

		let mut slots: Vec<Option<Value>> = vec![None; arity];
		let mut j = 0;
		for (i, slot) in slots.iter_mut().enumerate() {
			if self.is_ignored(i) {
				continue;
			}
			let Some(target) = signature.slot_type(i) else {
				break;
			};
			let value = match params {
				Params::Raw(fragments) => {
					let raw = &fragments[j];
					target
						.coerce_raw(raw)
						.map_err(|message| FunctionError::type_coercion(self.name(), i, raw, message))?
				}
				Params::Typed(values) => {
					let value = values[j].clone();
					let found = value.kind();
					target
						.conform(value)
						.ok_or_else(|| FunctionError::type_mismatch(self.name(), i, target.to_string(), found))?
				}
			};
			*slot = Some(value);
			j += 1;
		}

		tracing::debug!(
			function = %self.name(),
			params = params.len(),
			raw = params.is_raw(),
			deferred = self.ignored().len(),
			"bound parameters"
		);

		Ok(Thunk {
			native: self.native().clone(),
			name: self.name().to_string(),
			slots,
			ignored: self.ignored_shared(),
		})
	}

	/// Bind and invoke in one step.
	///
	/// Bind errors arrive as [`FunctionError`] inside the `anyhow::Error`;
	/// errors from the callable itself are returned untouched.
	///
	/// # Panics
	///
	/// Panics when `deferred` does not match the ignored slots, see
	/// [`Thunk::invoke`].
	pub fn call(&self, params: &Params, deferred: Vec<Value>) -> anyhow::Result<Vec<Value>> {
		let thunk = self.bind(params)?;
		thunk.invoke(deferred)
	}
}

/// A bound call awaiting the values of its ignored slots.
///
/// Each thunk owns its own argument storage, so thunks bound from the same
/// descriptor never share state. Invoking a thunk more than once is as safe
/// as calling the underlying function more than once.
pub struct Thunk {
	native: NativeFn,
	name: String,
	slots: Vec<Option<Value>>,
	ignored: Arc<[usize]>,
}

impl Thunk {
	/// Name of the bound function.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Number of values [`Thunk::invoke`] expects.
	pub fn deferred_count(&self) -> usize {
		self.ignored.len()
	}

	/// Slots that still need a value, ascending.
	pub fn deferred_slots(&self) -> &[usize] {
		&self.ignored
	}

	/// Fill the ignored slots and call the function.
	///
	/// `deferred[k]` goes to slot `deferred_slots()[k]`. A variadic tail is
	/// spread into individual trailing arguments. The callable's results are
	/// returned as-is, and so are its errors.
	///
	/// # Panics
	///
	/// Supplying the wrong number of deferred values, or a value that does not
	/// fit its declared slot type, is a caller bug and panics.
	pub fn invoke(&self, deferred: Vec<Value>) -> anyhow::Result<Vec<Value>> {
		if deferred.len() != self.ignored.len() {
			panic!(
				"function {} requires {} deferred values, {} provided",
				self.name,
				self.ignored.len(),
				deferred.len()
			);
		}

		let signature = self.native.signature();
		let mut slots = self.slots.clone();
		for (&index, value) in self.ignored.iter().zip(deferred) {
			let found = value.kind();
			let value = signature
				.slot_type(index)
				.and_then(|ty| ty.conform(value))
				.unwrap_or_else(|| {
					panic!(
						"function {} deferred slot {} does not accept a {} value",
						self.name, index, found
					)
				});
			slots[index] = Some(value);
		}

		let tail = if signature.is_variadic() {
			slots.pop().flatten()
		} else {
			None
		};
		let mut values: Vec<Value> = slots.into_iter().flatten().collect();
		match tail {
			Some(Value::Seq(items)) => values.extend(items),
			Some(other) => values.push(other),
			None => {}
		}

		tracing::debug!(function = %self.name, args = values.len(), "invoking");
		self.native.invoke(Args::new(values))
	}
}

impl fmt::Debug for Thunk {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Thunk")
			.field("name", &self.name)
			.field("slots", &self.slots)
			.field("deferred", &self.ignored)
			.finish()
	}
}
