//! Error types for the function module.

use thiserror::Error;

/// Errors raised while building a function descriptor or binding parameters to it.
///
/// Construction errors (`InvalidIgnoreIndex`, `ArityMismatch`) are detected once
/// at registration. Bind errors (`ParamCountMismatch`, `TypeCoercion`,
/// `TypeMismatch`) are data errors caused by resolver output and are always
/// recoverable by the caller.
///
/// # Example
///
/// ```
/// use nlcall::function::FunctionError;
///
/// let error = FunctionError::param_count_mismatch("greet", 2, 1);
/// assert!(error.to_string().contains("greet"));
/// ```
#[derive(Debug, Error)]
pub enum FunctionError {
	/// An ignored slot index lies outside `[0, arity)`.
	#[error("invalid ignored slot {index} for function {name} with arity {arity}")]
	InvalidIgnoreIndex {
		/// Name of the function being constructed.
		name: String,
		/// The offending index.
		index: usize,
		/// Total arity of the function.
		arity: usize,
	},

	/// The function takes external parameters but its definition has no schema.
	#[error("function {name} takes {external_arity} external parameters ({ignored} ignored) but its definition has no parameter schema")]
	ArityMismatch {
		/// Name of the function being constructed.
		name: String,
		/// Arity minus the number of ignored slots.
		external_arity: usize,
		/// Number of ignored slots.
		ignored: usize,
	},

	/// The parameter source length differs from the external arity.
	#[error("parameter count mismatch for function {name}: expected {expected}, got {got}")]
	ParamCountMismatch {
		/// Name of the function.
		name: String,
		/// External arity of the function.
		expected: usize,
		/// Length of the parameter source.
		got: usize,
	},

	/// A raw JSON fragment could not be coerced into the slot type.
	#[error("invalid parameter <{raw}> at slot {slot} for function <{name}>: {message}")]
	TypeCoercion {
		/// Name of the function.
		name: String,
		/// Positional slot index.
		slot: usize,
		/// The raw fragment as produced by the resolver.
		raw: String,
		/// Why the fragment was rejected.
		message: String,
	},

	/// A typed value does not match the declared slot type.
	#[error("type mismatch at slot {slot} for function {name}: expected {expected}, found {found}")]
	TypeMismatch {
		/// Name of the function.
		name: String,
		/// Positional slot index.
		slot: usize,
		/// Declared slot type.
		expected: String,
		/// Kind of the supplied value.
		found: String,
	},

	/// A callable asked its arguments for something they do not hold.
	#[error("argument {index}: {message}")]
	ArgAccess {
		/// Positional argument index.
		index: usize,
		/// Description of the failed access.
		message: String,
	},

	/// Source introspection is not possible for this callable.
	#[error("introspection unavailable for {name}: {reason}")]
	IntrospectionUnavailable {
		/// Name of the callable.
		name: String,
		/// Why introspection failed.
		reason: String,
	},
}

impl FunctionError {
	/// Create an InvalidIgnoreIndex error.
	pub fn invalid_ignore_index(name: impl Into<String>, index: usize, arity: usize) -> Self {
		Self::InvalidIgnoreIndex {
			name: name.into(),
			index,
			arity,
		}
	}

	/// Create an ArityMismatch error.
	pub fn arity_mismatch(name: impl Into<String>, external_arity: usize, ignored: usize) -> Self {
		Self::ArityMismatch {
			name: name.into(),
			external_arity,
			ignored,
		}
	}

	/// Create a ParamCountMismatch error.
	pub fn param_count_mismatch(name: impl Into<String>, expected: usize, got: usize) -> Self {
		Self::ParamCountMismatch {
			name: name.into(),
			expected,
			got,
		}
	}

	/// Create a TypeCoercion error.
	pub fn type_coercion(
		name: impl Into<String>,
		slot: usize,
		raw: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self::TypeCoercion {
			name: name.into(),
			slot,
			raw: raw.into(),
			message: message.into(),
		}
	}

	/// Create a TypeMismatch error.
	pub fn type_mismatch(
		name: impl Into<String>,
		slot: usize,
		expected: impl Into<String>,
		found: impl Into<String>,
	) -> Self {
		Self::TypeMismatch {
			name: name.into(),
			slot,
			expected: expected.into(),
			found: found.into(),
		}
	}

	/// Create an ArgAccess error.
	pub fn arg_access(index: usize, message: impl Into<String>) -> Self {
		Self::ArgAccess {
			index,
			message: message.into(),
		}
	}

	/// Create an IntrospectionUnavailable error.
	pub fn introspection_unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::IntrospectionUnavailable {
			name: name.into(),
			reason: reason.into(),
		}
	}

	/// Whether this error stems from resolver output rather than a setup mistake.
	pub fn is_bind_error(&self) -> bool {
		matches!(
			self,
			Self::ParamCountMismatch { .. } | Self::TypeCoercion { .. } | Self::TypeMismatch { .. }
		)
	}
}
