//! Native callables and their positional arguments.

use crate::function::introspect;
use crate::function::{FuncInfo, FunctionError, FunctionResult, Signature, Value};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Signature of the type-erased callable stored in a [`NativeFn`].
///
/// Errors returned by the callable reach the caller of the thunk unchanged.
pub type Callable = dyn Fn(Args) -> anyhow::Result<Vec<Value>> + Send + Sync;

/// Where a native function is declared, for source introspection.
///
/// Usually captured with [`source_site!`](crate::source_site).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSite {
	/// Source file, relative to the package root or absolute.
	pub file: PathBuf,
	/// Line hint; the declaration at or after this line is preferred.
	pub line: u32,
	/// Name of the declared `fn` item, when it differs from the registered name.
	pub item: Option<String>,
}

impl SourceSite {
	/// Create a source site.
	pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
		Self {
			file: file.into(),
			line,
			item: None,
		}
	}

	/// Name the declared `fn` item.
	pub fn item(mut self, item: impl Into<String>) -> Self {
		self.item = Some(item.into());
		self
	}

	/// Resolve the file against the working directory, then `CARGO_MANIFEST_DIR`.
	pub fn resolve_path(&self) -> PathBuf {
		if self.file.is_absolute() || self.file.exists() {
			return self.file.clone();
		}
		match std::env::var_os("CARGO_MANIFEST_DIR") {
			Some(dir) => Path::new(&dir).join(&self.file),
			None => self.file.clone(),
		}
	}
}

/// Capture the current file and line as a [`SourceSite`].
///
/// Pass the `fn` item name when the callable is registered under another name.
///
/// ```
/// use nlcall::source_site;
///
/// let site = source_site!(greet);
/// assert_eq!(site.item.as_deref(), Some("greet"));
/// assert!(site.file.ends_with("native.rs") || site.line > 0);
/// ```
#[macro_export]
macro_rules! source_site {
	() => {
		$crate::function::SourceSite::new(file!(), line!())
	};
	($item:ident) => {
		$crate::function::SourceSite::new(file!(), line!()).item(stringify!($item))
	};
}

#[derive(Default)]
struct InfoCache {
	info: OnceLock<Arc<FuncInfo>>,
	init: Mutex<()>,
}

impl InfoCache {
	fn with(info: FuncInfo) -> Self {
		let cache = Self::default();
		let _ = cache.info.set(Arc::new(info));
		cache
	}
}

/// A native callable together with its explicit signature.
///
/// Cloning is cheap and clones share the introspection cache.
///
/// # Example
///
/// ```
/// use nlcall::function::{Args, NativeFn, Signature, SlotType, Value};
///
/// let add = NativeFn::new(
///     "add",
///     Signature::new().param(SlotType::Int).param(SlotType::Int),
///     |args: Args| Ok(vec![Value::Int(args.int(0)? + args.int(1)?)]),
/// );
/// assert_eq!(add.arity(), 2);
/// ```
#[derive(Clone)]
pub struct NativeFn {
	name: String,
	signature: Signature,
	callable: Arc<Callable>,
	site: Option<SourceSite>,
	cache: Arc<InfoCache>,
}

impl NativeFn {
	/// Wrap a closure taking positional [`Args`].
	pub fn new<F>(name: impl Into<String>, signature: Signature, f: F) -> Self
	where
		F: Fn(Args) -> anyhow::Result<Vec<Value>> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			signature,
			callable: Arc::new(f),
			site: None,
			cache: Arc::default(),
		}
	}

	/// Record the declaration site used for introspection.
	pub fn at(mut self, site: SourceSite) -> Self {
		self.site = Some(site);
		self.cache = Arc::default();
		self
	}

	/// Supply introspection data directly instead of parsing source.
	pub fn with_info(mut self, info: FuncInfo) -> Self {
		self.cache = Arc::new(InfoCache::with(info));
		self
	}

	/// Name the callable was created with.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared signature.
	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	/// Number of positional slots.
	pub fn arity(&self) -> usize {
		self.signature.arity()
	}

	/// Recorded declaration site, if any.
	pub fn site(&self) -> Option<&SourceSite> {
		self.site.as_ref()
	}

	/// Introspection record, computed once and cached.
	///
	/// Concurrent first calls compute it at most once. A failure is not
	/// cached, so a later call may succeed.
	pub fn info(&self) -> FunctionResult<Arc<FuncInfo>> {
		if let Some(info) = self.cache.info.get() {
			return Ok(Arc::clone(info));
		}
		let _guard = self.cache.init.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(info) = self.cache.info.get() {
			return Ok(Arc::clone(info));
		}
		let info = Arc::new(self.introspect()?);
		tracing::debug!(function = %self.name, params = info.params.len(), "introspected source");
		Ok(Arc::clone(self.cache.info.get_or_init(|| info)))
	}

	fn introspect(&self) -> FunctionResult<FuncInfo> {
		let site = self.site.as_ref().ok_or_else(|| {
			FunctionError::introspection_unavailable(&self.name, "no source site recorded")
		})?;
		let item = site.item.as_deref().unwrap_or(&self.name);
		introspect::from_site(site, item)
			.map_err(|reason| FunctionError::introspection_unavailable(&self.name, reason))
	}

	pub(crate) fn invoke(&self, args: Args) -> anyhow::Result<Vec<Value>> {
		(self.callable)(args)
	}
}

impl fmt::Debug for NativeFn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NativeFn")
			.field("name", &self.name)
			.field("signature", &self.signature)
			.field("site", &self.site)
			.finish_non_exhaustive()
	}
}

/// Fully assembled positional arguments handed to a callable.
///
/// Variadic elements appear as individual trailing arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
	values: Vec<Value>,
}

impl Args {
	/// Wrap positional values.
	pub fn new(values: Vec<Value>) -> Self {
		Self { values }
	}

	/// Number of positional arguments.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether there are no arguments.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Borrow argument `index`.
	pub fn get(&self, index: usize) -> Option<&Value> {
		self.values.get(index)
	}

	/// All arguments in order.
	pub fn values(&self) -> &[Value] {
		&self.values
	}

	/// Take ownership of the arguments.
	pub fn into_values(self) -> Vec<Value> {
		self.values
	}

	/// Arguments from `start` onwards, e.g. a variadic tail.
	pub fn rest(&self, start: usize) -> &[Value] {
		self.values.get(start..).unwrap_or(&[])
	}

	fn value(&self, index: usize) -> FunctionResult<&Value> {
		self.values
			.get(index)
			.ok_or_else(|| FunctionError::arg_access(index, format!("only {} arguments", self.values.len())))
	}

	fn mismatch(index: usize, expected: &str, found: &Value) -> FunctionError {
		FunctionError::arg_access(index, format!("expected {}, found {}", expected, found.kind()))
	}

	/// Argument `index` as an integer.
	pub fn int(&self, index: usize) -> FunctionResult<i64> {
		let v = self.value(index)?;
		v.as_int().ok_or_else(|| Self::mismatch(index, "int", v))
	}

	/// Argument `index` as a float; integers are widened.
	pub fn float(&self, index: usize) -> FunctionResult<f64> {
		let v = self.value(index)?;
		v.as_float().ok_or_else(|| Self::mismatch(index, "float", v))
	}

	/// Argument `index` as a string slice.
	pub fn str(&self, index: usize) -> FunctionResult<&str> {
		let v = self.value(index)?;
		v.as_str().ok_or_else(|| Self::mismatch(index, "string", v))
	}

	/// Argument `index` as a boolean.
	pub fn bool(&self, index: usize) -> FunctionResult<bool> {
		let v = self.value(index)?;
		v.as_bool().ok_or_else(|| Self::mismatch(index, "bool", v))
	}

	/// Argument `index` as a sequence.
	pub fn seq(&self, index: usize) -> FunctionResult<&[Value]> {
		let v = self.value(index)?;
		v.as_seq().ok_or_else(|| Self::mismatch(index, "seq", v))
	}

	/// Argument `index` as a map.
	pub fn object(&self, index: usize) -> FunctionResult<&BTreeMap<String, Value>> {
		let v = self.value(index)?;
		v.as_object().ok_or_else(|| Self::mismatch(index, "object", v))
	}

	/// Deserialize argument `index` into `T`.
	pub fn message<T: DeserializeOwned>(&self, index: usize) -> FunctionResult<T> {
		let v = self.value(index)?;
		let json = match v {
			Value::Message(doc) => doc.clone(),
			other => other.to_json().ok_or_else(|| Self::mismatch(index, "message", other))?,
		};
		serde_json::from_value(json).map_err(|e| FunctionError::arg_access(index, e.to_string()))
	}

	/// Borrow the host object in argument `index` as `T`.
	pub fn opaque<T: Any>(&self, index: usize) -> FunctionResult<&T> {
		let v = self.value(index)?;
		v.downcast_ref::<T>().ok_or_else(|| {
			FunctionError::arg_access(
				index,
				format!("expected opaque {}, found {}", std::any::type_name::<T>(), v.kind()),
			)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::function::{Opaque, SlotType};
	use serde::Deserialize;

	#[test]
	fn test_args_accessors() {
		let args = Args::new(vec![
			Value::Int(3),
			Value::from("x"),
			Value::Bool(true),
			Value::from(vec![1, 2]),
			Value::Opaque(Opaque::new(String::from("ctx"))),
		]);

		assert_eq!(args.len(), 5);
		assert_eq!(args.int(0).unwrap(), 3);
		assert_eq!(args.float(0).unwrap(), 3.0);
		assert_eq!(args.str(1).unwrap(), "x");
		assert!(args.bool(2).unwrap());
		assert_eq!(args.seq(3).unwrap().len(), 2);
		assert_eq!(args.opaque::<String>(4).unwrap(), "ctx");
		assert_eq!(args.rest(3).len(), 2);
		assert!(args.rest(9).is_empty());
	}

	#[test]
	fn test_args_access_errors() {
		let args = Args::new(vec![Value::from("x")]);

		let err = args.int(0).unwrap_err();
		assert!(err.to_string().contains("expected int, found string"));

		let err = args.str(4).unwrap_err();
		assert!(err.to_string().contains("only 1 arguments"));

		assert!(args.opaque::<u32>(0).is_err());
	}

	#[test]
	fn test_args_message() {
		#[derive(Deserialize)]
		struct Point {
			x: i64,
			y: i64,
		}

		let args = Args::new(vec![Value::Message(serde_json::json!({"x": 1, "y": 2}))]);
		let p: Point = args.message(0).unwrap();
		assert_eq!((p.x, p.y), (1, 2));
	}

	#[test]
	fn test_native_invoke() {
		let double = NativeFn::new("double", Signature::new().param(SlotType::Int), |args: Args| {
			Ok(vec![Value::Int(args.int(0)? * 2)])
		});
		let out = double.invoke(Args::new(vec![Value::Int(21)])).unwrap();
		assert_eq!(out, vec![Value::Int(42)]);
		assert!(format!("{:?}", double).contains("double"));
	}

	#[test]
	fn test_info_without_site_is_unavailable() {
		let f = NativeFn::new("f", Signature::new(), |_| Ok(vec![]));
		match f.info().unwrap_err() {
			FunctionError::IntrospectionUnavailable { name, reason } => {
				assert_eq!(name, "f");
				assert!(reason.contains("no source site"));
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn test_info_explicit() {
		let info = FuncInfo {
			name: "f".into(),
			comments: "does f".into(),
			..FuncInfo::default()
		};
		let f = NativeFn::new("f", Signature::new(), |_| Ok(vec![])).with_info(info);
		assert_eq!(f.info().unwrap().comments, "does f");
	}

	#[test]
	fn test_source_site_resolve() {
		let site = crate::source_site!();
		assert!(site.resolve_path().exists());
		assert!(site.item.is_none());
	}
}
