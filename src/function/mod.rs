//! Function descriptors and the invocation binder.
//!
//! A [`Function`] wraps a native callable, its explicit [`Signature`], its
//! [`Definition`] and a set of ignored slots. Binding a [`Params`] source to
//! it coerces every external slot to its declared type and yields a
//! [`Thunk`]; invoking the thunk with the values of the ignored slots runs
//! the callable.
//!
//! ```text
//!  resolver output            descriptor                  caller
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ Call { name,     │     │ Function         │     │ thunk.invoke(    │
//! │   Params::Raw(   │────▶│  .bind(&params)  │────▶│   vec![ctx])     │
//! │   ["1","2"]) }   │     │  -> Thunk        │     │ -> Vec<Value>    │
//! └──────────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use nlcall::function::{Args, Definition, Function, NativeFn, Opaque, Params, Signature, SlotType, Value};
//! use serde_json::json;
//!
//! struct Session;
//!
//! let native = NativeFn::new(
//!     "add",
//!     Signature::new().param(SlotType::Opaque).param(SlotType::Int).param(SlotType::Int),
//!     |args: Args| Ok(vec![Value::Int(args.int(1)? + args.int(2)?)]),
//! );
//! let def = Definition::new(
//!     "add",
//!     "Add two integers",
//!     json!({
//!         "type": "object",
//!         "properties": {
//!             "a": { "type": "integer" },
//!             "b": { "type": "integer" }
//!         }
//!     }),
//! );
//!
//! // slot 0 is supplied by the caller, not the resolver
//! let add = Function::new(native, def, [0]).unwrap();
//!
//! let thunk = add.bind(&Params::raw(["1", "2"])).unwrap();
//! let out = thunk.invoke(vec![Value::Opaque(Opaque::new(Session))]).unwrap();
//! assert_eq!(out, vec![Value::Int(3)]);
//! ```

mod binder;
mod definition;
mod descriptor;
mod error;
mod introspect;
mod native;
mod params;
mod signature;
mod value;

pub use binder::Thunk;
pub use definition::Definition;
pub use descriptor::Function;
pub use error::FunctionError;
pub use introspect::{parse_fn_source, FuncInfo, ParamInfo};
pub use native::{Args, Callable, NativeFn, SourceSite};
pub use params::{Call, Params};
pub use signature::{Signature, SlotType};
pub use value::{Opaque, Value};

/// Result type for function operations.
pub type FunctionResult<T> = Result<T, FunctionError>;
