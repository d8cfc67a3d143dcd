//! Function Registry Module
//!
//! Owns every registered [`Function`](crate::function::Function) under a
//! globally unique name. The registry is an explicit object handed to
//! whichever component needs lookups; there is no process-wide state.

mod error;
mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::FunctionRegistry;
