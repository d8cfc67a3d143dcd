//! Observability utilities.
//!
//! Structured events go through `tracing`; this module adds a markdown
//! session log that records what each registration and resolution did.
//!
//! # Example
//!
//! ```no_run
//! use nlcall::function::{Call, Params};
//! use nlcall::observability::Logger;
//!
//! let logger = Logger::new(None, Some("DEBUG")).unwrap();
//! let call = Call::new("weather", Params::raw(["\"Paris\""]));
//! logger.log_resolution("is it raining in Paris?", &call).unwrap();
//! ```

pub mod logger;

pub use logger::Logger;
