//! Agent Module
//!
//! High-level entry point tying a [`FunctionRegistry`](crate::registry::FunctionRegistry),
//! a [`Resolver`](crate::resolver::Resolver), and a
//! [`Definer`](crate::definer::Definer) together.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nlcall::agent::{Agent, RegisterOptions};
//! use nlcall::function::{NativeFn, Signature, SlotType, Value};
//! use nlcall::llm::OpenAiClient;
//! use nlcall::source_site;
//!
//! /// Return the weather in a city.
//! fn weather(city: &str) -> String {
//!     format!("The weather in {} is sunny.", city)
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = Arc::new(OpenAiClient::new("http://localhost:8000/v1/chat/completions", "local"));
//! let agent = Agent::from_tool_client(client);
//!
//! let native = NativeFn::new("weather", Signature::new().param(SlotType::Str), |args| {
//!     Ok(vec![Value::from(weather(args.str(0)?))])
//! })
//! .at(source_site!(weather));
//! agent.register_fn(native, RegisterOptions::new().save_to("defs")).await?;
//!
//! let thunk = agent.assign_callable("is it raining in Paris?").await?;
//! let out = thunk.invoke(vec![])?;
//! println!("{:?}", out);
//! # Ok(())
//! # }
//! ```

mod agent;
mod error;
mod options;

pub use agent::Agent;
pub use error::{AgentError, AgentResult};
pub use options::RegisterOptions;
