//! The agent: registry, resolver, and definer wired together.

use std::sync::Arc;

use tracing::{debug, info};

use super::{AgentError, AgentResult, RegisterOptions};
use crate::cache::DefinitionCache;
use crate::definer::{Definer, LlmDefiner};
use crate::function::{Call, Definition, Function, NativeFn, Params, Thunk};
use crate::llm::{CompletionClient, ToolCompletionClient};
use crate::registry::FunctionRegistry;
use crate::resolver::{LlmResolver, Resolver};

#[cfg(feature = "observability")]
use crate::observability::Logger;

/// Turns natural-language input into bound calls of registered functions.
///
/// Registration stores a function in the agent's registry and offers it to
/// the resolver. Assignment resolves input, looks the function up, and
/// binds the resolved parameters.
pub struct Agent {
    registry: FunctionRegistry,
    resolver: Arc<dyn Resolver>,
    definer: Arc<dyn Definer>,
    #[cfg(feature = "observability")]
    logger: Option<Arc<Logger>>,
}

impl Agent {
    /// Create an agent from explicit collaborators.
    pub fn new(resolver: Arc<dyn Resolver>, definer: Arc<dyn Definer>) -> Self {
        Self {
            registry: FunctionRegistry::new(),
            resolver,
            definer,
            #[cfg(feature = "observability")]
            logger: None,
        }
    }

    /// Agent using one model for both resolution (prompt strategy) and
    /// definition.
    pub fn from_client(client: Arc<dyn CompletionClient>) -> Self {
        Self::new(
            Arc::new(LlmResolver::new(Arc::clone(&client))),
            Arc::new(LlmDefiner::new(client)),
        )
    }

    /// Agent using one tool-calling model for resolution and definition.
    pub fn from_tool_client<C>(client: Arc<C>) -> Self
    where
        C: ToolCompletionClient + 'static,
    {
        let definer_client: Arc<dyn CompletionClient> = client.clone();
        Self::new(
            Arc::new(LlmResolver::with_tools(client)),
            Arc::new(LlmDefiner::new(definer_client)),
        )
    }

    /// Agent backed by an [`OpenAiClient`](crate::llm::OpenAiClient) built
    /// from configuration. `[llm] use_tools` selects the resolution
    /// strategy; a session log is opened when `[logging] log_file` is set.
    #[cfg(all(feature = "config", feature = "openai"))]
    pub fn from_config(
        config: &crate::config::Configuration,
        env: &crate::config::EnvironmentLoader,
    ) -> AgentResult<Self> {
        let client = Arc::new(crate::llm::OpenAiClient::from_config(&config.llm, env));
        info!(url = %client.url(), model = %client.model(), tools = config.llm.use_tools, "creating agent");

        #[allow(unused_mut)]
        let mut agent = if config.llm.use_tools {
            Self::from_tool_client(client)
        } else {
            Self::from_client(client)
        };

        #[cfg(feature = "observability")]
        if let Some(log_file) = &config.logging.log_file {
            let logger = Logger::new(Some(log_file.as_path()), Some(&config.logging.log_level))?;
            agent = agent.with_logger(Arc::new(logger));
        }
        Ok(agent)
    }

    /// Record registrations, resolutions, and bindings in a session log.
    #[cfg(feature = "observability")]
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[cfg(feature = "observability")]
    fn log(&self, entry: impl FnOnce(&Logger) -> anyhow::Result<()>) {
        if let Some(logger) = &self.logger {
            if let Err(e) = entry(logger) {
                tracing::warn!(error = %e, "failed to write session log");
            }
        }
    }

    /// The agent's registry.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Register a ready-made descriptor.
    ///
    /// When the resolver refuses the function it is taken out of the
    /// registry again, so a failed registration leaves no trace.
    pub fn register_func(&self, function: Function) -> AgentResult<Arc<Function>> {
        let function = self.registry.register(function)?;
        if !self.resolver.add_func(Arc::clone(&function)) {
            self.registry.remove(function.name())?;
            return Err(AgentError::resolver_rejected(function.name()));
        }
        info!(function = %function.name(), "registered function");
        Ok(function)
    }

    /// Register a native function, obtaining its definition from the cache
    /// in `options.load_dir` or else from the definer.
    pub async fn register_fn(
        &self,
        native: NativeFn,
        options: RegisterOptions,
    ) -> AgentResult<Arc<Function>> {
        let cached = match &options.load_dir {
            Some(dir) => DefinitionCache::new(dir).load(native.name())?,
            None => None,
        };
        let (definition, source) = match cached {
            Some(mut definition) => {
                if definition.name != native.name() {
                    tracing::warn!(
                        function = %native.name(),
                        cached = %definition.name,
                        "cached definition names another function, keeping the native name"
                    );
                    definition.name = native.name().to_string();
                }
                (definition, "cache")
            }
            None => {
                debug!(function = %native.name(), "asking definer");
                let definition = self.definer.define(&native, &options.ignored).await?;
                (definition, "definer")
            }
        };

        #[cfg(feature = "observability")]
        self.log(|l| l.log_definition(&definition, source));
        debug!(function = %definition.name, source, "obtained definition");

        let function = Function::new(native, definition, options.ignored.iter().copied())?;
        let function = self.register_func(function)?;

        if let Some(dir) = &options.save_dir {
            DefinitionCache::new(dir).save(function.definition(), options.overwrite)?;
        }
        Ok(function)
    }

    /// Look up a registered function.
    pub fn get_func(&self, name: &str) -> AgentResult<Arc<Function>> {
        self.registry
            .find(name)
            .ok_or_else(|| AgentError::not_found(name))
    }

    /// Definitions of every registered function.
    pub fn definitions(&self) -> Vec<Definition> {
        self.registry.definitions()
    }

    async fn resolve(&self, input: &str) -> AgentResult<(Arc<Function>, Call)> {
        if input.is_empty() {
            return Err(AgentError::EmptyInput);
        }
        let call = match self.resolver.resolve(input).await {
            Ok(call) => call,
            Err(e) => {
                #[cfg(feature = "observability")]
                self.log(|l| l.log_error(&format!("{:#}", e), Some(input)));
                return Err(e.into());
            }
        };

        #[cfg(feature = "observability")]
        self.log(|l| l.log_resolution(input, &call));

        let function = self.get_func(&call.name)?;
        Ok((function, call))
    }

    /// Resolve `input` to a registered function and its parameters.
    pub async fn assign_func(&self, input: &str) -> AgentResult<(Arc<Function>, Params)> {
        let (function, call) = self.resolve(input).await?;
        Ok((function, call.params))
    }

    /// Resolve `input` and bind the result into a callable [`Thunk`].
    ///
    /// The thunk still needs the function's ignored slots, in ascending slot
    /// order, when invoked.
    pub async fn assign_callable(&self, input: &str) -> AgentResult<Thunk> {
        let (function, call) = self.resolve(input).await?;
        let thunk = function.bind(&call.params)?;

        #[cfg(feature = "observability")]
        self.log(|l| l.log_binding(function.name(), thunk.deferred_count()));
        Ok(thunk)
    }
}
