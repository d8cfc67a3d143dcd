//! LLM-backed resolver.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

use super::{parse_call_str, Resolver, ResolverError};
use crate::function::{Call, Definition, Function, Params};
use crate::llm::{CompletionClient, Message, ToolCompletionClient};

/// System prompt for the prompt strategy. `{definitions}` is replaced with
/// one definition JSON per line.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"there are some functions defined below:
'''
{definitions}
'''

Your task is to choose a suitable function and output a formatted calling string: '''<func_name>(<arg1>,<arg2>,...)'''
output by the rules:
1. output without any explanation.
2. there is no space between the arguments since you need to save the space.
3. parameters is null means you should not pass any arguments.
"#;

enum Strategy {
    Prompt(Arc<dyn CompletionClient>),
    Tool(Arc<dyn ToolCompletionClient>),
}

#[derive(Default)]
struct ResolverState {
    functions: Vec<Arc<Function>>,
    name_index: HashMap<String, usize>,
    system_prompt: String,
}

/// Resolver asking a language model which function to call.
///
/// Built with [`LlmResolver::new`] it uses the prompt strategy: the model
/// sees every definition in its system prompt and answers with a call
/// string. Built with [`LlmResolver::with_tools`] it offers definitions as
/// tools and maps the first tool call back to positional arguments.
pub struct LlmResolver {
    strategy: Strategy,
    template: String,
    state: RwLock<ResolverState>,
}

impl LlmResolver {
    /// Prompt-strategy resolver.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_strategy(Strategy::Prompt(client))
    }

    /// Tool-calling resolver.
    pub fn with_tools(client: Arc<dyn ToolCompletionClient>) -> Self {
        Self::with_strategy(Strategy::Tool(client))
    }

    fn with_strategy(strategy: Strategy) -> Self {
        let resolver = Self {
            strategy,
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            state: RwLock::new(ResolverState::default()),
        };
        resolver.refresh_prompt();
        resolver
    }

    /// Replace the prompt template. It must contain `{definitions}`.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self.refresh_prompt();
        self
    }

    /// Whether the tool-calling strategy is used.
    pub fn uses_tools(&self) -> bool {
        matches!(self.strategy, Strategy::Tool(_))
    }

    /// Current system prompt of the prompt strategy.
    pub fn system_prompt(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .system_prompt
            .clone()
    }

    /// Definitions of every added function, in insertion order.
    pub fn definitions(&self) -> Vec<Definition> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .functions
            .iter()
            .map(|f| f.definition().clone())
            .collect()
    }

    fn find(&self, name: &str) -> Option<Arc<Function>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .name_index
            .get(name)
            .map(|&idx| Arc::clone(&state.functions[idx]))
    }

    fn refresh_prompt(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let lines: Vec<String> = state
            .functions
            .iter()
            .map(|f| f.definition().to_string())
            .collect();
        state.system_prompt = self.template.replace("{definitions}", &lines.join("\n"));
    }

    async fn resolve_by_prompt(&self, client: &dyn CompletionClient, input: &str) -> Result<Call> {
        let messages = [Message::system(self.system_prompt()), Message::user(input)];
        let choices = client.complete(&messages).await?;
        let choice = choices.first().ok_or(ResolverError::NoChoices)?;

        debug!(output = %choice.content, "model call string");
        Ok(parse_call_str(&choice.content)?)
    }

    async fn resolve_by_tool(&self, client: &dyn ToolCompletionClient, input: &str) -> Result<Call> {
        let messages = [Message::user(input)];
        let choices = client
            .complete_with_tools(&messages, &self.definitions())
            .await?;
        let choice = choices.first().ok_or(ResolverError::NoChoices)?;
        let tool_call = choice.tool_calls.first().ok_or(ResolverError::NoToolCalls)?;

        let function = self
            .find(&tool_call.name)
            .ok_or_else(|| ResolverError::UnknownFunction(tool_call.name.clone()))?;
        let params = order_tool_arguments(&function, &tool_call.arguments)?;
        Ok(Call::new(tool_call.name.as_str(), params))
    }
}

/// Map a JSON object of named arguments onto the external slots of
/// `function` in declaration order. Absent names become `null`.
fn order_tool_arguments(function: &Function, arguments: &str) -> Result<Params> {
    let named: Map<String, Value> = if arguments.trim().is_empty() {
        Map::new()
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| ResolverError::invalid_tool_arguments(function.name(), e.to_string()))?
    };

    let info = function
        .info()
        .with_context(|| format!("Cannot order arguments for function {}", function.name()))?;

    let mut slots: Vec<_> = info
        .params
        .iter()
        .filter(|p| !function.is_ignored(p.index))
        .collect();
    slots.sort_by_key(|p| p.index);

    let mut fragments = Vec::with_capacity(slots.len());
    for param in slots {
        let value = named.get(&param.name).unwrap_or(&Value::Null);
        fragments.push(serde_json::to_string(value)?);
    }
    Ok(Params::Raw(fragments))
}

#[async_trait::async_trait]
impl Resolver for LlmResolver {
    fn add_func(&self, function: Arc<Function>) -> bool {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.name_index.contains_key(function.name()) {
                return false;
            }
            let idx = state.functions.len();
            state.name_index.insert(function.name().to_string(), idx);
            state.functions.push(function);
        }
        self.refresh_prompt();
        true
    }

    async fn resolve(&self, input: &str) -> Result<Call> {
        let call = match &self.strategy {
            Strategy::Prompt(client) => self.resolve_by_prompt(client.as_ref(), input).await?,
            Strategy::Tool(client) => self.resolve_by_tool(client.as_ref(), input).await?,
        };
        debug!(function = %call.name, params = call.params.len(), "resolved call");
        Ok(call)
    }
}
