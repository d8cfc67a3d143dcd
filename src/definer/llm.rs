//! Definitions written by a language model.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Definer;
use crate::function::{Definition, NativeFn};
use crate::llm::{CompletionClient, Message};

/// System prompt sent with every definition request.
pub const DEFAULT_DEFINER_PROMPT: &str = r#"Your task is to output a formatted json string that defines a rust function. you will receive a json string like:
{
	"name": "<fn_name>",
	"comments": "<fn_doc_comments>",
	"source_code": "<fn_source_code>"
}
try to understand the info, your output should be an informative json string like:
'''
{"name":"greet","description":"return a person's greeting with his/her name and age. Calling example: greet(\"Ann\",15) or greet(\"jack\",14)","parameters":{"properties":{"name":{"description":"the person's name","type":"string"},"age":{"description":"the person's age","type":"integer"}},"type":"object"}}
{"name":"no","description":"use this func if there's no suitable function for user's input or user's request is unrelated to the existed funcs. Calling example: no()","parameters":null}
{"name":"add","description":"return the sum of integers. Calling example: add([1,1]) add([1,2,4]). be aware that the input must be a list of integers","parameters":{"properties":{"nums":{"description":"multiple integers which will be added together","type":"array","items":{"type":"integer"}}},"type":"object"}}
'''
follow the rules:
1. output without any explanation.
2. output the json string in one line.
3. list properties in the same order as the function parameters.
"#;

/// Definer backed by a completion client.
pub struct LlmDefiner {
    client: Arc<dyn CompletionClient>,
    system_prompt: String,
}

impl LlmDefiner {
    /// Create a definer using the default system prompt.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            system_prompt: DEFAULT_DEFINER_PROMPT.to_string(),
        }
    }

    /// Replace the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    fn user_message(native: &NativeFn, ignored: &[usize]) -> Result<String> {
        let info = native
            .info()
            .with_context(|| format!("Cannot describe function {}", native.name()))?;
        let mut payload = serde_json::to_string(info.as_ref())?;

        let supplied: Vec<&str> = ignored
            .iter()
            .filter_map(|&i| info.param_name(i))
            .collect();
        if !supplied.is_empty() {
            payload.push_str(&format!(
                "\nthese parameters are supplied by the program, leave them out of the definition: {}",
                supplied.join(", ")
            ));
        }
        Ok(payload)
    }
}

/// Cut the outermost JSON object out of model output that may carry fences
/// or quotes around it.
fn extract_json_object(output: &str) -> &str {
    match (output.find('{'), output.rfind('}')) {
        (Some(start), Some(end)) if start < end => &output[start..=end],
        _ => output.trim(),
    }
}

#[async_trait::async_trait]
impl Definer for LlmDefiner {
    async fn define(&self, native: &NativeFn, ignored: &[usize]) -> Result<Definition> {
        let messages = [
            Message::system(self.system_prompt.as_str()),
            Message::user(Self::user_message(native, ignored)?),
        ];
        let choices = self.client.complete(&messages).await?;
        let choice = choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("no choices returned"))?;

        debug!(function = %native.name(), output = %choice.content, "model definition");
        let mut definition: Definition = serde_json::from_str(extract_json_object(&choice.content))
            .with_context(|| format!("Invalid definition for function {}", native.name()))?;

        if definition.name != native.name() {
            warn!(
                expected = %native.name(),
                got = %definition.name,
                "model renamed function, keeping declared name"
            );
            definition.name = native.name().to_string();
        }
        Ok(definition)
    }
}
