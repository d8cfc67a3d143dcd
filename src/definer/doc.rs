//! Definitions derived from doc comments and signatures.

use anyhow::{Context, Result};
use serde_json::{json, Map};

use super::Definer;
use crate::function::{Definition, NativeFn};

/// Definer that needs no model.
///
/// The description is the function's doc comment. Each external slot
/// becomes a required property named after the declared parameter and
/// typed from its [`SlotType`](crate::function::SlotType). Functions without
/// external slots get a `null` schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocDefiner;

impl DocDefiner {
    /// Create a doc definer.
    pub fn new() -> Self {
        Self
    }

    /// Build the definition synchronously.
    pub fn define_now(&self, native: &NativeFn, ignored: &[usize]) -> Result<Definition> {
        let info = native
            .info()
            .with_context(|| format!("Cannot describe function {}", native.name()))?;

        let description = if info.comments.trim().is_empty() {
            native.name().to_string()
        } else {
            info.comments.trim().to_string()
        };

        let signature = native.signature();
        let mut properties = Map::new();
        let mut required = Vec::new();
        for index in (0..signature.arity()).filter(|i| !ignored.contains(i)) {
            let name = info
                .param_name(index)
                .map(str::to_string)
                .unwrap_or_else(|| format!("arg{}", index));
            let schema = signature
                .slot_type(index)
                .map(|ty| ty.json_schema())
                .unwrap_or_else(|| json!({}));
            required.push(name.clone());
            properties.insert(name, schema);
        }

        if properties.is_empty() {
            return Ok(Definition::without_parameters(native.name(), description));
        }
        Ok(Definition::new(
            native.name(),
            description,
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        ))
    }
}

#[async_trait::async_trait]
impl Definer for DocDefiner {
    async fn define(&self, native: &NativeFn, ignored: &[usize]) -> Result<Definition> {
        self.define_now(native, ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{FuncInfo, Signature, SlotType};

    /// Return a person's greeting.
    fn greet(name: String, age: i64) -> String {
        format!("Hello, {}! You are {} years old.", name, age)
    }

    #[test]
    fn test_define_from_source() {
        let native = NativeFn::new(
            "greet",
            Signature::new().param(SlotType::Str).param(SlotType::Int),
            |args| Ok(vec![greet(args.str(0)?.to_string(), args.int(1)?).into()]),
        )
        .at(crate::source_site!(greet));

        let def = DocDefiner::new().define_now(&native, &[]).unwrap();
        assert_eq!(def.name, "greet");
        assert_eq!(def.description, "Return a person's greeting.");
        let params = def.parameters.unwrap();
        assert_eq!(params["properties"]["name"]["type"], "string");
        assert_eq!(params["properties"]["age"]["type"], "integer");
        assert_eq!(params["required"], json!(["name", "age"]));
    }

    #[test]
    fn test_define_skips_ignored_slots() {
        let native = NativeFn::new(
            "add",
            Signature::new().param(SlotType::Opaque).variadic(SlotType::Int),
            |_| Ok(vec![]),
        )
        .with_info(FuncInfo::new("add", "Sum integers", ["ctx", "nums"]));

        let def = DocDefiner::new().define_now(&native, &[0]).unwrap();
        let params = def.parameters.unwrap();
        assert!(params["properties"].get("ctx").is_none());
        assert_eq!(params["properties"]["nums"]["type"], "array");
        assert_eq!(params["properties"]["nums"]["items"]["type"], "integer");
    }

    #[test]
    fn test_define_without_external_params() {
        let native = NativeFn::new("now", Signature::new().param(SlotType::Opaque), |_| Ok(vec![]))
            .with_info(FuncInfo::new("now", "", ["ctx"]));

        let def = DocDefiner::new().define_now(&native, &[0]).unwrap();
        assert!(def.parameters.is_none());
        assert_eq!(def.description, "now");
    }

    #[test]
    fn test_define_without_introspection() {
        let native = NativeFn::new("anon", Signature::new(), |_| Ok(vec![]));
        let err = DocDefiner::new().define_now(&native, &[]).unwrap_err();
        assert!(err.to_string().contains("anon"));
    }

    #[tokio::test]
    async fn test_define_via_trait() {
        let native = NativeFn::new("no", Signature::new(), |_| Ok(vec![]))
            .with_info(FuncInfo::new("no", "Nothing fits", Vec::<String>::new()));
        let definer: &dyn Definer = &DocDefiner;
        let def = definer.define(&native, &[]).await.unwrap();
        assert_eq!(def, Definition::without_parameters("no", "Nothing fits"));
    }
}
