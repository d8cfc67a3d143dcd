//! Call-string grammar: `name(arg1,arg2,...)`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::value::RawValue;

use super::{ResolverError, ResolverResult};
use crate::function::{Call, Params};

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+)\((.*)\)").unwrap_or_else(|e| panic!("call regex: {e}")))
}

/// Parse a call string into a [`Call`] with raw parameters.
///
/// The first `identifier(...)` in `input` is taken; surrounding text is
/// ignored. The argument list is read as the body of a JSON array and each
/// element is kept as its own fragment, preserving its source text.
///
/// # Example
///
/// ```
/// use nlcall::resolver::parse_call_str;
///
/// let call = parse_call_str(r#"greet("Ann",30)"#).unwrap();
/// assert_eq!(call.name, "greet");
/// assert_eq!(call.params.raw_at(0), Some("\"Ann\""));
/// assert_eq!(call.params.raw_at(1), Some("30"));
/// ```
pub fn parse_call_str(input: &str) -> ResolverResult<Call> {
    let caps = call_regex()
        .captures(input)
        .ok_or_else(|| ResolverError::FuncStrParse(input.to_string()))?;
    let name = &caps[1];
    let args = &caps[2];

    let fragments: Vec<Box<RawValue>> = serde_json::from_str(&format!("[{}]", args))
        .map_err(|_| ResolverError::InvalidParams(args.to_string()))?;

    Ok(Call::new(
        name,
        Params::raw(fragments.iter().map(|f| f.get().to_string())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let call = parse_call_str(r#"greet("李宁",15)"#).unwrap();
        assert_eq!(call.name, "greet");
        assert_eq!(call.params, Params::raw(["\"李宁\"", "15"]));
    }

    #[test]
    fn test_parse_no_args() {
        let call = parse_call_str("no()").unwrap();
        assert_eq!(call.name, "no");
        assert!(call.params.is_empty());
        assert!(call.params.is_raw());
    }

    #[test]
    fn test_parse_nested_fragments() {
        let call = parse_call_str(r#"add([1,2,4])"#).unwrap();
        assert_eq!(call.params, Params::raw(["[1,2,4]"]));

        let call = parse_call_str(r#"f({"a":[1,"x)"]},null, true)"#).unwrap();
        assert_eq!(call.params.len(), 3);
        assert_eq!(call.params.raw_at(0), Some(r#"{"a":[1,"x)"]}"#));
        assert_eq!(call.params.raw_at(1), Some("null"));
        assert_eq!(call.params.raw_at(2), Some("true"));
    }

    #[test]
    fn test_parse_surrounding_text() {
        let call = parse_call_str("'''weather(\"Paris\")'''").unwrap();
        assert_eq!(call.name, "weather");
        assert_eq!(call.params.raw_at(0), Some("\"Paris\""));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_call_str("I cannot help with that"),
            Err(ResolverError::FuncStrParse(_))
        ));
        assert!(matches!(
            parse_call_str("greet(Ann,30)"),
            Err(ResolverError::InvalidParams(p)) if p == "Ann,30"
        ));
    }
}
