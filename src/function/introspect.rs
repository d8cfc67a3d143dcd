//! Best-effort source introspection of native functions.
//!
//! Reads the file recorded in a [`SourceSite`] and recovers the declared
//! `fn` item: its doc comment, its full source text and its parameter names
//! in positional order. Used by definers that describe a function from its
//! source and by the tool-calling resolver to order named arguments.

use crate::function::SourceSite;
use proc_macro2::LineColumn;
use serde::{Deserialize, Serialize};
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
	Attribute, Block, Expr, ExprLit, FnArg, ImplItemFn, ItemFn, Lit, Meta, Pat, Signature,
	Visibility,
};

/// Introspection record of a native function.
///
/// `params` is skipped on serialization; the serialized form is the payload
/// sent to a definer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncInfo {
	/// Declared item name.
	pub name: String,
	/// Doc comment, one line per `///` line, markers stripped.
	pub comments: String,
	/// Full source text of the item.
	pub source_code: String,
	/// Parameter names with their positional index.
	#[serde(skip)]
	pub params: Vec<ParamInfo>,
}

/// A named positional parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamInfo {
	/// Parameter name as declared.
	pub name: String,
	/// Positional slot index.
	pub index: usize,
}

impl FuncInfo {
	/// Build a record by hand, numbering `params` positionally.
	///
	/// Used with [`NativeFn::with_info`](crate::function::NativeFn::with_info)
	/// where source introspection is not possible.
	pub fn new<I, S>(name: impl Into<String>, comments: impl Into<String>, params: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			name: name.into(),
			comments: comments.into(),
			source_code: String::new(),
			params: params
				.into_iter()
				.enumerate()
				.map(|(index, name)| ParamInfo {
					name: name.into(),
					index,
				})
				.collect(),
		}
	}

	/// Positional index of the parameter called `name`.
	pub fn param_index(&self, name: &str) -> Option<usize> {
		self.params.iter().find(|p| p.name == name).map(|p| p.index)
	}

	/// Name of the parameter at slot `index`.
	pub fn param_name(&self, index: usize) -> Option<&str> {
		self.params
			.iter()
			.find(|p| p.index == index)
			.map(|p| p.name.as_str())
	}
}

pub(crate) fn from_site(site: &SourceSite, item: &str) -> Result<FuncInfo, String> {
	let path = site.resolve_path();
	let src = std::fs::read_to_string(&path)
		.map_err(|e| format!("failed to read source file {}: {}", path.display(), e))?;
	parse_fn_source(&src, item, Some(site.line))
}

/// Locate `fn item` in `src` and extract its introspection record.
///
/// Free functions, methods in `impl` blocks and functions nested in
/// modules or other function bodies are all found. When several
/// declarations match, the first one at or after `line_hint` wins, falling
/// back to the first one in the file.
pub fn parse_fn_source(src: &str, item: &str, line_hint: Option<u32>) -> Result<FuncInfo, String> {
	let file = syn::parse_file(src).map_err(|e| {
		let at = e.span().start();
		format!("failed to parse source at {}:{}: {}", at.line, at.column + 1, e)
	})?;

	let mut finder = FnFinder {
		item,
		found: Vec::new(),
	};
	finder.visit_file(&file);

	let hint = line_hint.unwrap_or(0) as usize;
	let found = finder
		.found
		.iter()
		.find(|f| f.line >= hint)
		.or_else(|| finder.found.first())
		.ok_or_else(|| format!("fn {} not found in source", item))?;

	let start = byte_offset(src, found.start).ok_or_else(|| format!("fn {} has no source span", item))?;
	let end = byte_offset(src, found.end).ok_or_else(|| format!("fn {} has no source span", item))?;

	Ok(FuncInfo {
		name: item.to_string(),
		comments: found.comments.clone(),
		source_code: src[start..end].to_string(),
		params: found.params.clone(),
	})
}

struct FoundFn {
	line: usize,
	start: LineColumn,
	end: LineColumn,
	comments: String,
	params: Vec<ParamInfo>,
}

struct FnFinder<'a> {
	item: &'a str,
	found: Vec<FoundFn>,
}

impl FnFinder<'_> {
	fn record(&mut self, attrs: &[Attribute], vis: &Visibility, sig: &Signature, block: &Block) {
		if sig.ident != self.item {
			return;
		}
		// the declaration starts at `pub` when present, after any attributes
		let start = match vis {
			Visibility::Inherited => sig.span().start(),
			_ => vis.span().start(),
		};
		self.found.push(FoundFn {
			line: sig.ident.span().start().line,
			start,
			end: block.span().end(),
			comments: doc_comment(attrs),
			params: param_names(sig),
		});
	}
}

impl<'ast> Visit<'ast> for FnFinder<'_> {
	fn visit_item_fn(&mut self, f: &'ast ItemFn) {
		self.record(&f.attrs, &f.vis, &f.sig, &f.block);
		visit::visit_item_fn(self, f);
	}

	fn visit_impl_item_fn(&mut self, f: &'ast ImplItemFn) {
		self.record(&f.attrs, &f.vis, &f.sig, &f.block);
		visit::visit_impl_item_fn(self, f);
	}
}

/// Byte offset of a span position; columns count chars.
fn byte_offset(src: &str, at: LineColumn) -> Option<usize> {
	let line_start = if at.line <= 1 {
		0
	} else {
		src.match_indices('\n').nth(at.line - 2)?.0 + 1
	};
	let rest = &src[line_start..];
	let col = rest
		.char_indices()
		.nth(at.column)
		.map(|(i, _)| i)
		.unwrap_or(rest.len());
	Some(line_start + col)
}

/// Joins `///`, `/** */` and `#[doc = ".."]` attributes, one line each.
fn doc_comment(attrs: &[Attribute]) -> String {
	let mut lines = Vec::new();
	for attr in attrs.iter().filter(|a| a.path().is_ident("doc")) {
		let Meta::NameValue(nv) = &attr.meta else {
			continue;
		};
		let Expr::Lit(ExprLit {
			lit: Lit::Str(text), ..
		}) = &nv.value
		else {
			continue;
		};
		for line in text.value().lines() {
			lines.push(line.strip_prefix(' ').unwrap_or(line).trim_end().to_string());
		}
	}
	while lines.first().is_some_and(|l| l.is_empty()) {
		lines.remove(0);
	}
	while lines.last().is_some_and(|l| l.is_empty()) {
		lines.pop();
	}
	lines.join("\n")
}

fn param_names(sig: &Signature) -> Vec<ParamInfo> {
	sig.inputs
		.iter()
		.filter_map(|arg| match arg {
			FnArg::Receiver(_) => None,
			FnArg::Typed(pat) => Some(pat),
		})
		.enumerate()
		.map(|(index, pat)| {
			let name = match pat.pat.as_ref() {
				Pat::Ident(ident) => ident.ident.to_string(),
				Pat::Wild(_) => "_".to_string(),
				_ => format!("arg{}", index),
			};
			ParamInfo { name, index }
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	const SRC: &str = r#"
use std::fmt;

/// Return a greeting for a person.
/// Mentions their age.
#[inline]
pub fn greet(name: String, age: i64) -> String {
    format!("Hello, {}! You are {} years old.", name, age)
}

fn no() -> &'static str {
    let brace = '{';
    "Sorry, I can't help you with that. }"
}

// not a doc comment
fn apply<F: Fn(i64) -> i64>(f: F, mut values: Vec<(i64, i64)>) -> i64 {
    /* } */
    values.iter().map(|(a, b)| f(a + b)).sum()
}

impl Greeter {
    fn hello(&self, who: &str) {}
}
"#;

	#[test]
	fn test_parse_with_doc_comment() {
		let info = parse_fn_source(SRC, "greet", None).unwrap();
		assert_eq!(info.name, "greet");
		assert_eq!(info.comments, "Return a greeting for a person.\nMentions their age.");
		assert!(info.source_code.starts_with("pub fn greet(name: String, age: i64)"));
		assert!(info.source_code.ends_with('}'));
		assert_eq!(info.param_index("name"), Some(0));
		assert_eq!(info.param_index("age"), Some(1));
		assert_eq!(info.param_name(1), Some("age"));
	}

	#[test]
	fn test_parse_skips_literals_in_body() {
		let info = parse_fn_source(SRC, "no", None).unwrap();
		assert!(info.comments.is_empty());
		assert!(info.params.is_empty());
		assert!(info.source_code.ends_with("that. }\"\n}"));
	}

	#[test]
	fn test_parse_generics_and_patterns() {
		let info = parse_fn_source(SRC, "apply", None).unwrap();
		assert!(info.comments.is_empty());
		let names: Vec<_> = info.params.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, vec!["f", "values"]);
		assert!(info.source_code.contains("sum()"));
	}

	#[test]
	fn test_parse_method_skips_self() {
		let info = parse_fn_source(SRC, "hello", None).unwrap();
		assert_eq!(info.params.len(), 1);
		assert_eq!(info.param_index("who"), Some(0));
	}

	#[test]
	fn test_line_hint_prefers_later_declaration() {
		let src = "fn dup(a: i64) {}\n\nfn dup(b: i64) {}\n";
		let first = parse_fn_source(src, "dup", None).unwrap();
		assert_eq!(first.param_index("a"), Some(0));
		let second = parse_fn_source(src, "dup", Some(2)).unwrap();
		assert_eq!(second.param_index("b"), Some(0));
		let fallback = parse_fn_source(src, "dup", Some(99)).unwrap();
		assert_eq!(fallback.param_index("a"), Some(0));
	}

	#[test]
	fn test_raw_strings_do_not_end_body() {
		let src = concat!(
			"fn quote() -> &'static str {\n",
			"    r#\"a \"}\" b\"#\n",
			"}\n",
			"\n",
			"fn path() -> &'static str { r\"C:\\\" }\n",
		);
		let quote = parse_fn_source(src, "quote", None).unwrap();
		assert_eq!(quote.source_code, "fn quote() -> &'static str {\n    r#\"a \"}\" b\"#\n}");

		let path = parse_fn_source(src, "path", None).unwrap();
		assert_eq!(path.source_code, "fn path() -> &'static str { r\"C:\\\" }");
	}

	#[test]
	fn test_block_and_attribute_docs() {
		let src = r#"
/** Look up the weather.
Returns a short summary. */
#[doc = "Cached for a minute."]
pub(crate) async fn weather(city: &str, _: u8, (a, b): (i64, i64)) {}
"#;
		let info = parse_fn_source(src, "weather", None).unwrap();
		assert_eq!(
			info.comments,
			"Look up the weather.\nReturns a short summary.\nCached for a minute."
		);
		assert!(info.source_code.starts_with("pub(crate) async fn weather("));
		let names: Vec<_> = info.params.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, vec!["city", "_", "arg2"]);
	}

	#[test]
	fn test_nested_fn_found() {
		let src = "mod inner {\n    fn outer() {\n        fn helper(x: i64) -> i64 { x }\n    }\n}\n";
		let info = parse_fn_source(src, "helper", None).unwrap();
		assert_eq!(info.source_code, "fn helper(x: i64) -> i64 { x }");
		assert_eq!(info.param_index("x"), Some(0));
	}

	#[test]
	fn test_invalid_source() {
		let err = parse_fn_source("fn broken( {", "broken", None).unwrap_err();
		assert!(err.starts_with("failed to parse source at"));
	}

	#[test]
	fn test_missing_fn() {
		let err = parse_fn_source(SRC, "weather", None).unwrap_err();
		assert!(err.contains("fn weather not found"));
	}

	#[test]
	fn test_serialized_payload_omits_params() {
		let info = parse_fn_source(SRC, "greet", None).unwrap();
		let json = serde_json::to_value(&info).unwrap();
		assert_eq!(json["name"], "greet");
		assert!(json.get("source_code").is_some());
		assert!(json.get("params").is_none());
	}
}
