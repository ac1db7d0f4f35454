//! Projection of the authorization service's JSON response onto request headers.
//!
//! Only the top-level fields of the response object are considered. Each configured
//! attribute is looked up by exact (case-sensitive) name and, if its value has a
//! string form, emitted under the configured header name. Missing attributes and
//! values without a string form are skipped; neither is an error.

use serde_json::{Map, Number, Value as JsonValue};

use crate::http::HeaderName;
use crate::*;

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;

/// Decoded body of a successful authorization response.
pub type ResponseBody = Map<String, JsonValue>;

/// The shapes a response attribute can take, as far as header projection is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue<'a> {
	Bool(bool),
	Number(&'a Number),
	String(&'a str),
	List(Vec<AttributeValue<'a>>),
	Unsupported,
}

impl<'a> From<&'a JsonValue> for AttributeValue<'a> {
	fn from(value: &'a JsonValue) -> Self {
		match value {
			JsonValue::Bool(b) => AttributeValue::Bool(*b),
			JsonValue::Number(n) => AttributeValue::Number(n),
			JsonValue::String(s) => AttributeValue::String(s),
			JsonValue::Array(items) => AttributeValue::List(items.iter().map(Self::from).collect()),
			JsonValue::Null | JsonValue::Object(_) => AttributeValue::Unsupported,
		}
	}
}

impl AttributeValue<'_> {
	/// Render the value as a header string. Lists are comma joined in order, and
	/// a single unsupported element makes the whole list unsupported.
	pub fn stringify(&self) -> Option<String> {
		match self {
			AttributeValue::Bool(b) => Some(b.to_string()),
			AttributeValue::Number(n) => Some(n.to_string()),
			AttributeValue::String(s) => Some(s.to_string()),
			AttributeValue::List(items) => items
				.iter()
				.map(AttributeValue::stringify)
				.collect::<Option<Vec<_>>>()
				.map(|parts| parts.join(",")),
			AttributeValue::Unsupported => None,
		}
	}
}

pub fn stringify(value: &JsonValue) -> Option<String> {
	AttributeValue::from(value).stringify()
}

/// Decode a response body. Anything other than a JSON object is rejected.
pub fn decode_body(body: &[u8]) -> Result<ResponseBody, serde_json::Error> {
	serde_json::from_slice(body)
}

/// Build the headers to inject for a decoded response.
///
/// The order of the result follows the iteration order of `attribute_to_header`,
/// which is unspecified.
pub fn extract_response_headers(
	body: &ResponseBody,
	attribute_to_header: &HashMap<String, HeaderName>,
) -> Vec<(HeaderName, String)> {
	attribute_to_header
		.iter()
		.filter_map(|(attribute, header)| {
			let raw = body.get(attribute)?;
			match stringify(raw) {
				Some(value) => Some((header.clone(), value)),
				None => {
					trace!(%attribute, "attribute has no string form, skipping");
					None
				},
			}
		})
		.collect()
}
