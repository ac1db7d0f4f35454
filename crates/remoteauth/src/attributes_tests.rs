use rstest::rstest;
use serde_json::json;

use super::*;

fn scenario_mapping() -> HashMap<String, HeaderName> {
	HashMap::from([
		(
			"userid".to_string(),
			HeaderName::from_static("x-auth-subject-id"),
		),
		(
			"isserver".to_string(),
			HeaderName::from_static("x-auth-server-access"),
		),
		("roles".to_string(), HeaderName::from_static("x-auth-roles")),
		(
			"not-present".to_string(),
			HeaderName::from_static("x-auth-not-present"),
		),
	])
}

fn as_map(headers: Vec<(HeaderName, String)>) -> HashMap<String, String> {
	headers
		.into_iter()
		.map(|(k, v)| (k.as_str().to_string(), v))
		.collect()
}

#[rstest]
#[case::bool_true(json!(true), Some("true"))]
#[case::bool_false(json!(false), Some("false"))]
#[case::integer(json!(123456), Some("123456"))]
#[case::negative_integer(json!(-7), Some("-7"))]
#[case::float(json!(1.5), Some("1.5"))]
#[case::string(json!("admin"), Some("admin"))]
#[case::empty_string(json!(""), Some(""))]
#[case::string_list(json!(["admin", "user"]), Some("admin,user"))]
#[case::mixed_scalar_list(json!(["a", 1, true]), Some("a,1,true"))]
#[case::nested_list(json!([["a", "b"], "c"]), Some("a,b,c"))]
#[case::empty_list(json!([]), Some(""))]
#[case::null(json!(null), None)]
#[case::object(json!({"a": 1}), None)]
#[case::list_with_null(json!(["a", null]), None)]
#[case::list_with_object(json!(["a", {"b": 1}]), None)]
#[case::nested_list_with_null(json!([["a", null]]), None)]
fn test_stringify(#[case] value: JsonValue, #[case] expected: Option<&str>) {
	assert_eq!(stringify(&value).as_deref(), expected);
}

#[test]
fn test_attribute_value_from_json() {
	let value = json!(["x", 2, false, null]);
	let AttributeValue::List(items) = AttributeValue::from(&value) else {
		panic!("expected a list");
	};
	assert_eq!(items.len(), 4);
	assert_eq!(items[0], AttributeValue::String("x"));
	assert!(matches!(items[1], AttributeValue::Number(n) if n.as_i64() == Some(2)));
	assert_eq!(items[2], AttributeValue::Bool(false));
	assert_eq!(items[3], AttributeValue::Unsupported);
}

#[test]
fn test_extract_headers() {
	let body = decode_body(
		br#"{"userid":"123456", "isserver": true, "roles": ["admin", "user"]}"#,
	)
	.unwrap();
	let headers = extract_response_headers(&body, &scenario_mapping());
	assert_eq!(headers.len(), 3);

	let headers = as_map(headers);
	assert_eq!(headers["x-auth-subject-id"], "123456");
	assert_eq!(headers["x-auth-server-access"], "true");
	assert_eq!(headers["x-auth-roles"], "admin,user");
	assert!(!headers.contains_key("x-auth-not-present"));
}

#[test]
fn test_extract_headers_is_deterministic() {
	let body = decode_body(
		br#"{"userid":"123456", "isserver": true, "roles": ["admin", "user"]}"#,
	)
	.unwrap();
	let mapping = scenario_mapping();
	let first = as_map(extract_response_headers(&body, &mapping));
	for _ in 0..10 {
		assert_eq!(as_map(extract_response_headers(&body, &mapping)), first);
	}
}

#[test]
fn test_extract_skips_unsupported_values() {
	let body = decode_body(
		br#"{"userid": null, "isserver": {"nested": true}, "roles": ["admin", {"x": 1}]}"#,
	)
	.unwrap();
	let headers = extract_response_headers(&body, &scenario_mapping());
	assert!(headers.is_empty(), "unexpected headers {headers:?}");
}

#[test]
fn test_extract_attribute_names_are_case_sensitive() {
	let body = decode_body(br#"{"UserId": "123456"}"#).unwrap();
	let headers = extract_response_headers(&body, &scenario_mapping());
	assert!(headers.is_empty());
}

#[test]
fn test_extract_same_header_from_multiple_attributes() {
	let body = decode_body(br#"{"a": "1", "b": "2"}"#).unwrap();
	let mapping = HashMap::from([
		("a".to_string(), HeaderName::from_static("x-both")),
		("b".to_string(), HeaderName::from_static("x-both")),
	]);
	let mut values: Vec<_> = extract_response_headers(&body, &mapping)
		.into_iter()
		.map(|(_, v)| v)
		.collect();
	values.sort();
	assert_eq!(values, vec!["1", "2"]);
}

#[test]
fn test_extract_empty_mapping() {
	let body = decode_body(br#"{"userid": "123456"}"#).unwrap();
	assert!(extract_response_headers(&body, &HashMap::new()).is_empty());
}

#[rstest]
#[case::malformed(b"{\"userid\": ".as_slice())]
#[case::not_json(b"hello".as_slice())]
#[case::empty(b"".as_slice())]
#[case::array(b"[1, 2]".as_slice())]
#[case::string(b"\"allowed\"".as_slice())]
#[case::null(b"null".as_slice())]
fn test_decode_rejects_non_objects(#[case] body: &[u8]) {
	assert!(decode_body(body).is_err());
}
