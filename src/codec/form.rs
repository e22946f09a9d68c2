//! Form-urlencoded bodies.
//!
//! Models are flattened through their JSON representation, so the pair keys
//! are the serde field names (renames included). Top-level scalars become a
//! single pair, arrays repeat the key once per element, nulls are skipped and
//! nested objects are sent as JSON text.

use super::CodecError;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

/// Encodes a model as an `application/x-www-form-urlencoded` body.
///
/// ```rust
/// use courier::codec::encode_form;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Token<'a> {
///     grant_type: &'a str,
///     #[serde(rename = "client_id")]
///     client: &'a str,
/// }
///
/// let body = encode_form(&Token { grant_type: "client_credentials", client: "a b" }).unwrap();
/// assert_eq!(body.as_ref(), b"client_id=a+b&grant_type=client_credentials");
/// ```
pub fn encode_form<T: Serialize>(value: &T) -> Result<Bytes, CodecError> {
    let fields = match serde_json::to_value(value)? {
        Value::Object(fields) => fields,
        other => {
            return Err(CodecError::Form(format!(
                "expected a struct or map, got {}",
                kind_of(&other)
            )))
        }
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        serializer.append_pair(key, &text);
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    serializer.append_pair(key, &text);
                }
            }
        }
    }

    Ok(Bytes::from(serializer.finish()))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Search {
        query: String,
        page: u32,
        exact: bool,
        cursor: Option<String>,
        tags: Vec<&'static str>,
    }

    #[test]
    fn test_flattens_struct_fields() {
        let search = Search {
            query: "rust & go".to_string(),
            page: 2,
            exact: false,
            cursor: None,
            tags: vec!["a", "b"],
        };

        let body = encode_form(&search).unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "exact=false&page=2&query=rust+%26+go&tags=a&tags=b"
        );
    }

    #[test]
    fn test_nested_object_is_json_text() {
        let mut outer = BTreeMap::new();
        let mut inner = BTreeMap::new();
        inner.insert("k", 1);
        outer.insert("filter", inner);

        let body = encode_form(&outer).unwrap();
        assert_eq!(body.as_ref(), b"filter=%7B%22k%22%3A1%7D");
    }

    #[test]
    fn test_rejects_non_object() {
        let result = encode_form(&vec![1, 2, 3]);
        match result {
            Err(CodecError::Form(message)) => assert!(message.contains("an array")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
