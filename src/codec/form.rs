//! `application/x-www-form-urlencoded` request bodies.
//!
//! Only flat string-to-string mappings are accepted. Pairs keep the order in
//! which the body serializes its keys (struct field order, or insertion order
//! for `serde_json::Map`/ordered maps).

use serde::Serialize;
use serde_json::Value;

use crate::error::{HttpError, HttpResult};

fn serialization(reason: impl Into<String>) -> HttpError {
    HttpError::Serialization {
        format: "form",
        reason: reason.into(),
    }
}

pub fn encode<B>(body: &B) -> HttpResult<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    let value = serde_json::to_value(body).map_err(|e| serialization(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(serialization("form body must be a string-to-string mapping"));
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in &map {
        match value {
            Value::String(s) => pairs.push((key.as_str(), s.as_str())),
            _ => {
                return Err(serialization(format!(
                    "form field '{}' is not a string",
                    key
                )))
            }
        }
    }

    serde_urlencoded::to_string(&pairs)
        .map(String::into_bytes)
        .map_err(|e| serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pairs_keep_insertion_order() {
        let bytes = encode(&json!({"a": "1", "b": "2"})).unwrap();
        assert_eq!(bytes, b"a=1&b=2");

        let bytes = encode(&json!({"b": "2", "a": "1"})).unwrap();
        assert_eq!(bytes, b"b=2&a=1");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let bytes = encode(&json!({"q": "a&b=c", "name": "José"})).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "q=a%26b%3Dc&name=Jos%C3%A9");
    }

    #[derive(Serialize)]
    struct Login<'a> {
        username: &'a str,
        password: &'a str,
    }

    #[test]
    fn test_struct_fields_in_declaration_order() {
        let bytes = encode(&Login {
            username: "u",
            password: "p",
        })
        .unwrap();
        assert_eq!(bytes, b"username=u&password=p");
    }

    #[test]
    fn test_rejects_non_flat_bodies() {
        for body in [json!({"a": 1}), json!({"a": {"b": "c"}}), json!(["a", "b"]), json!("a=1")] {
            let err = encode(&body).unwrap_err();
            assert!(matches!(err, HttpError::Serialization { format: "form", .. }));
        }
    }
}
