//! XML codec backed by `quick-xml`'s serde support.
//!
//! The root element is named after the serialized type. Maps and bare
//! sequences have no root name and fail to encode.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{HttpError, HttpResult};

pub fn encode<B>(body: &B) -> HttpResult<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    quick_xml::se::to_string(body)
        .map(String::into_bytes)
        .map_err(|e| HttpError::Serialization {
            format: "xml",
            reason: e.to_string(),
        })
}

pub fn decode<T>(bytes: &[u8]) -> HttpResult<T>
where
    T: DeserializeOwned,
{
    let deserialization = |reason: String| HttpError::Deserialization {
        format: "xml",
        reason,
    };
    let text = std::str::from_utf8(bytes).map_err(|e| deserialization(e.to_string()))?;
    quick_xml::de::from_str(text).map_err(|e| deserialization(e.to_string()))
}
