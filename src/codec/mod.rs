//! Body codecs.
//!
//! # Data Flow
//! ```text
//! Request side:   typed body → Format::parse(tag) → encode → Body { bytes, content_type }
//! Response side:  bytes      → Format::parse_response(tag) → decode → T
//! ```
//!
//! # Design Decisions
//! - Formats are an explicit enum; dispatch is a match, never a runtime type check
//! - `form` is request-only
//! - JSON field names match case-insensitively on decode

pub mod form;
pub mod json;
pub mod xml;

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{HttpError, HttpResult};
use crate::http::request::Body;

/// Supported wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Xml,
    Form,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Form => "form",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml",
            Format::Form => "application/x-www-form-urlencoded",
        }
    }

    /// Parse a format usable for response bodies (`form` is rejected).
    pub fn parse_response(tag: &str) -> HttpResult<Self> {
        match tag.parse::<Format>()? {
            Format::Form => Err(HttpError::UnsupportedFormat(tag.to_string())),
            format => Ok(format),
        }
    }
}

impl FromStr for Format {
    type Err = HttpError;

    /// Accepts short tags (`json`, `xml`, `form`) and their MIME types,
    /// case-insensitively. Media type parameters are ignored.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let essence = tag.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "json" | "application/json" => Ok(Format::Json),
            "xml" | "application/xml" | "text/xml" => Ok(Format::Xml),
            "form" | "application/x-www-form-urlencoded" => Ok(Format::Form),
            _ => Err(HttpError::UnsupportedFormat(tag.to_string())),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode `body` in the given format.
pub fn encode<B>(body: &B, format: Format) -> HttpResult<Body>
where
    B: Serialize + ?Sized,
{
    let bytes = match format {
        Format::Json => json::encode(body)?,
        Format::Xml => xml::encode(body)?,
        Format::Form => form::encode(body)?,
    };
    Ok(Body {
        bytes,
        content_type: format.content_type(),
    })
}

/// Decode `bytes` into `T` using the given format.
pub fn decode<T>(bytes: &[u8], format: Format) -> HttpResult<T>
where
    T: DeserializeOwned,
{
    match format {
        Format::Json => json::decode(bytes),
        Format::Xml => xml::decode(bytes),
        Format::Form => Err(HttpError::UnsupportedFormat(format.as_str().to_string())),
    }
}
