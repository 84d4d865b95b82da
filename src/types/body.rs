//! Request bodies and response payloads

use serde::Serialize;
use serde_json::Value;

use crate::error::{DataApiError, Result};

// ============================================================================
// Request Body
// ============================================================================

/// Body sent with a write request
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// No body
    #[default]
    Empty,
    /// Structured value, serialized to JSON text before sending
    Json(Value),
    /// Text sent verbatim
    Text(String),
}

impl Body {
    /// Build a JSON body from any serializable value
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::JsonEncode` if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| DataApiError::json_encode(e.to_string()))
    }

    /// A `null` JSON value or an empty string is treated as no body at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Json(value) => value.is_null(),
            Self::Text(text) => text.is_empty(),
        }
    }

    /// Name of the body's shape, used in error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) | Self::Json(Value::String(_)) => "string",
            Self::Json(Value::Number(_)) => "number",
            Self::Json(Value::Bool(_)) => "boolean",
            Self::Empty | Self::Json(Value::Null) => "null",
            Self::Json(Value::Array(_) | Value::Object(_)) => "object",
        }
    }

    /// Whether the body is an object or array
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Json(Value::Array(_) | Value::Object(_)))
    }

    /// Render the body as the text that goes on the wire, `None` when empty
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::JsonEncode` if serialization fails.
    pub fn to_wire(&self) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        match self {
            Self::Json(value) => serde_json::to_string(value)
                .map(Some)
                .map_err(|e| DataApiError::json_encode(e.to_string())),
            Self::Text(text) => Ok(Some(text.clone())),
            Self::Empty => Ok(None),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(body: Option<T>) -> Self {
        body.map_or(Self::Empty, Into::into)
    }
}

impl From<()> for Body {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

// ============================================================================
// Response Payload
// ============================================================================

/// Parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON document (`json = true`)
    Json(Value),
    /// Raw text (`json = false`)
    Text(String),
}

impl Payload {
    /// Borrow the JSON value, if this is a JSON payload
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Borrow the text, if this is a text payload
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Convert into a JSON value, parsing text payloads
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::JsonDecode` if a text payload is not valid JSON.
    pub fn into_json(self) -> Result<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }

    /// Deserialize the payload into a typed value
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::JsonDecode` if the payload does not match `T`.
    pub fn deserialize<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.into_json()?)?)
    }
}
