use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorMetadata};

/// Generic `{statusCode, message, data}` envelope the HTTP layer answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recoverable: Option<bool>,
}

impl<T> ResponseEnvelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            message: message.into(),
            data: Some(data),
            error_code: None,
            recoverable: None,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: 201,
            message: message.into(),
            data: Some(data),
            error_code: None,
            recoverable: None,
        }
    }

    /// Build an error envelope.
    ///
    /// Sensitive errors only expose their client message in production; elsewhere the
    /// full source chain is included.
    pub fn from_error(err: &AppError, production: bool) -> Self {
        let message = if err.is_sensitive() && !production {
            err.detailed_message()
        } else {
            err.client_message()
        };
        Self {
            status_code: err.http_status_code(),
            message,
            data: None,
            error_code: Some(err.error_code().to_string()),
            recoverable: Some(err.is_recoverable()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_camel_case() {
        let envelope = ResponseEnvelope::created(42, "Audio uploaded");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["message"], "Audio uploaded");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn error_envelope_hides_internal_details_in_production() {
        let err = AppError::Storage("bucket unreachable at 10.0.0.7".to_string());
        let envelope: ResponseEnvelope<()> = ResponseEnvelope::from_error(&err, true);
        assert_eq!(envelope.status_code, 500);
        assert_eq!(envelope.message, "Failed to access storage");
        assert_eq!(envelope.error_code.as_deref(), Some("STORAGE_ERROR"));
        assert_eq!(envelope.recoverable, Some(true));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn error_envelope_shows_details_outside_production() {
        let err = AppError::Storage("bucket unreachable at 10.0.0.7".to_string());
        let envelope: ResponseEnvelope<()> = ResponseEnvelope::from_error(&err, false);
        assert!(envelope.message.contains("10.0.0.7"));
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = AppError::InvalidInput("File is empty".to_string());
        let envelope: ResponseEnvelope<()> = ResponseEnvelope::from_error(&err, true);
        assert_eq!(envelope.message, "File is empty");
        assert_eq!(envelope.recoverable, Some(false));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["errorCode"], "INVALID_INPUT");
    }
}
