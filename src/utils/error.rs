use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("\"{name}\" is not a valid adapter.")]
    UnknownAdapter { name: String },

    #[error("Adapter \"{name}\" is not linked into this build (requires {library})")]
    AdapterNotLinked { name: String, library: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatusError {
        status: u16,
        url: String,
        body: String,
    },

    #[error("{message}")]
    RemoteError {
        message: String,
        payload: Option<Value>,
    },

    #[error("Cannot update {type_name}: instance has no identifier")]
    MissingIdentifier { type_name: String },

    #[error("Insert task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl AdapterError {
    /// Wraps the `error` field of a decoded envelope, keeping the raw body.
    pub fn remote(message: impl Into<String>, payload: Value) -> Self {
        AdapterError::RemoteError {
            message: message.into(),
            payload: Some(payload),
        }
    }

    /// True for failures that happened before a response envelope was decoded.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AdapterError::ApiError(_) | AdapterError::HttpStatusError { .. }
        )
    }

    pub fn remote_payload(&self) -> Option<&Value> {
        match self {
            AdapterError::RemoteError { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_adapter_message_names_request() {
        let err = AdapterError::UnknownAdapter {
            name: "oracle".to_string(),
        };
        assert_eq!(err.to_string(), "\"oracle\" is not a valid adapter.");
    }

    #[test]
    fn test_remote_error_keeps_payload() {
        let body = json!({"error": "name is taken"});
        let err = AdapterError::remote("name is taken", body.clone());

        assert_eq!(err.to_string(), "name is taken");
        assert_eq!(err.remote_payload(), Some(&body));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_status_error_is_transport() {
        let err = AdapterError::HttpStatusError {
            status: 502,
            url: "http://api.local/users".to_string(),
            body: "Bad Gateway".to_string(),
        };
        assert!(err.is_transport());
        assert!(err.remote_payload().is_none());
    }
}
