//! Error classification
//!
//! Errors reach the core in many shapes: HTTP responses with a status, named
//! network or timeout failures, validation and processing failures, or bare
//! messages. [`create_error_object`] inspects the shape once and maps it into
//! the closed [`ErrorType`] taxonomy; everything downstream (retry decisions,
//! user-facing messages, recovery hints) only looks at the classified
//! [`ResponseError`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::error;

use crate::numeric::LooseNumber;

/// Error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Connectivity or HTTP failure, usually transient
    Network,
    /// Caller supplied bad input
    Validation,
    /// Malformed response data
    Processing,
    Unknown,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "NETWORK",
            Self::Validation => "VALIDATION",
            Self::Processing => "PROCESSING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP status sent as a number or a numeric string; anything else is absent
fn de_loose_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(raw.map(|n| n.value()).and_then(|code| {
        let valid = code.is_finite()
            && code.fract() == 0.0
            && (0.0..=f64::from(u16::MAX)).contains(&code);
        valid.then_some(code as u16)
    }))
}

/// Loosely-typed description of a failure, as produced by the HTTP layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorShape {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "de_loose_status")]
    pub status: Option<u16>,
    #[serde(default)]
    pub status_text: Option<String>,
}

impl ErrorShape {
    pub fn named(name: &str, message: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn http(status: u16, status_text: &str) -> Self {
        Self {
            status: Some(status),
            status_text: Some(status_text.to_string()),
            ..Default::default()
        }
    }

    pub fn with_code(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    pub fn message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }
}

/// Conversion of concrete errors into an [`ErrorShape`] for classification
pub trait ErrorSource {
    fn error_shape(&self) -> ErrorShape;
}

impl ErrorSource for ErrorShape {
    fn error_shape(&self) -> ErrorShape {
        self.clone()
    }
}

impl ErrorSource for std::io::Error {
    fn error_shape(&self) -> ErrorShape {
        use std::io::ErrorKind;

        let message = Some(self.to_string());
        let code = match self.kind() {
            ErrorKind::TimedOut => Some("ETIMEDOUT"),
            ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
            ErrorKind::ConnectionReset => Some("ECONNRESET"),
            ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
            ErrorKind::NotConnected => Some("ERR_NETWORK"),
            _ => None,
        };
        if let Some(code) = code {
            return ErrorShape {
                code: Some(code.to_string()),
                message,
                ..Default::default()
            };
        }

        match self.kind() {
            ErrorKind::NotFound => ErrorShape {
                message,
                ..ErrorShape::http(404, "Not Found")
            },
            ErrorKind::InvalidData | ErrorKind::UnexpectedEof => ErrorShape {
                name: Some("ProcessingError".to_string()),
                message,
                ..Default::default()
            },
            ErrorKind::InvalidInput => ErrorShape {
                name: Some("ValidationError".to_string()),
                message,
                ..Default::default()
            },
            _ => ErrorShape {
                name: Some("IoError".to_string()),
                message,
                ..Default::default()
            },
        }
    }
}

impl ErrorSource for serde_json::Error {
    fn error_shape(&self) -> ErrorShape {
        if self.is_io() {
            return ErrorShape::named("IoError", &self.to_string());
        }
        ErrorShape::named("ProcessingError", &self.to_string())
    }
}

impl ErrorSource for crate::Error {
    fn error_shape(&self) -> ErrorShape {
        match self {
            crate::Error::Io(e) => e.error_shape(),
            crate::Error::Json(e) => e.error_shape(),
            crate::Error::Config(msg) | crate::Error::InvalidData(msg) => {
                ErrorShape::named("ValidationError", msg)
            }
            crate::Error::NotFound(msg) => ErrorShape {
                message: Some(msg.clone()),
                ..ErrorShape::http(404, "Not Found")
            },
            crate::Error::Response(boundary) => boundary.error_info.details.clone(),
        }
    }
}

/// Callback that re-runs the failed operation
#[derive(Clone)]
pub struct RetryHandle(Arc<dyn Fn() + Send + Sync>);

impl RetryHandle {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn invoke(&self) {
        (self.0)()
    }
}

impl fmt::Debug for RetryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RetryHandle")
    }
}

/// A classified error
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
    /// Unclassified error shape
    pub details: ErrorShape,
    pub timestamp: DateTime<Utc>,
    pub status: Option<u16>,
    #[serde(skip)]
    pub retry: Option<RetryHandle>,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Error surfaced to callers, carrying the classified error
#[derive(Debug, Clone, Error)]
#[error("{}", .error_info.message)]
pub struct ResponseErrorBoundary {
    pub error_info: ResponseError,
    /// Attempts made before giving up
    pub attempts: u32,
}

impl ErrorSource for ResponseErrorBoundary {
    fn error_shape(&self) -> ErrorShape {
        self.error_info.details.clone()
    }
}

const NETWORK_MESSAGE: &str = "Network error: unable to reach the server";
const VALIDATION_DEFAULT: &str = "Invalid data provided";
const PROCESSING_DEFAULT: &str = "Failed to process response data";
const UNKNOWN_DEFAULT: &str = "An unexpected error occurred";

const NETWORK_CODES: &[&str] = &[
    "ECONNREFUSED",
    "ECONNRESET",
    "ECONNABORTED",
    "ETIMEDOUT",
    "ENOTFOUND",
    "EAI_AGAIN",
    "ERR_NETWORK",
];

fn mentions(value: Option<&str>, needle: &str) -> bool {
    value
        .map(|v| v.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn is_network_shape(shape: &ErrorShape) -> bool {
    let name = shape.name.as_deref();
    if mentions(name, "network") || mentions(name, "timeout") {
        return true;
    }
    match shape.code.as_deref() {
        Some(code) => {
            NETWORK_CODES.iter().any(|c| c.eq_ignore_ascii_case(code))
                || mentions(Some(code), "timeout")
        }
        None => false,
    }
}

fn is_kind(shape: &ErrorShape, kind: &str) -> bool {
    mentions(shape.name.as_deref(), kind) || mentions(shape.error_type.as_deref(), kind)
}

fn status_message(status: u16, status_text: Option<&str>) -> String {
    match status {
        401 => "Unauthorized (401): the session is no longer valid".to_string(),
        404 => "Not found (404): the requested resource does not exist".to_string(),
        429 => "Quota exceeded (429): too many requests".to_string(),
        500..=599 => format!("Server error ({}): the server failed to handle the request", status),
        _ => format!(
            "HTTP error {}: {}",
            status,
            status_text.filter(|t| !t.is_empty()).unwrap_or("Unknown")
        ),
    }
}

fn own_message_or(shape: &ErrorShape, default: &str) -> String {
    shape
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Classify an error shape; first matching rule wins
///
/// Never fails: unrecognised shapes become [`ErrorType::Unknown`].
pub fn create_error_object(
    error: &ErrorShape,
    context: Option<&str>,
    retry: Option<RetryHandle>,
) -> ResponseError {
    let (error_type, message) = if is_network_shape(error) {
        (ErrorType::Network, NETWORK_MESSAGE.to_string())
    } else if let Some(status) = error.status {
        (
            ErrorType::Network,
            status_message(status, error.status_text.as_deref()),
        )
    } else if is_kind(error, "validation") {
        (ErrorType::Validation, own_message_or(error, VALIDATION_DEFAULT))
    } else if is_kind(error, "processing") {
        (ErrorType::Processing, own_message_or(error, PROCESSING_DEFAULT))
    } else if error.message.as_deref().is_some_and(|m| !m.is_empty()) {
        (ErrorType::Unknown, own_message_or(error, UNKNOWN_DEFAULT))
    } else {
        (ErrorType::Unknown, UNKNOWN_DEFAULT.to_string())
    };

    let message = match context.filter(|c| !c.is_empty()) {
        Some(ctx) => format!("{}: {}", ctx, message),
        None => message,
    };

    ResponseError {
        error_type,
        message,
        details: error.clone(),
        timestamp: Utc::now(),
        status: error.status,
        retry,
    }
}

fn auth_or_missing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(401|404)\b").expect("static pattern is valid"))
}

/// NETWORK and UNKNOWN errors retry, except unauthorized and not-found
pub fn is_retryable_error(error: &ResponseError) -> bool {
    match error.error_type {
        ErrorType::Network => {
            !(matches!(error.status, Some(401) | Some(404))
                || auth_or_missing_pattern().is_match(&error.message))
        }
        ErrorType::Validation | ErrorType::Processing => false,
        ErrorType::Unknown => true,
    }
}

/// Message substrings mapped to friendly text, checked in order
const FRIENDLY_MESSAGES: &[(&str, &str)] = &[
    ("401", "Your session has expired. Please sign in again."),
    (
        "404",
        "The requested quotation could not be found. It may have been removed.",
    ),
    ("429", "Too many requests. Please wait a moment and try again."),
    (
        "timeout",
        "The server took too long to respond. Please try again.",
    ),
    (
        "server error",
        "The server ran into a problem. Please try again later.",
    ),
    (
        "network error",
        "Unable to connect to the server. Check your internet connection and try again.",
    ),
];

/// User-facing message; falls back to the raw message when nothing matches
pub fn get_user_friendly_message(error: &ResponseError) -> String {
    let lowered = error.message.to_lowercase();
    if let Some((_, friendly)) = FRIENDLY_MESSAGES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
    {
        return friendly.to_string();
    }

    match error.error_type {
        ErrorType::Network => {
            "A connection problem occurred. Please try again.".to_string()
        }
        ErrorType::Processing => {
            "The quotation data could not be read. Please reload and try again.".to_string()
        }
        ErrorType::Validation | ErrorType::Unknown => error.message.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Retry,
    Reauthenticate,
    Refresh,
    CorrectInput,
    ContactSupport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryStrategy {
    pub can_recover: bool,
    pub strategy: Strategy,
    pub action: Option<String>,
}

impl RecoveryStrategy {
    fn new(can_recover: bool, strategy: Strategy, action: &str) -> Self {
        Self {
            can_recover,
            strategy,
            action: Some(action.to_string()),
        }
    }
}

pub fn get_recovery_strategy(error: &ResponseError) -> RecoveryStrategy {
    match error.error_type {
        ErrorType::Network if error.status == Some(401) || error.message.contains("401") => {
            RecoveryStrategy::new(true, Strategy::Reauthenticate, "Sign in again")
        }
        ErrorType::Network if error.status == Some(404) || error.message.contains("404") => {
            RecoveryStrategy::new(
                false,
                Strategy::ContactSupport,
                "Check that the quotation still exists",
            )
        }
        ErrorType::Network => RecoveryStrategy::new(true, Strategy::Retry, "Retry the request"),
        ErrorType::Validation => {
            RecoveryStrategy::new(true, Strategy::CorrectInput, "Review the submitted data")
        }
        ErrorType::Processing => {
            RecoveryStrategy::new(true, Strategy::Refresh, "Reload the quotation data")
        }
        ErrorType::Unknown => RecoveryStrategy {
            can_recover: true,
            strategy: Strategy::Retry,
            action: None,
        },
    }
}

/// Log a classified error under the component that hit it
pub fn log_error(component: &str, err: &ResponseError) {
    error!(
        component = component,
        error_type = %err.error_type,
        status = ?err.status,
        "{}",
        err.message
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn classify(shape: ErrorShape) -> ResponseError {
        create_error_object(&shape, None, None)
    }

    #[test]
    fn test_network_names_and_codes() {
        let by_name = classify(ErrorShape::named("NetworkError", "fetch failed"));
        assert_eq!(by_name.error_type, ErrorType::Network);
        assert_eq!(by_name.message, NETWORK_MESSAGE);

        let timeout = classify(ErrorShape::named("TimeoutError", "took too long"));
        assert_eq!(timeout.error_type, ErrorType::Network);

        let by_code = classify(ErrorShape::with_code("ECONNREFUSED"));
        assert_eq!(by_code.error_type, ErrorType::Network);
    }

    #[test]
    fn test_network_rule_wins_over_status() {
        let shape = ErrorShape {
            code: Some("ETIMEDOUT".into()),
            ..ErrorShape::http(500, "Internal Server Error")
        };
        assert_eq!(classify(shape).message, NETWORK_MESSAGE);
    }

    #[test]
    fn test_http_status_table() {
        let cases = [
            (401, "Unauthorized (401): the session is no longer valid"),
            (404, "Not found (404): the requested resource does not exist"),
            (429, "Quota exceeded (429): too many requests"),
            (
                503,
                "Server error (503): the server failed to handle the request",
            ),
            (418, "HTTP error 418: I'm a teapot"),
        ];
        for (status, expected) in cases {
            let err = classify(ErrorShape::http(status, "I'm a teapot"));
            assert_eq!(err.error_type, ErrorType::Network);
            assert_eq!(err.message, expected);
            assert_eq!(err.status, Some(status));
        }
    }

    #[test]
    fn test_validation_and_processing() {
        let validation = classify(ErrorShape::named("ValidationError", "Quantity must be positive"));
        assert_eq!(validation.error_type, ErrorType::Validation);
        assert_eq!(validation.message, "Quantity must be positive");

        let by_type = classify(ErrorShape {
            error_type: Some("validation".into()),
            ..Default::default()
        });
        assert_eq!(by_type.error_type, ErrorType::Validation);
        assert_eq!(by_type.message, VALIDATION_DEFAULT);

        let processing = classify(ErrorShape::named("ProcessingError", ""));
        assert_eq!(processing.error_type, ErrorType::Processing);
        assert_eq!(processing.message, PROCESSING_DEFAULT);
    }

    #[test]
    fn test_unknown_message_and_fallback() {
        let plain = classify(ErrorShape::message("Something odd"));
        assert_eq!(plain.error_type, ErrorType::Unknown);
        assert_eq!(plain.message, "Something odd");

        let empty = classify(ErrorShape::default());
        assert_eq!(empty.error_type, ErrorType::Unknown);
        assert_eq!(empty.message, UNKNOWN_DEFAULT);
    }

    #[test]
    fn test_context_prefix() {
        let err = create_error_object(
            &ErrorShape::http(404, "Not Found"),
            Some("Loading quotation"),
            None,
        );
        assert_eq!(
            err.message,
            "Loading quotation: Not found (404): the requested resource does not exist"
        );
    }

    #[test]
    fn test_retry_handle_is_kept() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let err = create_error_object(
            &ErrorShape::message("boom"),
            None,
            Some(RetryHandle::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );
        err.retry.as_ref().unwrap().invoke();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "UNKNOWN");
        assert!(json.get("retry").is_none());
    }

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error(&classify(ErrorShape::named("NetworkError", ""))));
        assert!(is_retryable_error(&classify(ErrorShape::http(503, ""))));
        assert!(is_retryable_error(&classify(ErrorShape::http(429, ""))));
        assert!(!is_retryable_error(&classify(ErrorShape::http(401, ""))));
        assert!(!is_retryable_error(&classify(ErrorShape::http(404, ""))));
        assert!(!is_retryable_error(&classify(ErrorShape::named("ValidationError", "x"))));
        assert!(!is_retryable_error(&classify(ErrorShape::named("ProcessingError", "x"))));
        assert!(is_retryable_error(&classify(ErrorShape::message("weird"))));
    }

    #[test]
    fn test_user_friendly_message() {
        assert_eq!(
            get_user_friendly_message(&classify(ErrorShape::http(401, ""))),
            "Your session has expired. Please sign in again."
        );
        assert_eq!(
            get_user_friendly_message(&classify(ErrorShape::named("NetworkError", ""))),
            "Unable to connect to the server. Check your internet connection and try again."
        );
        assert_eq!(
            get_user_friendly_message(&classify(ErrorShape::named("ProcessingError", "bad"))),
            "The quotation data could not be read. Please reload and try again."
        );
        // Unmapped messages are shown as-is
        assert_eq!(
            get_user_friendly_message(&classify(ErrorShape::named(
                "ValidationError",
                "Incoterm is required"
            ))),
            "Incoterm is required"
        );
    }

    #[test]
    fn test_recovery_strategy() {
        let auth = get_recovery_strategy(&classify(ErrorShape::http(401, "")));
        assert_eq!(auth.strategy, Strategy::Reauthenticate);
        assert!(auth.can_recover);

        let missing = get_recovery_strategy(&classify(ErrorShape::http(404, "")));
        assert_eq!(missing.strategy, Strategy::ContactSupport);
        assert!(!missing.can_recover);

        let server = get_recovery_strategy(&classify(ErrorShape::http(502, "")));
        assert_eq!(server.strategy, Strategy::Retry);

        let validation = get_recovery_strategy(&classify(ErrorShape::named("ValidationError", "")));
        assert_eq!(validation.strategy, Strategy::CorrectInput);

        let unknown = get_recovery_strategy(&classify(ErrorShape::default()));
        assert_eq!(unknown.strategy, Strategy::Retry);
        assert!(unknown.action.is_none());
    }

    #[test]
    fn test_io_and_json_sources() {
        let timed_out = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert_eq!(classify(timed_out.error_shape()).error_type, ErrorType::Network);

        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = classify(missing.error_shape());
        assert_eq!(err.status, Some(404));
        assert!(!is_retryable_error(&err));

        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert_eq!(classify(json_err.error_shape()).error_type, ErrorType::Processing);

        let crate_err = crate::Error::InvalidData("negative quantity".into());
        let err = classify(crate_err.error_shape());
        assert_eq!(err.error_type, ErrorType::Validation);
        assert_eq!(err.message, "negative quantity");
    }

    #[test]
    fn test_error_shape_deserializes_from_http_layer_json() {
        let shape: ErrorShape =
            serde_json::from_str(r#"{"status": 500, "statusText": "Internal Server Error"}"#)
                .unwrap();
        assert_eq!(shape.status, Some(500));
        assert_eq!(classify(shape).error_type, ErrorType::Network);
    }

    #[test]
    fn test_error_shape_accepts_string_status() {
        let shape: ErrorShape =
            serde_json::from_str(r#"{"status": "503", "statusText": "Unavailable"}"#).unwrap();
        assert_eq!(shape.status, Some(503));
        let classified = classify(shape);
        assert_eq!(classified.error_type, ErrorType::Network);
        assert!(is_retryable_error(&classified));

        for raw in [r#"{"status": "oops"}"#, r#"{"status": null}"#, r#"{"status": 70000}"#] {
            let shape: ErrorShape = serde_json::from_str(raw).unwrap();
            assert_eq!(shape.status, None, "{}", raw);
        }
    }
}
