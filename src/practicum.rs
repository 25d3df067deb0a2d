//! Client for the Practicum homework status service.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::error::{BotError, SchemaError};

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Keys the service uses to signal its own failures inside a
/// transport-success body.
const SERVER_ERROR_KEYS: [&str; 2] = ["error", "code"];

/// A validated fetch result: the homework list plus the forward-looking
/// watermark, when the service supplied one.
#[derive(Debug)]
pub struct StatusResponse {
    pub homeworks: Vec<Value>,
    pub current_date: Option<u64>,
}

#[derive(Clone)]
pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(endpoint: String, token: String) -> Self {
        Self {
            client: build_http_client(),
            endpoint,
            token,
        }
    }

    /// Fetches homework statuses updated since `from_date`.
    ///
    /// Transport, HTTP-status, body-signalled and shape failures each map to
    /// their own [`BotError`] variant carrying the request parameters.
    pub async fn fetch(&self, from_date: u64) -> Result<StatusResponse, BotError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|source| BotError::Connection {
                url: self.endpoint.clone(),
                from_date,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::StatusCode {
                url: self.endpoint.clone(),
                code: status.as_u16(),
                from_date,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SchemaError::Decode(e.to_string()))?;

        check_server_error(&body)?;
        Ok(validate(body)?)
    }
}

fn build_http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .user_agent(concat!("homework-bot/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            warn!(
                "Failed to build HTTP client with timeouts, falling back to defaults: {}",
                error
            );
            reqwest::Client::new()
        }
    }
}

/// The service reports its own internal errors through `error`/`code` keys
/// even on HTTP 200 responses; those must fail the iteration before any
/// shape validation runs.
fn check_server_error(body: &Value) -> Result<(), BotError> {
    for key in SERVER_ERROR_KEYS {
        if let Some(value) = body.get(key) {
            return Err(BotError::Server {
                key,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Enforces the expected payload shape.
///
/// An empty `homeworks` list is a valid result; a missing or non-list
/// `homeworks` is not. A missing or non-integer `current_date` leaves the
/// watermark absent so the caller keeps its prior cursor.
pub fn validate(raw: Value) -> Result<StatusResponse, SchemaError> {
    let Value::Object(mut fields) = raw else {
        return Err(SchemaError::NotARecord);
    };

    let current_date = fields.get("current_date").and_then(Value::as_u64);

    let homeworks = match fields.remove("homeworks") {
        None => return Err(SchemaError::MissingHomeworks),
        Some(Value::Array(list)) => list,
        Some(_) => return Err(SchemaError::HomeworksNotAList),
    };

    Ok(StatusResponse {
        homeworks,
        current_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_homeworks_with_watermark() {
        let response = validate(json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1_700_000_000u64,
        }))
        .unwrap();
        assert_eq!(response.homeworks.len(), 1);
        assert_eq!(response.current_date, Some(1_700_000_000));
    }

    #[test]
    fn test_validate_accepts_empty_homeworks() {
        let response = validate(json!({"homeworks": [], "current_date": 5})).unwrap();
        assert!(response.homeworks.is_empty());
        assert_eq!(response.current_date, Some(5));
    }

    #[test]
    fn test_validate_tolerates_missing_watermark() {
        let response = validate(json!({"homeworks": []})).unwrap();
        assert_eq!(response.current_date, None);
    }

    #[test]
    fn test_validate_treats_non_integer_watermark_as_absent() {
        let response = validate(json!({"homeworks": [], "current_date": "soon"})).unwrap();
        assert_eq!(response.current_date, None);
    }

    #[test]
    fn test_validate_rejects_non_object_payloads() {
        assert_eq!(
            validate(json!(["not", "a", "record"])).unwrap_err(),
            SchemaError::NotARecord
        );
        assert_eq!(validate(json!("nope")).unwrap_err(), SchemaError::NotARecord);
    }

    #[test]
    fn test_validate_rejects_missing_homeworks() {
        assert_eq!(
            validate(json!({"current_date": 5})).unwrap_err(),
            SchemaError::MissingHomeworks
        );
    }

    #[test]
    fn test_validate_rejects_non_list_homeworks() {
        assert_eq!(
            validate(json!({"homeworks": "hw1"})).unwrap_err(),
            SchemaError::HomeworksNotAList
        );
    }

    #[test]
    fn test_error_key_in_success_body_is_a_server_error() {
        let error = check_server_error(&json!({"error": "testing"})).unwrap_err();
        match error {
            BotError::Server { key, value } => {
                assert_eq!(key, "error");
                assert_eq!(value, json!("testing"));
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn test_code_key_in_success_body_is_a_server_error() {
        let error = check_server_error(&json!({"code": 404})).unwrap_err();
        assert!(matches!(error, BotError::Server { key: "code", .. }));
    }

    #[test]
    fn test_clean_body_passes_server_error_check() {
        assert!(check_server_error(&json!({"homeworks": []})).is_ok());
    }
}
