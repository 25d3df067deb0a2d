//! Error taxonomy for the poll loop.
//!
//! Every failure a single iteration can hit is one variant of [`BotError`],
//! so the loop matches exhaustively and each variant carries enough context
//! to reconstruct the failing request from a log line alone.

use thiserror::Error;

/// Shape violations in a decoded upstream payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("response is not a JSON object")]
    NotARecord,
    #[error("response is missing the `homeworks` key")]
    MissingHomeworks,
    #[error("`homeworks` is not a list")]
    HomeworksNotAList,
    #[error("could not decode response body: {0}")]
    Decode(String),
}

/// Any per-iteration failure. Terminal for the iteration, never for the
/// process.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("request to {url} (from_date={from_date}) failed: {source}")]
    Connection {
        url: String,
        from_date: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status code {code} (from_date={from_date})")]
    StatusCode {
        url: String,
        code: u16,
        from_date: u64,
    },

    /// The service reported an internal failure inside a transport-success
    /// body.
    #[error("service signalled an error: `{key}` = {value}")]
    Server {
        key: &'static str,
        value: serde_json::Value,
    },

    #[error("malformed response: {0}")]
    Schema(#[from] SchemaError),

    #[error("homework entry is missing the `{0}` field")]
    MalformedEntry(&'static str),

    #[error("unknown homework status `{0}`")]
    UnknownStatus(String),

    #[error("failed to deliver message to chat {chat_id}: {reason}")]
    Delivery { chat_id: String, reason: String },
}
