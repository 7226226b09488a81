// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("API error: code {code}, msg: {msg}")]
    ApiError { code: i64, msg: String },
}

pub type Result<T> = std::result::Result<T, Error>;

// Binance error codes the client classifies.
const UNKNOWN: i64 = -1000;
const DISCONNECTED: i64 = -1001;
const TOO_MANY_REQUESTS: i64 = -1003;
const UNEXPECTED_RESPONSE: i64 = -1006;
const TIMEOUT: i64 = -1007;
const SERVER_BUSY: i64 = -1008;
const INVALID_TIMESTAMP: i64 = -1021;
const INVALID_SIGNATURE: i64 = -1022;
const NEW_ORDER_REJECTED: i64 = -2010;
const NO_SUCH_ORDER: i64 = -2013;
const BAD_API_KEY_FMT: i64 = -2014;
const REJECTED_MBX_KEY: i64 = -2015;

impl Error {
    /// The request timed out without an answer; the venue may or may not have acted on it.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::RequestFailed(e) => e.is_timeout(),
            Error::ApiError { code, .. } => *code == TIMEOUT,
            _ => false,
        }
    }

    /// Worth retrying: the failure was in transport or on the venue's side, not in the request.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            Error::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Error::ApiError { code, .. } => matches!(
                *code,
                UNKNOWN
                    | DISCONNECTED
                    | TOO_MANY_REQUESTS
                    | UNEXPECTED_RESPONSE
                    | TIMEOUT
                    | SERVER_BUSY
                    | INVALID_TIMESTAMP
            ),
            Error::ClientBuildError(_) | Error::DeserializationFailed(_) => false,
        }
    }

    pub fn is_auth(&self) -> bool {
        match self {
            Error::HttpStatus { status, .. } => *status == 401,
            Error::ApiError { code, .. } => {
                matches!(*code, INVALID_SIGNATURE | BAD_API_KEY_FMT | REJECTED_MBX_KEY)
            }
            _ => false,
        }
    }

    pub fn is_order_not_found(&self) -> bool {
        matches!(self, Error::ApiError { code, .. } if *code == NO_SUCH_ORDER)
    }

    /// The venue already has an order under this client order id.
    pub fn is_duplicate_order(&self) -> bool {
        matches!(
            self,
            Error::ApiError { code, msg } if *code == NEW_ORDER_REJECTED && msg.contains("Duplicate order")
        )
    }
}
