use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::fmt;

pub const CAPACITY_EXCEEDED: i32 = 102;
pub const SOLVER_ERROR: i32 = 103;
pub const TIMEOUT_ERROR: i32 = 104;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_solver_error(&self) -> bool {
        self.code == SOLVER_ERROR
    }

    pub fn is_timeout(&self) -> bool {
        self.code == TIMEOUT_ERROR
    }

    pub fn is_capacity_exceeded(&self) -> bool {
        self.code == CAPACITY_EXCEEDED
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn capacity_exceeded_error(limit: usize) -> Error {
    Error {
        code: CAPACITY_EXCEEDED,
        message: format!("stop sequence already holds {} stops", limit),
    }
}

pub fn solver_error<M: Into<String>>(message: M) -> Error {
    Error {
        code: SOLVER_ERROR,
        message: message.into(),
    }
}

pub fn timeout_error() -> Error {
    Error {
        code: TIMEOUT_ERROR,
        message: "route solve timed out".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn config_error(key: &str) -> Error {
    Error {
        code: 2,
        message: format!("invalid configuration value for {}", key),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::warn!("reqwest error: {:?}", err);

    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

pub fn engine_stopped_error() -> Error {
    Error {
        code: 6,
        message: "session engine stopped".into(),
    }
}

pub fn listener_closed_error() -> Error {
    Error {
        code: 7,
        message: "display listener closed".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_their_message() {
        let response = engine_stopped_error().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = invalid_input_error().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn classifies_route_failures() {
        assert!(solver_error("no path").is_solver_error());
        assert!(timeout_error().is_timeout());
        assert!(capacity_exceeded_error(2).is_capacity_exceeded());
        assert!(!timeout_error().is_solver_error());
    }
}
