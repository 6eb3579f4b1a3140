use crate::api::models::ErrorType;
use http::StatusCode;
use std::fmt;

/// Error payload returned by the simulated server.
///
/// The wire code is the HTTP status followed by a three digit sub-code, so
/// `(404, 2)` travels as `"404002"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestError {
    pub status: u16,
    pub sub_code: u16,
    pub summary: String,
    pub detail: String,
}

impl RestError {
    pub fn new(
        status: u16,
        sub_code: u16,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            sub_code,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> String {
        format!("{}{:03}", self.status, self.sub_code)
    }

    /// Split a wire code such as `"409009"` into `(409, 9)`.
    pub fn parse_code(code: &str) -> Option<(u16, u16)> {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let (status, sub_code) = code.split_at(3);
        Some((status.parse().ok()?, sub_code.parse().ok()?))
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn to_error_type(&self) -> ErrorType {
        ErrorType {
            code: self.code(),
            summary: self.summary.clone(),
            detail: self.detail.clone(),
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {}: {}",
            self.status,
            self.code(),
            self.summary,
            self.detail
        )
    }
}

impl std::error::Error for RestError {}

impl From<&RestError> for ErrorType {
    fn from(error: &RestError) -> Self {
        error.to_error_type()
    }
}

impl TryFrom<ErrorType> for RestError {
    type Error = ErrorType;

    fn try_from(error: ErrorType) -> Result<Self, Self::Error> {
        match Self::parse_code(&error.code) {
            Some((status, sub_code)) => Ok(Self {
                status,
                sub_code,
                summary: error.summary,
                detail: error.detail,
            }),
            None => Err(error),
        }
    }
}
