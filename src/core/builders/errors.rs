//! Error payload builders.
//!
//! Construction never fails: every helper returns a ready [`RestError`].

use crate::api::RestError;
use http::Method;
use std::fmt::Display;

pub mod sub_codes {
    pub const USER_NOT_FOUND: u16 = 2;
    pub const PROJECT_NOT_FOUND: u16 = 5;
    pub const WORKBOOK_NOT_FOUND: u16 = 6;
    pub const VIEW_NOT_FOUND: u16 = 11;
    pub const DATASOURCE_NOT_FOUND: u16 = 11;
    pub const GROUP_NOT_FOUND: u16 = 12;
    pub const SCHEDULE_NOT_FOUND: u16 = 13;
    pub const UPLOAD_SESSION_NOT_FOUND: u16 = 14;
    pub const SUBSCRIPTION_NOT_FOUND: u16 = 25;
    pub const TASK_NOT_FOUND: u16 = 26;

    pub const USER_CONFLICT: u16 = 17;
    pub const PROJECT_CONFLICT: u16 = 6;
    pub const GROUP_CONFLICT: u16 = 9;
    pub const GROUP_SET_CONFLICT: u16 = 10;
    pub const GROUP_MEMBERSHIP_CONFLICT: u16 = 11;
    pub const FAVORITE_CONFLICT: u16 = 26;
    pub const WORKBOOK_CONFLICT: u16 = 5;
    pub const SUBSCRIPTION_CONFLICT: u16 = 25;
    pub const TASK_CONFLICT: u16 = 27;

    pub const SIGN_IN_ERROR: u16 = 1;
    pub const PUBLISH_OVERWRITE: u16 = 7;
}

/// A fixed error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticErrorBuilder {
    pub status: u16,
    pub sub_code: u16,
    pub summary: &'static str,
    pub detail: &'static str,
}

impl StaticErrorBuilder {
    pub const fn new(
        status: u16,
        sub_code: u16,
        summary: &'static str,
        detail: &'static str,
    ) -> Self {
        Self {
            status,
            sub_code,
            summary,
            detail,
        }
    }

    pub fn build(&self) -> RestError {
        RestError::new(self.status, self.sub_code, self.summary, self.detail)
    }
}

pub const UNAUTHORIZED: StaticErrorBuilder = StaticErrorBuilder::new(
    401,
    0,
    "Signin Error",
    "Missing or invalid authentication token",
);

pub fn bad_request(detail: impl Into<String>) -> RestError {
    RestError::new(400, 0, "Bad Request", detail)
}

/// 400 for a required request element or attribute that is missing or blank.
pub fn missing_field(element: &str, attribute: &str) -> RestError {
    bad_request(format!(
        "The '{}' element must have a non-empty '{}' attribute",
        element, attribute
    ))
}

pub fn not_found(sub_code: u16, kind: &str, id: impl Display) -> RestError {
    RestError::new(
        404,
        sub_code,
        "Resource Not Found",
        format!("{} '{}' could not be found.", kind, id),
    )
}

pub fn conflict(sub_code: u16, detail: impl Into<String>) -> RestError {
    RestError::new(409, sub_code, "Resource Conflict", detail)
}

pub fn forbidden(sub_code: u16, detail: impl Into<String>) -> RestError {
    RestError::new(403, sub_code, "Forbidden", detail)
}

pub fn method_not_allowed(method: &Method, path: &str) -> RestError {
    RestError::new(
        405,
        0,
        "Method Not Allowed",
        format!("{} is not supported for '{}'", method, path),
    )
}

pub fn unknown_resource(path: &str) -> RestError {
    RestError::new(
        404,
        0,
        "Resource Not Found",
        format!("No operation matches '{}'", path),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_401000() {
        let error = UNAUTHORIZED.build();
        assert_eq!(error.code(), "401000");
        assert!(!error.summary.is_empty());
    }

    #[test]
    fn test_not_found_detail_names_the_entity() {
        let error = not_found(sub_codes::USER_NOT_FOUND, "User", "abc");
        assert_eq!(error.code(), "404002");
        assert_eq!(error.detail, "User 'abc' could not be found.");
    }

    #[test]
    fn test_conflict_codes() {
        assert_eq!(conflict(sub_codes::GROUP_CONFLICT, "x").code(), "409009");
        assert_eq!(conflict(sub_codes::USER_CONFLICT, "x").code(), "409017");
        assert_eq!(conflict(sub_codes::TASK_CONFLICT, "x").code(), "409027");
        assert_eq!(forbidden(sub_codes::PUBLISH_OVERWRITE, "x").status, 403);
    }
}
