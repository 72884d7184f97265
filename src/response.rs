//! Defines the HTTP-like result handed back to the invoking platform.

use serde::Serialize;

/// The result of handling an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    /// Build a response with the given status.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Build a response with status 200.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_snake_case_fields() {
        assert_eq!(
            serde_json::to_value(Response::ok("Nothing to do!")).unwrap(),
            json!({ "status_code": 200, "body": "Nothing to do!" })
        );
    }
}
