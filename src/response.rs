//! Success half of the response envelope.

use serde::Serialize;

/// Wrapper every successful handler response is serialized through.
///
/// `success` is derived from the status code so the flag can never
/// disagree with it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flag() {
        assert!(ApiResponse::new(200, (), "ok").success);
        assert!(ApiResponse::new(201, (), "created").success);
        assert!(!ApiResponse::new(404, (), "missing").success);
    }

    #[test]
    fn test_envelope_field_names() {
        let response = ApiResponse::new(201, serde_json::json!({"id": "1"}), "created");
        let value = serde_json::to_value(&response).expect("Failed to serialize response");

        assert_eq!(201, value["statusCode"]);
        assert_eq!(true, value["success"]);
        assert_eq!("created", value["message"]);
        assert_eq!("1", value["data"]["id"]);
    }
}
