use ntex::web;
use serde::Serialize;

/// Envelope shared by every endpoint, success or failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

impl ApiResponse<()> {
    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.to_string()),
        }
    }

    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
            error: None,
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> web::HttpResponse {
    web::HttpResponse::Ok().json(&ApiResponse::data(data))
}

pub fn ok_with_message<T: Serialize>(data: T, message: &str) -> web::HttpResponse {
    web::HttpResponse::Ok().json(&ApiResponse::data(data).with_message(message))
}

pub fn created<T: Serialize>(data: T) -> web::HttpResponse {
    web::HttpResponse::Created().json(&ApiResponse::data(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_skips_empty_fields() {
        assert_eq!(
            serde_json::to_value(ApiResponse::data(vec![1, 2])).unwrap(),
            json!({"success": true, "data": [1, 2]})
        );
        assert_eq!(
            serde_json::to_value(ApiResponse::failure("pet not found")).unwrap(),
            json!({"success": false, "error": "pet not found"})
        );
        assert_eq!(
            serde_json::to_value(ApiResponse::message("logged out")).unwrap(),
            json!({"success": true, "message": "logged out"})
        );
    }
}
