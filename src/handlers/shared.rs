use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    /// Machine-readable failure kind; only present on error responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            data: Some(data),
            message: None,
            reason: None,
        })
    }

    pub fn created(data: T) -> HttpResponse {
        HttpResponse::Created().json(Self {
            success: true,
            data: Some(data),
            message: None,
            reason: None,
        })
    }

    pub fn success_with_message(data: Option<T>, message: &str) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            data,
            message: Some(message.to_string()),
            reason: None,
        })
    }
}

impl ApiResponse<()> {
    // Error body; the status code comes from AppError::error_response.
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
            reason: None,
        }
    }

    pub fn error_with_reason(message: &str, reason: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
            reason: Some(reason.to_string()),
        }
    }
}
