use crate::error::AppError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

/// An error raised during request handling, waiting for a response.
#[derive(Debug)]
pub struct ExceptionEvent {
    error: AppError,
    response: Option<Response>,
    propagation_stopped: bool,
}

impl ExceptionEvent {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            response: None,
            propagation_stopped: false,
        }
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Replaces any previous response and stops further listeners.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn into_parts(self) -> (AppError, Option<Response>) {
        (self.error, self.response)
    }
}

pub trait ExceptionListener: Send + Sync {
    fn on_exception(&self, event: &mut ExceptionEvent);
}

/// Turns user-facing errors into `{"error": "<message>"}` JSON responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionResponseListener;

impl ExceptionListener for ExceptionResponseListener {
    fn on_exception(&self, event: &mut ExceptionEvent) {
        let AppError::User {
            message,
            status_code,
        } = event.error()
        else {
            return;
        };

        debug!("Translating user error with status {}", status_code);
        let response = json_error_response(message, *status_code);
        event.set_response(response);
    }
}

/// Double quotes become single quotes; serde_json escapes the rest.
pub fn escape_message(message: &str) -> String {
    message.replace('"', "'")
}

/// Codes outside 100..=599 are not valid HTTP statuses and map to 500.
fn response_status(status_code: u16) -> StatusCode {
    if !(100..600).contains(&status_code) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn json_error_response(message: &str, status_code: u16) -> Response {
    let status = response_status(status_code);
    let body = json!({ "error": escape_message(message) });
    (status, Json(body)).into_response()
}
