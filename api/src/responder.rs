use crate::error::AppError;
use crate::listener::{ExceptionEvent, ExceptionListener, ExceptionResponseListener};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

/// Runs an error through the listeners in order and falls back to a plain
/// 500 when none of them produced a response.
#[derive(Clone)]
pub struct ErrorResponder {
    listeners: Vec<Arc<dyn ExceptionListener>>,
}

impl ErrorResponder {
    /// A responder with no listeners: every error gets the default response.
    pub fn empty() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn with_listener<L: ExceptionListener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn respond(&self, error: AppError) -> Response {
        let mut event = ExceptionEvent::new(error);
        for listener in &self.listeners {
            if event.is_propagation_stopped() {
                break;
            }
            listener.on_exception(&mut event);
        }

        match event.into_parts() {
            (_, Some(response)) => response,
            (error, None) => default_response(&error),
        }
    }
}

impl Default for ErrorResponder {
    fn default() -> Self {
        Self::empty().with_listener(ExceptionResponseListener)
    }
}

fn default_response(error: &AppError) -> Response {
    error!("Unhandled error: {}", error);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ErrorResponder::default().respond(self)
    }
}
