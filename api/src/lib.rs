pub mod error;
pub mod listener;
pub mod responder;

pub use error::{AppError, Result};
pub use listener::{ExceptionEvent, ExceptionListener, ExceptionResponseListener, escape_message};
pub use responder::ErrorResponder;
