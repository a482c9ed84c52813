use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::*;
use payment_engine::{InvoiceFlowError, ReconciliationError, StoreError, UserPaymentsError};
use processor_tools::ProcessorError;
use thiserror::Error;

use crate::data_objects::PaymentResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Invalid request. {0}")]
    ValidationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Payment processor error. {0}")]
    ProcessorError(&'static str),
    #[error("Authentication Error. {0}")]
    AuthenticationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ProcessorError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

// The processor's response body can carry internals of the upstream service, so only the public message goes back
// to the caller. The details are logged here.
impl From<ProcessorError> for ServerError {
    fn from(e: ProcessorError) -> Self {
        error!("💱️ {e}");
        Self::ProcessorError(e.public_message())
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(s) => Self::NoRecordFound(s),
            e => {
                error!("🗃️ {e}");
                Self::BackendError("Database error".into())
            },
        }
    }
}

impl From<InvoiceFlowError> for ServerError {
    fn from(e: InvoiceFlowError) -> Self {
        match e {
            InvoiceFlowError::ValidationError(s) => Self::ValidationError(s),
            InvoiceFlowError::NotFound(id) => Self::NoRecordFound(format!("Invoice {id}")),
            InvoiceFlowError::ProcessorError(e) => e.into(),
            InvoiceFlowError::StoreError(e) => e.into(),
        }
    }
}

impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        match e {
            ReconciliationError::ProcessorError(e) => e.into(),
            ReconciliationError::StoreError(e) => {
                error!("🗃️ {e}");
                Self::BackendError("Database update failed".into())
            },
        }
    }
}

/// Errors from the catalog payment flow. These endpoints answer with `{"status": false, "message": ...}` rather than
/// the `{"error": ...}` body of [`ServerError`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PaymentFlowError {
    pub status: StatusCode,
    pub message: String,
}

impl PaymentFlowError {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl ResponseError for PaymentFlowError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(PaymentResponse::failure(self.message.as_str()))
    }
}

impl From<UserPaymentsError> for PaymentFlowError {
    fn from(e: UserPaymentsError) -> Self {
        match e {
            UserPaymentsError::UnknownInvoice(_) => Self::bad_request(e.to_string()),
            UserPaymentsError::PaymentNotFound => Self::new(StatusCode::NOT_FOUND, e.to_string()),
            UserPaymentsError::ProcessorError(e) => {
                error!("💱️ Could not fetch payment status. {e}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Could not fetch payment status")
            },
            UserPaymentsError::StoreError(e) => {
                error!("🗃️ {e}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            },
        }
    }
}
