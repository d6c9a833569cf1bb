use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use payrecon_engine::ReconciliationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Webhook signature verification failed. {0}")]
    AuthenticationError(String),
    #[error("The event could not be parsed. {0}")]
    MalformedEvent(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("The order store is temporarily unavailable. {0}")]
    TransientStoreError(String),
    #[error("The payment gateway could not be reached. {0}")]
    GatewayError(String),
    #[error("{0}")]
    SessionNotConfirmable(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
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
            Self::AuthenticationError(_) => StatusCode::BAD_REQUEST,
            Self::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotConfirmable(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::TransientStoreError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        match e {
            ReconciliationError::DatabaseError(_) | ReconciliationError::Timeout(_) => {
                Self::TransientStoreError(e.to_string())
            },
            ReconciliationError::GatewayError(_) => Self::GatewayError(e.to_string()),
            ReconciliationError::MissingOrderKey(_) | ReconciliationError::SessionNotPaid(_) => {
                Self::SessionNotConfirmable(e.to_string())
            },
            ReconciliationError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
        }
    }
}
