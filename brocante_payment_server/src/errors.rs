use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use brocante_payment_engine::traits::{CatalogApiError, MarketplaceError, SettingsApiError};
use hosted_checkout::CheckoutApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Webhook signature invalid or not provided")]
    InvalidSignature,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The payment processor could not be reached. {0}")]
    PaymentProcessorError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::IncorrectPassword => StatusCode::UNAUTHORIZED,
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentProcessorError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Incorrect password.")]
    IncorrectPassword,
    #[error("No admin token was provided.")]
    MissingToken,
    #[error("Admin token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Admin token has expired.")]
    TokenExpired,
    #[error("Admin token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
}

impl From<MarketplaceError> for ServerError {
    fn from(e: MarketplaceError) -> Self {
        match &e {
            MarketplaceError::OrderNotFound(_) | MarketplaceError::ItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            MarketplaceError::InvalidRequest(_) |
            MarketplaceError::ItemNotPurchasable(_, _) |
            MarketplaceError::UnsupportedAction(_) |
            MarketplaceError::PricingError(_) => Self::InvalidRequestBody(e.to_string()),
            MarketplaceError::SettingsError(SettingsApiError::InvalidValue(_)) => Self::InvalidRequestBody(e.to_string()),
            MarketplaceError::DatabaseError(_) |
            MarketplaceError::OrderAlreadyExists(_) |
            MarketplaceError::CatalogError(_) |
            MarketplaceError::SettingsError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<SettingsApiError> for ServerError {
    fn from(e: SettingsApiError) -> Self {
        match &e {
            SettingsApiError::InvalidValue(_) => Self::InvalidRequestBody(e.to_string()),
            SettingsApiError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CheckoutApiError> for ServerError {
    fn from(e: CheckoutApiError) -> Self {
        Self::PaymentProcessorError(e.to_string())
    }
}
