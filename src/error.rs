use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("{0} not found")] NotFound(String),

    #[error("Transaction has already been processed")]
    AlreadyProcessed,

    #[error("User already has an active deposit")]
    DuplicateActiveDeposit,

    #[error("Amount {0} does not match any membership tier")] InvalidTierAmount(i64),

    #[error("Amount is below the minimum of {minimum}")] BelowMinimum {
        minimum: i64,
    },

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Deposit balance is below the tier requirement of {required}")] InsufficientDeposit {
        required: i64,
    },

    #[error("Please wait {retry_after_secs} seconds before the next task")] RateLimited {
        retry_after_secs: i64,
    },

    #[error("Daily task limit of {limit} reached")] DailyLimitReached {
        limit: i32,
    },

    #[error("Account is not active")]
    AccountNotActive,

    #[error("Invalid input: {0}")] ValidationError(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub data: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<i64>,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyProcessed => "ALREADY_PROCESSED",
            AppError::DuplicateActiveDeposit => "DUPLICATE_ACTIVE_DEPOSIT",
            AppError::InvalidTierAmount(_) => "INVALID_TIER_AMOUNT",
            AppError::BelowMinimum { .. } => "BELOW_MINIMUM",
            AppError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            AppError::InsufficientDeposit { .. } => "INSUFFICIENT_DEPOSIT",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::DailyLimitReached { .. } => "DAILY_LIMIT_REACHED",
            AppError::AccountNotActive => "ACCOUNT_NOT_ACTIVE",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Infrastructure failures abort the request; everything else is a
    /// validation outcome the caller can act on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Config(_) | AppError::Internal(_))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyProcessed | AppError::DuplicateActiveDeposit => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            | AppError::InvalidTierAmount(_)
            | AppError::BelowMinimum { .. }
            | AppError::InsufficientBalance
            | AppError::InsufficientDeposit { .. }
            | AppError::DailyLimitReached { .. }
            | AppError::AccountNotActive
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let message = if self.is_fatal() {
            "Something went wrong, please try again later".to_string()
        } else {
            self.to_string()
        };

        let retry_after_secs = match self {
            AppError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        ErrorResponse {
            success: false,
            message,
            data: ErrorDetail {
                code: self.code(),
                retry_after_secs,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.is_fatal() {
            tracing::error!("Request failed: {}", self);
        }

        let status = self.status_code();
        let response = self.to_error_response();

        if let AppError::RateLimited { retry_after_secs } = self {
            return (
                status,
                [(axum::http::header::RETRY_AFTER, retry_after_secs.to_string())],
                axum::Json(response),
            ).into_response();
        }

        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
