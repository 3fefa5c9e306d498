use errors::AppError;
use thiserror::Error;

/// Token 关联错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Access token already exists: {0}")]
    AccessTokenAlreadyExists(String),
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::AccessTokenAlreadyExists(token) => {
                AppError::Conflict(format!("Access token already exists: {}", token))
            }
            TokenError::Store(e) => e,
        }
    }
}

pub type TokenResult<T> = Result<T, TokenError>;
