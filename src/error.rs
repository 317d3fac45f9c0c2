//! 统一错误类型
//!
//! 所有对外操作都返回 [`AppError`]，界面层再通过 [`AppError::user_message`]
//! 转成可以直接展示的文本。

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Network(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("resource not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unknown(String),
}

impl AppError {
    /// 面向用户的错误文案
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => "No internet connection. Please check your network.".to_string(),
            AppError::NotFound => "No games found.".to_string(),
            AppError::Database(_) => "Database error. Please try again.".to_string(),
            AppError::Unauthorized => "You need to login to access this content.".to_string(),
            AppError::Validation(msg) | AppError::Unknown(msg) => msg.clone(),
        }
    }

    /// 仓库层把底层存储错误统一归为 Unknown，保留原始信息
    pub(crate) fn unknown(err: impl std::fmt::Display) -> Self {
        AppError::Unknown(err.to_string())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Unknown(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Unknown(err.to_string())
    }
}

/// 正在进行的操作在界面上的状态
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(AppError),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            Resource::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> From<Result<T, AppError>> for Resource<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(err) => Resource::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_maps_known_kinds() {
        assert_eq!(
            AppError::Network("timeout".into()).user_message(),
            "No internet connection. Please check your network."
        );
        assert_eq!(AppError::NotFound.user_message(), "No games found.");
        assert_eq!(
            AppError::Database("locked".into()).user_message(),
            "Database error. Please try again."
        );
        assert_eq!(
            AppError::Unauthorized.user_message(),
            "You need to login to access this content."
        );
        assert_eq!(
            AppError::Validation("Passwords do not match".into()).user_message(),
            "Passwords do not match"
        );
        assert_eq!(AppError::Unknown("boom".into()).user_message(), "boom");
    }

    #[test]
    fn db_errors_become_database_errors() {
        let err: AppError = DbErr::RecordNotFound("users".into()).into();
        assert!(matches!(err, AppError::Database(msg) if msg.contains("users")));
    }

    #[test]
    fn resource_from_result() {
        let ok: Resource<u8> = Ok(3).into();
        assert_eq!(ok.data(), Some(&3));
        let err: Resource<u8> = Err(AppError::NotFound).into();
        assert_eq!(err.error(), Some(&AppError::NotFound));
        assert!(Resource::<u8>::Loading.is_loading());
    }
}
