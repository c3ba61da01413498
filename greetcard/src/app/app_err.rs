use std::{backtrace::Backtrace, error::Error, fmt::Display};

use axum::response::{IntoResponse, Response};

use crate::app::response::AppResponse;

/// 通用错误码
pub const ERR_SYSTEM: i32 = -1;
/// 未输入名字
pub const ERR_NAME_REQUIRED: i32 = 1001;
/// 链接生成失败
pub const ERR_LINK: i32 = 1002;
/// 图片生成失败
pub const ERR_RENDER: i32 = 1003;

#[derive(Debug)]
pub struct AppError {
    code: i32,
    message: String,
    backtrace: Backtrace,
}

impl AppError {
    pub fn new(message: &str) -> Self {
        AppError {
            code: ERR_SYSTEM,
            message: message.to_string(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn new_with_errcode(code: i32, message: &str) -> Self {
        AppError {
            code,
            message: message.to_string(),
            backtrace: Backtrace::capture(),
        }
    }

    // 获取错误码
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 用户输入导致的错误，不需要堆栈
    pub fn is_user_error(&self) -> bool {
        self.code == ERR_NAME_REQUIRED
    }

    // 获取堆栈跟踪
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "code:{}, {}", self.code, self.message)
    }
}

impl Error for AppError {}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_user_error() {
            crate::common::loggers::logger::warn(&self);
        } else {
            crate::common::loggers::logger::error(&self);
        }
        AppResponse::<()>::fail(self.code, self.message).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if let Ok(app_err) = err.downcast::<AppError>() {
            return app_err;
        }

        AppError::new_with_errcode(ERR_SYSTEM, &message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_keeps_app_error_code() {
        let err: anyhow::Error = AppError::new_with_errcode(ERR_LINK, "bad link").into();
        let app_err = AppError::from(err);
        assert_eq!(app_err.code(), ERR_LINK);
        assert_eq!(app_err.message(), "bad link");

        let app_err = AppError::from(anyhow::anyhow!("boom"));
        assert_eq!(app_err.code(), ERR_SYSTEM);
        assert_eq!(app_err.to_string(), "code:-1, boom");
    }

    #[test]
    fn missing_name_is_a_user_error() {
        assert!(AppError::new_with_errcode(ERR_NAME_REQUIRED, "name").is_user_error());
        assert!(!AppError::new_with_errcode(ERR_RENDER, "render").is_user_error());
        assert!(!AppError::new("boom").is_user_error());
    }
}
