//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。
//! 对用户可见的只有输入验证错误和语音错误，其余错误在内部被记录并降级处理。

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译服务返回非成功状态码
    #[error("翻译服务错误: {0}")]
    ServiceError(String),

    /// 响应格式错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 持久化存储错误
    #[error("存储错误: {0}")]
    StorageError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 语音合成错误
    #[error("语音错误: {0}")]
    SpeechError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::ServiceError(_) => ErrorSeverity::Warning,
            TranslationError::ParseError(_) => ErrorSeverity::Warning,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::StorageError(_) => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::SpeechError(_) => ErrorSeverity::Error,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::ServiceError(_) => ErrorCategory::Service,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::StorageError(_) => ErrorCategory::Storage,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::SpeechError(_) => ErrorCategory::Speech,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 是否需要直接提示给用户
    ///
    /// 网络和存储错误会被静默降级，只有输入错误和语音错误需要弹出提示。
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            TranslationError::InvalidInput(_) | TranslationError::SpeechError(_)
        )
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let new_msg = format!("{} (上下文: {})", self.message(), context);

        match &mut self {
            TranslationError::ConfigError(ref mut msg)
            | TranslationError::NetworkError(ref mut msg)
            | TranslationError::ServiceError(ref mut msg)
            | TranslationError::ParseError(ref mut msg)
            | TranslationError::InvalidInput(ref mut msg)
            | TranslationError::StorageError(ref mut msg)
            | TranslationError::SerializationError(ref mut msg)
            | TranslationError::SpeechError(ref mut msg)
            | TranslationError::InternalError(ref mut msg) => *msg = new_msg,
        }

        self
    }

    fn message(&self) -> &str {
        match self {
            TranslationError::ConfigError(msg)
            | TranslationError::NetworkError(msg)
            | TranslationError::ServiceError(msg)
            | TranslationError::ParseError(msg)
            | TranslationError::InvalidInput(msg)
            | TranslationError::StorageError(msg)
            | TranslationError::SerializationError(msg)
            | TranslationError::SpeechError(msg)
            | TranslationError::InternalError(msg) => msg,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Service,
    Parsing,
    Input,
    Storage,
    Serialization,
    Speech,
    Internal,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::ParseError(format!("响应解码失败: {}", error))
        } else if let Some(status) = error.status() {
            TranslationError::ServiceError(format!("HTTP {}: {}", status, error))
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::StorageError(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<redb::Error> for TranslationError {
    fn from(error: redb::Error) -> Self {
        TranslationError::StorageError(format!("数据库错误: {}", error))
    }
}

impl From<crate::env::EnvError> for TranslationError {
    fn from(error: crate::env::EnvError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InvalidInput(msg.to_string())
    }

    /// 创建存储错误
    pub fn storage_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::StorageError(msg.to_string())
    }

    /// 创建语音错误
    pub fn speech_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::SpeechError(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_errors() {
        assert!(helpers::validation_error("空文本").is_user_facing());
        assert!(helpers::speech_error("引擎不可用").is_user_facing());
        assert!(!TranslationError::NetworkError("超时".to_string()).is_user_facing());
        assert!(!helpers::storage_error("磁盘已满").is_user_facing());
    }

    #[test]
    fn test_with_context_keeps_variant() {
        let error = helpers::storage_error("写入失败").with_context("translation_history");
        assert_eq!(error.category(), ErrorCategory::Storage);
        assert!(error.to_string().contains("写入失败"));
        assert!(error.to_string().contains("translation_history"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Warning);
        assert_eq!(
            TranslationError::ParseError("缺少字段".to_string()).severity(),
            ErrorSeverity::Warning
        );
    }
}
