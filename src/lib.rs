//! # Speech Translator Library
//!
//! 文本翻译工具库：远程翻译失败时静默回退到离线启发式翻译，保存最近的
//! 翻译历史和明暗主题偏好，并可朗读翻译结果。
//!
//! ## 模块组织
//!
//! - `translation` - 翻译客户端、兜底翻译器、语言目录、配置和错误类型
//! - `storage` - 键值存储、翻译历史和主题偏好
//! - `theme` - 当前主题与配色
//! - `speech` - 语音朗读
//! - `session` - 翻译会话状态
//! - `env` - 环境变量

pub mod env;
pub mod session;
pub mod speech;
pub mod storage;
pub mod theme;
pub mod translation;

// Re-export commonly used items for convenience
pub use session::TranslatorSession;
pub use storage::{HistoryStore, PreferenceStore, ThemePreference, TranslationRecord};
pub use translation::{
    fallback_translate, Language, Translation, TranslationClient, TranslationError,
    TranslationResult, TranslatorConfig,
};
