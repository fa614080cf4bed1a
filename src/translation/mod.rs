//! 翻译功能模块
//!
//! ## 模块组织
//!
//! - `client` - 远程翻译请求与兜底回退
//! - `fallback` - 离线启发式翻译器
//! - `language` - 支持的目标语言目录
//! - `config` - 配置管理
//! - `error` - 错误类型

pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod language;

pub use client::{ClientStats, ClientStatsSnapshot, Translation, TranslationClient};
pub use config::{ConfigManager, TranslatorConfig};
pub use error::{helpers, ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use fallback::{fallback_translate, FallbackTranslator};
pub use language::Language;
