//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslatorConfig};

/// 配置常量
pub mod constants {
    // 默认API设置
    pub const DEFAULT_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";
    pub const REQUEST_FORMAT: &str = "text";

    // 构建时注入的API密钥
    pub const BUILD_API_KEY: Option<&str> = option_env!("GOOGLE_TRANSLATE_API_KEY");

    // 默认目标语言
    pub const DEFAULT_TARGET_LANG: &str = "es";

    // 历史记录上限
    pub const MAX_HISTORY_ITEMS: usize = 10;

    // 存储键
    pub const HISTORY_STORAGE_KEY: &str = "translation_history";
    pub const THEME_STORAGE_KEY: &str = "user_theme_preference";
    pub const DATABASE_FILE: &str = "speech-translator.redb";

    // 语音合成
    pub const DEFAULT_SPEECH_PROGRAM: &str = "espeak-ng";
    pub const DEFAULT_SPEECH_PITCH: f32 = 1.0;
    pub const DEFAULT_SPEECH_RATE: f32 = 0.9;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "speech-translator.toml",
        ".speech-translator.toml",
        "speech-translator.json",
        "~/.config/speech-translator/config.toml",
        "/etc/speech-translator/config.toml",
    ];
}

/// 加载配置，失败时退回默认值
pub fn load_translator_config() -> TranslatorConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.into_config(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            TranslatorConfig::default()
        }
    }
}
