//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;

/// 翻译器配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    // 远程服务
    pub api_url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: Option<u64>,

    // 界面默认值
    pub default_target_lang: String,

    // 持久化
    pub data_dir: Option<PathBuf>,

    // 语音合成
    pub speech_program: String,
    pub speech_pitch: f32,
    pub speech_rate: f32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: constants::BUILD_API_KEY
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            request_timeout_secs: None,

            default_target_lang: constants::DEFAULT_TARGET_LANG.to_string(),

            data_dir: None,

            speech_program: constants::DEFAULT_SPEECH_PROGRAM.to_string(),
            speech_pitch: constants::DEFAULT_SPEECH_PITCH,
            speech_rate: constants::DEFAULT_SPEECH_RATE,
        }
    }
}

impl TranslatorConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| TranslationError::ConfigError(format!("API地址无效: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TranslationError::ConfigError(
                "API地址必须以 http:// 或 https:// 开头".to_string(),
            ));
        }

        if Language::from_code(&self.default_target_lang).is_none() {
            return Err(TranslationError::ConfigError(format!(
                "不支持的默认目标语言: {}",
                self.default_target_lang
            )));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(TranslationError::ConfigError("请求超时必须大于0".to_string()));
        }

        if !(self.speech_pitch > 0.0 && self.speech_pitch <= 2.0) {
            return Err(TranslationError::ConfigError("语音音调必须在 (0, 2] 范围内".to_string()));
        }

        if !(self.speech_rate > 0.0 && self.speech_rate <= 2.0) {
            return Err(TranslationError::ConfigError("语音语速必须在 (0, 2] 范围内".to_string()));
        }

        if self.speech_program.trim().is_empty() {
            return Err(TranslationError::ConfigError("语音程序不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{speech, storage, translation, EnvVar};

        if let Ok(api_url) = translation::ApiUrl::get() {
            self.api_url = api_url;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Ok(api_key) = translation::ApiKey::get() {
            self.api_key = Some(api_key);
        }

        if let Ok(timeout) = translation::RequestTimeout::get() {
            self.request_timeout_secs = Some(timeout.as_secs());
        }

        if let Ok(target_lang) = translation::TargetLang::get() {
            self.default_target_lang = target_lang;
        }

        if let Ok(data_dir) = storage::DataDir::get() {
            self.data_dir = Some(PathBuf::from(data_dir));
        }

        if let Ok(program) = speech::Program::get() {
            self.speech_program = program;
        }

        if let Ok(pitch) = speech::Pitch::get() {
            self.speech_pitch = pitch;
        }

        if let Ok(rate) = speech::Rate::get() {
            self.speech_rate = rate;
        }
    }

    /// 请求超时，未配置时沿用网络栈默认值
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// 数据目录，未配置时使用平台数据目录
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
            return PathBuf::from(expanded);
        }

        directories::ProjectDirs::from("", "", "speech-translator")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(constants::DATABASE_FILE)
    }

    /// 默认目标语言
    pub fn default_language(&self) -> Language {
        Language::from_code(&self.default_target_lang).unwrap_or_default()
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslatorConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建，仍然应用环境变量覆盖
    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslatorConfig {
        self.config
    }

    /// 从文件加载配置
    fn load_config() -> TranslationResult<TranslatorConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        // 查找配置文件
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            let candidate = Path::new(expanded_path.as_ref());
            if candidate.exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(candidate);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(TranslatorConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &Path) -> TranslationResult<TranslatorConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        // JSON 文件按 JSON 解析，其余按 TOML 解析
        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> TranslationResult<()> {
        let config = TranslatorConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
