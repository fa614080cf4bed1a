//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "SPEECH_TRANSLATOR_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "SPEECH_TRANSLATOR_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// API 密钥，兼容 GOOGLE_TRANSLATE_API_KEY
    pub struct ApiKey;
    impl ApiKey {
        pub const LEGACY_NAME: &'static str = "GOOGLE_TRANSLATE_API_KEY";
    }
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "SPEECH_TRANSLATOR_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "API key sent as the 'key' query parameter";

        fn get() -> EnvResult<String> {
            env::var(Self::NAME)
                .or_else(|_| env::var(Self::LEGACY_NAME))
                .map_err(|_| EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Required environment variable not set".to_string(),
                })
                .and_then(|value| Self::parse(&value))
        }

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key must not be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "SPEECH_TRANSLATOR_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = None;
        const DESCRIPTION: &'static str =
            "Request timeout in seconds (network stack default when unset)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number of seconds".to_string(),
            })?;

            if seconds == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Timeout must be greater than 0".to_string(),
                });
            }

            if seconds > 300 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Timeout too long (max 300 seconds)".to_string(),
                });
            }

            Ok(Duration::from_secs(seconds))
        }
    }

    /// 默认目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "SPEECH_TRANSLATOR_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Default target language (ISO 639-1 code)";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim().to_lowercase();
            if lang.len() != 2 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must be 2 characters (ISO 639-1)".to_string(),
                });
            }
            Ok(lang)
        }
    }
}

/// 存储相关环境变量
pub mod storage {
    use super::*;

    /// 数据目录
    pub struct DataDir;
    impl EnvVar<String> for DataDir {
        const NAME: &'static str = "SPEECH_TRANSLATOR_DATA_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory holding the history and preference database";

        fn parse(value: &str) -> EnvResult<String> {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Data directory must not be empty".to_string(),
                });
            }
            Ok(shellexpand::tilde(dir).into_owned())
        }
    }
}

/// 语音合成相关环境变量
pub mod speech {
    use super::*;

    /// 语音合成程序
    pub struct Program;
    impl EnvVar<String> for Program {
        const NAME: &'static str = "SPEECH_TRANSLATOR_SPEECH_PROGRAM";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "espeak-ng compatible speech synthesis program";

        fn parse(value: &str) -> EnvResult<String> {
            let program = value.trim();
            if program.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Program must not be empty".to_string(),
                });
            }
            Ok(program.to_string())
        }
    }

    /// 音调
    pub struct Pitch;
    impl EnvVar<f32> for Pitch {
        const NAME: &'static str = "SPEECH_TRANSLATOR_SPEECH_PITCH";
        const DEFAULT: Option<f32> = None;
        const DESCRIPTION: &'static str = "Speech pitch multiplier (0, 2]";

        fn parse(value: &str) -> EnvResult<f32> {
            parse_unit_range(value, Self::NAME)
        }
    }

    /// 语速
    pub struct Rate;
    impl EnvVar<f32> for Rate {
        const NAME: &'static str = "SPEECH_TRANSLATOR_SPEECH_RATE";
        const DEFAULT: Option<f32> = None;
        const DESCRIPTION: &'static str = "Speech rate multiplier (0, 2]";

        fn parse(value: &str) -> EnvResult<f32> {
            parse_unit_range(value, Self::NAME)
        }
    }
}

fn parse_unit_range(value: &str, var_name: &str) -> EnvResult<f32> {
    let num: f32 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number".to_string(),
    })?;

    if !(num > 0.0 && num <= 2.0) {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} must be within (0, 2]", num),
        });
    }

    Ok(num)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    push_entry(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION);
    push_entry(&mut docs, core::NoColor::NAME, core::NoColor::DESCRIPTION);

    docs.push_str("\n## Translation\n\n");
    push_entry(&mut docs, translation::ApiUrl::NAME, translation::ApiUrl::DESCRIPTION);
    docs.push_str(&format!(
        "- `{}` (or `{}`): {}\n",
        translation::ApiKey::NAME,
        translation::ApiKey::LEGACY_NAME,
        translation::ApiKey::DESCRIPTION
    ));
    push_entry(
        &mut docs,
        translation::RequestTimeout::NAME,
        translation::RequestTimeout::DESCRIPTION,
    );
    push_entry(&mut docs, translation::TargetLang::NAME, translation::TargetLang::DESCRIPTION);

    docs.push_str("\n## Storage\n\n");
    push_entry(&mut docs, storage::DataDir::NAME, storage::DataDir::DESCRIPTION);

    docs.push_str("\n## Speech\n\n");
    push_entry(&mut docs, speech::Program::NAME, speech::Program::DESCRIPTION);
    push_entry(&mut docs, speech::Pitch::NAME, speech::Pitch::DESCRIPTION);
    push_entry(&mut docs, speech::Rate::NAME, speech::Rate::DESCRIPTION);

    docs
}

fn push_entry(docs: &mut String, name: &str, description: &str) {
    docs.push_str(&format!("- `{}`: {}\n", name, description));
}
