//! 支持的目标语言目录
//!
//! 固定的 8 种语言，用于校验语言代码并在代码与显示名称之间转换。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{TranslationError, TranslationResult};

/// 目标语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Es,
    Fr,
    De,
    It,
    Ja,
    Ko,
    Zh,
}

impl Language {
    /// 目录中的全部语言，按界面展示顺序排列
    pub const ALL: [Language; 8] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::It,
        Language::Ja,
        Language::Ko,
        Language::Zh,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Zh => "zh",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::It => "Italian",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Zh => "Chinese",
        }
    }

    /// 按语言代码查找，大小写敏感
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    /// 按显示名称查找
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.display_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> TranslationResult<Self> {
        let trimmed = s.trim();
        Self::from_code(trimmed)
            .or_else(|| Self::from_display_name(trimmed))
            .ok_or_else(|| TranslationError::InvalidInput(format!("不支持的语言: {}", s)))
    }
}
