//! 主题偏好存储
//!
//! 以原始字符串 `light` / `dark` 保存在单个键下。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use crate::translation::config::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 主题偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// 相反的主题
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemePreference::Dark
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = TranslationError;

    fn from_str(s: &str) -> TranslationResult<Self> {
        match s.trim() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(TranslationError::InvalidInput(format!("未知主题: {}", other))),
        }
    }
}

/// 主题偏好存储
pub struct PreferenceStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// 读取已保存的偏好
    ///
    /// 未保存、读取失败或值无法识别时返回 `None`，由调用方退回系统主题。
    pub fn load(&self) -> Option<ThemePreference> {
        match self.kv.get(constants::THEME_STORAGE_KEY) {
            Ok(Some(raw)) => match raw.parse() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::warn!("忽略无效的主题偏好: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("加载主题偏好失败: {}", e);
                None
            }
        }
    }

    /// 保存偏好，失败只记录日志
    pub fn save(&self, value: ThemePreference) {
        match self.kv.set(constants::THEME_STORAGE_KEY, value.as_str()) {
            Ok(()) => tracing::debug!("已保存主题偏好: {}", value),
            Err(e) => tracing::warn!("保存主题偏好失败: {}", e),
        }
    }

    /// 返回相反的主题，不做持久化
    pub fn toggle(current: ThemePreference) -> ThemePreference {
        current.toggled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryStore;

    #[test]
    fn test_toggle() {
        assert_eq!(PreferenceStore::toggle(ThemePreference::Light), ThemePreference::Dark);
        assert_eq!(PreferenceStore::toggle(ThemePreference::Dark), ThemePreference::Light);
    }

    #[test]
    fn test_save_then_load() {
        let store = PreferenceStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load(), None);

        store.save(ThemePreference::Dark);
        assert_eq!(store.load(), Some(ThemePreference::Dark));

        store.save(ThemePreference::Light);
        assert_eq!(store.load(), Some(ThemePreference::Light));
    }

    #[test]
    fn test_stored_as_raw_string() {
        let kv = Arc::new(MemoryStore::new());
        let store = PreferenceStore::new(kv.clone());
        store.save(ThemePreference::Dark);
        assert_eq!(
            kv.get(constants::THEME_STORAGE_KEY).unwrap(),
            Some("dark".to_string())
        );
    }

    #[test]
    fn test_unknown_value_is_absent() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(constants::THEME_STORAGE_KEY, "sepia").unwrap();
        assert_eq!(PreferenceStore::new(kv).load(), None);
    }
}
