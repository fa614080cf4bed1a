//! 主题管理模块
//!
//! 维护当前的明暗主题：启动时读取已保存的偏好，没有偏好时使用设备报告的
//! 配色方案；切换或显式设置时写回偏好存储。

use serde::Serialize;

use crate::storage::{PreferenceStore, ThemePreference};

/// 主题颜色配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    /// 文本色
    pub text: &'static str,
    /// 背景色
    pub background: &'static str,
    /// 强调色
    pub tint: &'static str,
    /// 图标色
    pub icon: &'static str,
    /// 边框色
    pub border: &'static str,
    /// 卡片背景色
    pub card: &'static str,
    /// 错误色
    pub error: &'static str,
    /// 成功色
    pub success: &'static str,
    /// 警告色
    pub warning: &'static str,
}

const TINT: &str = "#0a7ea4";

pub const LIGHT_COLORS: ThemeColors = ThemeColors {
    text: "#000",
    background: "#fff",
    tint: TINT,
    icon: "#666",
    border: "#e0e0e0",
    card: "#f9f9f9",
    error: "#ff3b30",
    success: "#34c759",
    warning: "#ffcc00",
};

pub const DARK_COLORS: ThemeColors = ThemeColors {
    text: "#fff",
    background: "#121212",
    tint: TINT,
    icon: "#ccc",
    border: "#333",
    card: "#1e1e1e",
    error: "#ff453a",
    success: "#30d158",
    warning: "#ffd60a",
};

impl ThemeColors {
    pub fn for_theme(theme: ThemePreference) -> &'static ThemeColors {
        match theme {
            ThemePreference::Light => &LIGHT_COLORS,
            ThemePreference::Dark => &DARK_COLORS,
        }
    }

    /// 按名称列出所有颜色
    pub fn variables(&self) -> [(&'static str, &'static str); 9] {
        [
            ("text", self.text),
            ("background", self.background),
            ("tint", self.tint),
            ("icon", self.icon),
            ("border", self.border),
            ("card", self.card),
            ("error", self.error),
            ("success", self.success),
            ("warning", self.warning),
        ]
    }
}

/// 当前主题状态
pub struct ThemeState {
    store: PreferenceStore,
    current: ThemePreference,
}

impl ThemeState {
    /// 读取已保存的偏好，没有时使用设备配色方案（默认浅色）
    pub fn initialize(store: PreferenceStore, device_scheme: Option<ThemePreference>) -> Self {
        let current = match store.load() {
            Some(saved) => saved,
            None => device_scheme.unwrap_or_default(),
        };
        tracing::debug!("当前主题: {}", current);

        Self { store, current }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    pub fn is_dark(&self) -> bool {
        self.current.is_dark()
    }

    /// 切换主题并保存
    pub fn toggle(&mut self) -> ThemePreference {
        self.set(PreferenceStore::toggle(self.current))
    }

    pub fn set(&mut self, theme: ThemePreference) -> ThemePreference {
        self.current = theme;
        self.store.save(theme);
        theme
    }

    pub fn palette(&self) -> &'static ThemeColors {
        ThemeColors::for_theme(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_device_scheme_used_without_saved_preference() {
        let kv = Arc::new(MemoryStore::new());
        let state = ThemeState::initialize(
            PreferenceStore::new(kv.clone()),
            Some(ThemePreference::Dark),
        );
        assert_eq!(state.current(), ThemePreference::Dark);

        let state = ThemeState::initialize(PreferenceStore::new(kv), None);
        assert_eq!(state.current(), ThemePreference::Light);
    }

    #[test]
    fn test_saved_preference_wins_over_device() {
        let kv = Arc::new(MemoryStore::new());
        PreferenceStore::new(kv.clone()).save(ThemePreference::Dark);

        let state = ThemeState::initialize(PreferenceStore::new(kv), Some(ThemePreference::Light));
        assert!(state.is_dark());
        assert_eq!(state.palette().background, "#121212");
    }

    #[test]
    fn test_toggle_persists() {
        let kv = Arc::new(MemoryStore::new());
        let mut state = ThemeState::initialize(PreferenceStore::new(kv.clone()), None);

        assert_eq!(state.toggle(), ThemePreference::Dark);
        assert_eq!(PreferenceStore::new(kv.clone()).load(), Some(ThemePreference::Dark));

        assert_eq!(state.toggle(), ThemePreference::Light);
        assert_eq!(PreferenceStore::new(kv).load(), Some(ThemePreference::Light));
    }

    #[test]
    fn test_palettes() {
        assert_eq!(ThemeColors::for_theme(ThemePreference::Light).text, "#000");
        assert_eq!(ThemeColors::for_theme(ThemePreference::Dark).text, "#fff");
        assert_eq!(LIGHT_COLORS.tint, DARK_COLORS.tint);
        assert_eq!(LIGHT_COLORS.variables()[0], ("text", "#000"));
    }
}
