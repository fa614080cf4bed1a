//! 存储模块
//!
//! 提供翻译历史和主题偏好的持久化。

pub mod history;
pub mod kv;
pub mod preference;

pub use history::{HistoryStore, TranslationRecord};
pub use kv::{KeyValueStore, MemoryStore, RedbStore};
pub use preference::{PreferenceStore, ThemePreference};
