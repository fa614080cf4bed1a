//! 翻译历史记录
//!
//! 最新的记录在前，最多保留 10 条。整个列表序列化为一个 JSON 数组保存在
//! 单个键下，读取和写入都是整体进行。读写失败只记录日志，不向调用方报错。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use crate::translation::config::constants;
use crate::translation::error::{helpers, TranslationResult};

/// 单条翻译记录，创建后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    source_text: String,
    translated_text: String,
    target_language: String,
    /// Unix 毫秒时间戳
    timestamp: i64,
}

impl TranslationRecord {
    /// 以当前时间创建记录，原文去除空白后不能为空
    pub fn new(
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        target_language: impl Into<String>,
    ) -> TranslationResult<Self> {
        Self::with_timestamp(
            source_text,
            translated_text,
            target_language,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    pub fn with_timestamp(
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        target_language: impl Into<String>,
        timestamp: i64,
    ) -> TranslationResult<Self> {
        let source_text = source_text.into();
        if source_text.trim().is_empty() {
            return Err(helpers::validation_error("原文不能为空"));
        }

        Ok(Self {
            source_text,
            translated_text: translated_text.into(),
            target_language: target_language.into(),
            timestamp,
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// 本地时间格式的创建时间
    pub fn formatted_time(&self) -> String {
        use chrono::TimeZone;

        chrono::Local
            .timestamp_millis_opt(self.timestamp)
            .single()
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}

/// 历史记录存储
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    entries: Vec<TranslationRecord>,
}

impl HistoryStore {
    /// 创建存储并加载已持久化的记录
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            kv,
            entries: Vec::new(),
        };
        store.load();
        store
    }

    /// 重新读取持久化的记录
    ///
    /// 数据缺失、读取失败或反序列化失败时返回空列表。
    pub fn load(&mut self) -> Vec<TranslationRecord> {
        self.entries = match self.kv.get(constants::HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<TranslationRecord>>(&raw) {
                Ok(mut records) => {
                    records.truncate(constants::MAX_HISTORY_ITEMS);
                    records
                }
                Err(e) => {
                    tracing::warn!("历史记录格式无效，忽略: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("加载历史记录失败: {}", e);
                Vec::new()
            }
        };

        self.entries.clone()
    }

    /// 在最前面插入记录，截断到最近 10 条并整体写回
    pub fn append(&mut self, mut record: TranslationRecord) -> Vec<TranslationRecord> {
        // 保证时间戳单调不减
        if let Some(newest) = self.entries.first() {
            record.timestamp = record.timestamp.max(newest.timestamp);
        }

        self.entries.insert(0, record);
        self.entries.truncate(constants::MAX_HISTORY_ITEMS);
        self.persist();

        self.entries.clone()
    }

    /// 清空历史记录，可以重复调用
    pub fn clear(&mut self) -> Vec<TranslationRecord> {
        self.entries.clear();
        if let Err(e) = self.kv.remove(constants::HISTORY_STORAGE_KEY) {
            tracing::warn!("清除历史记录失败: {}", e);
        }

        Vec::new()
    }

    /// 当前记录，不触发读写
    pub fn entries(&self) -> &[TranslationRecord] {
        &self.entries
    }

    /// 按位置取记录，0 为最新
    pub fn get(&self, index: usize) -> Option<&TranslationRecord> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let result: TranslationResult<()> = serde_json::to_string(&self.entries)
            .map_err(Into::into)
            .and_then(|raw| self.kv.set(constants::HISTORY_STORAGE_KEY, &raw));

        match result {
            Ok(()) => tracing::debug!("已保存 {} 条历史记录", self.entries.len()),
            Err(e) => tracing::warn!("保存历史记录失败: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryStore;
    use crate::translation::error::TranslationError;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> TranslationResult<Option<String>> {
            Err(TranslationError::StorageError("读取失败".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> TranslationResult<()> {
            Err(TranslationError::StorageError("写入失败".to_string()))
        }

        fn remove(&self, _key: &str) -> TranslationResult<()> {
            Err(TranslationError::StorageError("删除失败".to_string()))
        }
    }

    fn record(i: i64) -> TranslationRecord {
        TranslationRecord::with_timestamp(format!("text {}", i), format!("texto {}", i), "es", i)
            .unwrap()
    }

    #[test]
    fn test_record_rejects_blank_source() {
        assert!(TranslationRecord::new("   ", "x", "es").is_err());
        assert!(TranslationRecord::new("Hi", "", "es").is_ok());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(record(7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sourceText": "text 7",
                "translatedText": "texto 7",
                "targetLanguage": "es",
                "timestamp": 7
            })
        );
    }

    #[test]
    fn test_append_keeps_newest_ten() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = HistoryStore::open(kv.clone());

        for i in 0..11 {
            store.append(record(i));
        }

        let entries = store.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].source_text(), "text 10");
        assert_eq!(entries[9].source_text(), "text 1");

        let mut reopened = HistoryStore::open(kv);
        assert_eq!(reopened.load(), store.entries().to_vec());
    }

    #[test]
    fn test_get_by_position() {
        let mut store = HistoryStore::open(Arc::new(MemoryStore::new()));
        store.append(record(1));
        store.append(record(2));

        assert_eq!(store.get(0).unwrap().source_text(), "text 2");
        assert_eq!(store.get(1).unwrap().source_text(), "text 1");
        assert!(store.get(2).is_none());
    }

    #[test]
    fn test_append_clamps_timestamp() {
        let mut store = HistoryStore::open(Arc::new(MemoryStore::new()));
        store.append(record(100));
        let entries = store.append(record(50));
        assert_eq!(entries[0].timestamp(), 100);
        assert_eq!(entries[0].source_text(), "text 50");
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(constants::HISTORY_STORAGE_KEY, "{not json").unwrap();

        let mut store = HistoryStore::open(kv);
        assert!(store.is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_broken_store_fails_soft() {
        let mut store = HistoryStore::open(Arc::new(BrokenStore));
        assert!(store.load().is_empty());

        let entries = store.append(record(1));
        assert_eq!(entries.len(), 1);

        assert!(store.clear().is_empty());
    }

    #[test]
    fn test_clear_twice() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = HistoryStore::open(kv.clone());
        store.append(record(1));

        assert!(store.clear().is_empty());
        assert!(store.clear().is_empty());
        assert_eq!(kv.get(constants::HISTORY_STORAGE_KEY).unwrap(), None);
    }
}
