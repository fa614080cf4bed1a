//! 键值存储
//!
//! 历史记录和主题偏好都通过这个接口读写：整值读取、整值写入，没有部分更新。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use redb::{Database, TableDefinition, TableError};

use crate::translation::error::{helpers, TranslationError, TranslationResult};

/// 持久化键值存储
pub trait KeyValueStore: Send + Sync {
    /// 读取键对应的值，键不存在时返回 `None`
    fn get(&self, key: &str) -> TranslationResult<Option<String>>;

    /// 写入整个值
    fn set(&self, key: &str, value: &str) -> TranslationResult<()>;

    /// 删除键，键不存在时不报错
    fn remove(&self, key: &str) -> TranslationResult<()>;
}

const TABLE: TableDefinition<&str, &str> = TableDefinition::new("key_value");

fn db_error<E: Into<redb::Error>>(error: E) -> TranslationError {
    TranslationError::from(error.into())
}

/// 基于 redb 的磁盘存储
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// 打开或创建数据库文件，必要时创建父目录
    pub fn open(path: &Path) -> TranslationResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path).map_err(db_error)?;
        tracing::debug!("打开数据库: {}", path.display());

        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        let txn = self.db.begin_read().map_err(db_error)?;
        let table = match txn.open_table(TABLE) {
            Ok(table) => table,
            // 首次写入之前表还不存在
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(db_error(e)),
        };

        let value = table.get(key).map_err(db_error)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let txn = self.db.begin_write().map_err(db_error)?;
        {
            let mut table = txn.open_table(TABLE).map_err(db_error)?;
            table.insert(key, value).map_err(db_error)?;
        }
        txn.commit().map_err(db_error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<()> {
        let txn = self.db.begin_write().map_err(db_error)?;
        {
            let mut table = txn.open_table(TABLE).map_err(db_error)?;
            table.remove(key).map_err(db_error)?;
        }
        txn.commit().map_err(db_error)?;
        Ok(())
    }
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| helpers::storage_error("存储锁已失效"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| helpers::storage_error("存储锁已失效"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| helpers::storage_error("存储锁已失效"))?;
        entries.remove(key);
        Ok(())
    }
}
