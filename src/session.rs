//! 翻译会话
//!
//! 翻译界面的状态：选中的目标语言、最近一次结果和历史记录。
//! `translate` 需要 `&mut self`，因此同一会话同时最多只有一个请求在进行。

use crate::storage::{HistoryStore, TranslationRecord};
use crate::translation::error::{helpers, TranslationResult};
use crate::translation::{Language, Translation, TranslationClient};

pub struct TranslatorSession {
    client: TranslationClient,
    history: HistoryStore,
    language: Language,
    last: Option<Translation>,
}

impl TranslatorSession {
    pub fn new(client: TranslationClient, history: HistoryStore) -> Self {
        Self {
            client,
            history,
            language: Language::default(),
            last: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// 选择目标语言，只接受目录中的语言代码
    pub fn select_language(&mut self, code: &str) -> TranslationResult<Language> {
        let language = Language::from_code(code)
            .ok_or_else(|| helpers::validation_error(format!("不支持的语言代码: {}", code)))?;
        self.language = language;
        Ok(language)
    }

    /// 翻译并记录历史
    ///
    /// 空白输入直接返回 `InvalidInput`，不发出任何请求。
    /// 翻译本身不会失败，远程错误已在客户端内回退。
    pub async fn translate(&mut self, text: &str) -> TranslationResult<Translation> {
        if text.trim().is_empty() {
            return Err(helpers::validation_error("请输入要翻译的文本"));
        }

        let code = self.language.code();
        let translation = self.client.translate(text, code).await;

        let record = TranslationRecord::new(text, translation.text(), code)?;
        self.history.append(record);

        self.last = Some(translation.clone());
        Ok(translation)
    }

    pub fn last_translation(&self) -> Option<&Translation> {
        self.last.as_ref()
    }

    pub fn history(&self) -> &[TranslationRecord] {
        self.history.entries()
    }

    pub fn clear_history(&mut self) -> Vec<TranslationRecord> {
        self.history.clear()
    }

    pub fn client(&self) -> &TranslationClient {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::translation::{TranslationError, TranslatorConfig};
    use std::sync::Arc;

    fn offline_session() -> TranslatorSession {
        let config = TranslatorConfig {
            api_key: None,
            ..TranslatorConfig::default()
        };
        let client = TranslationClient::new(&config).unwrap();
        TranslatorSession::new(client, HistoryStore::open(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn test_default_language_is_spanish() {
        assert_eq!(offline_session().language(), Language::Es);
    }

    #[test]
    fn test_select_language() {
        let mut session = offline_session();
        assert_eq!(session.select_language("fr").unwrap(), Language::Fr);
        assert!(matches!(
            session.select_language("pt"),
            Err(TranslationError::InvalidInput(_))
        ));
        assert_eq!(session.language(), Language::Fr);
    }

    #[tokio::test]
    async fn test_blank_input_rejected_without_history() {
        let mut session = offline_session();
        let err = session.translate("   ").await.unwrap_err();
        assert!(matches!(err, TranslationError::InvalidInput(_)));
        assert!(session.history().is_empty());
        assert!(session.last_translation().is_none());
    }

    #[tokio::test]
    async fn test_translate_records_history() {
        let mut session = offline_session();
        session.select_language("fr").unwrap();

        let result = session.translate("Hello").await.unwrap();
        assert_eq!(result, Translation::Heuristic("Bonjour".to_string()));
        assert_eq!(session.last_translation(), Some(&result));

        let history = session.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].source_text(), "Hello");
        assert_eq!(history[0].translated_text(), "Bonjour");
        assert_eq!(history[0].target_language(), "fr");

        assert!(session.clear_history().is_empty());
        assert!(session.history().is_empty());
    }
}
