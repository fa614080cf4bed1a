//! 翻译客户端
//!
//! 两阶段翻译管道：先请求远程翻译服务，任何失败（网络错误、非 2xx 状态码、
//! 响应格式不符、未配置密钥）都会被记录并转交离线兜底翻译器处理。
//!
//! ## 主要组件
//!
//! - `TranslationClient`: 发起远程请求并在失败时回退
//! - `Translation`: 区分权威结果和启发式结果的返回值
//! - `ClientStats`: 线程安全的统计信息
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use speech_translator::translation::{TranslationClient, TranslatorConfig};
//!
//! # async fn demo() -> speech_translator::translation::TranslationResult<()> {
//! let client = TranslationClient::new(&TranslatorConfig::default())?;
//! let result = client.translate("Hello", "es").await;
//! println!("{}", result.text());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use super::config::{constants, TranslatorConfig};
use super::error::{helpers, TranslationError, TranslationResult};
use super::fallback::FallbackTranslator;

/// 翻译结果
///
/// 远程服务返回的结果为 `Authoritative`，兜底翻译器生成的结果为 `Heuristic`。
/// 由界面层决定是否向用户展示两者的差别。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "text", rename_all = "lowercase")]
pub enum Translation {
    Authoritative(String),
    Heuristic(String),
}

impl Translation {
    /// 翻译文本
    pub fn text(&self) -> &str {
        match self {
            Translation::Authoritative(text) | Translation::Heuristic(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Translation::Authoritative(text) | Translation::Heuristic(text) => text,
        }
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self, Translation::Heuristic(_))
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// 请求体
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'a str,
}

/// 响应体：`{data: {translations: [{translatedText}]}}`
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedItem {
    translated_text: String,
}

/// 翻译客户端
///
/// 不持有任何业务状态，只保存 HTTP 客户端、端点和密钥。
pub struct TranslationClient {
    /// 复用连接池的 HTTP 客户端
    http: reqwest::Client,

    /// 远程翻译端点
    endpoint: String,

    /// 作为 `key` 查询参数发送的密钥
    api_key: Option<String>,

    fallback: FallbackTranslator,

    stats: ClientStats,
}

impl TranslationClient {
    /// 根据配置创建客户端
    ///
    /// 只有在配置了 `request_timeout_secs` 时才设置超时，否则沿用网络栈默认值。
    ///
    /// # 错误
    ///
    /// HTTP 客户端无法初始化（例如 TLS 后端不可用）时返回 `ConfigError`。
    pub fn new(config: &TranslatorConfig) -> TranslationResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| helpers::config_error(format!("无法创建HTTP客户端: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.api_url.clone(),
            api_key: config.api_key.clone(),
            fallback: FallbackTranslator::new(),
            stats: ClientStats::default(),
        })
    }

    /// 翻译文本，永不失败
    ///
    /// 调用方负责在调用前拒绝空输入。远程阶段的任何错误都被记录为警告，
    /// 然后用同样的输入调用兜底翻译器。
    pub async fn translate(&self, text: &str, target_lang: &str) -> Translation {
        match self.request_remote(text, target_lang).await {
            Ok(translated) => {
                self.stats.inc_remote_successes();
                tracing::debug!("远程翻译成功: {} -> {}", target_lang, translated);
                Translation::Authoritative(translated)
            }
            Err(e) => {
                self.stats.inc_fallbacks();
                tracing::warn!("远程翻译失败，使用兜底翻译: {}", e);
                Translation::Heuristic(self.fallback.translate(text, target_lang))
            }
        }
    }

    /// 只执行远程阶段
    ///
    /// 成功时原样返回第一个 `translatedText`，不做裁剪或其他后处理。
    /// 第一个 `translatedText` 为空时返回 `ParseError`。
    pub async fn request_remote(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| helpers::config_error("未配置API密钥"))?;

        let body = TranslateRequest {
            q: text,
            target: target_lang,
            format: constants::REQUEST_FORMAT,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ServiceError(format!(
                "翻译服务返回状态码 {}",
                status
            )));
        }

        let payload = response.text().await?;
        let parsed: TranslateResponse = serde_json::from_str(&payload)
            .map_err(|e| TranslationError::ParseError(format!("翻译服务响应格式无效: {}", e)))?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|item| item.translated_text)
            // 空译文视为无效响应，交给兜底翻译
            .filter(|translated| !translated.is_empty())
            .ok_or_else(|| TranslationError::ParseError("响应中没有翻译结果".to_string()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn get_stats(&self) -> &ClientStats {
        &self.stats
    }
}

/// 客户端统计信息
#[derive(Debug, Default)]
pub struct ClientStats {
    /// 远程翻译成功次数
    pub remote_successes: AtomicUsize,

    /// 回退到兜底翻译的次数
    pub fallbacks: AtomicUsize,
}

impl ClientStats {
    pub fn inc_remote_successes(&self) {
        self.remote_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fallbacks(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取统计快照
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            remote_successes: self.remote_successes.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// 统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    pub remote_successes: usize,
    pub fallbacks: usize,
}
