// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use speech_translator::speech::{SpeechCallback, SpeechEngine, SpeechOptions, Voice};
use speech_translator::storage::{KeyValueStore, RedbStore};
use speech_translator::translation::{TranslationResult, TranslatorConfig};

/// 本地翻译端点收到的请求
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// 替代远程翻译服务的本地端点
pub struct StubEndpoint {
    pub url: String,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubEndpoint {
    /// 以固定状态码和响应体启动端点
    pub async fn spawn(status: StatusCode, body: impl Into<String>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status,
            body: body.into(),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/translate", post(handle_translate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub endpoint");
        let addr = listener.local_addr().expect("stub endpoint address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{}/translate", addr),
            requests,
        }
    }

    /// 返回一条翻译结果的端点
    pub async fn translating_to(translated: &str) -> Self {
        let body = serde_json::json!({
            "data": { "translations": [{ "translatedText": translated }] }
        });
        Self::spawn(StatusCode::OK, body.to_string()).await
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

async fn handle_translate(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, String) {
    state.requests.lock().unwrap().push(CapturedRequest {
        key: params.get("key").cloned(),
        body,
    });
    (state.status, state.body.clone())
}

/// 无法连接的端点
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/translate";

/// 指向给定端点的配置
pub fn config_for(url: &str, api_key: Option<&str>) -> TranslatorConfig {
    TranslatorConfig {
        api_url: url.to_string(),
        api_key: api_key.map(str::to_string),
        request_timeout_secs: Some(5),
        ..TranslatorConfig::default()
    }
}

/// 临时目录中的 redb 存储
pub struct TempDatabase {
    pub dir: tempfile::TempDir,
}

impl TempDatabase {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> std::path::PathBuf {
        self.dir.path().join("speech-translator.redb")
    }

    /// 打开存储；重复调用模拟应用重启
    pub fn open(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(RedbStore::open(&self.path()).expect("open redb store"))
    }
}

/// 记录调用的语音引擎
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Mutex<Vec<String>>,
    pub spoken: Mutex<Vec<SpeechOptions>>,
    pub callbacks: Mutex<Vec<SpeechCallback>>,
    pub voices: Vec<Voice>,
    pub fail_speak: bool,
}

impl RecordingEngine {
    pub fn with_voices(voices: &[(&str, &str)]) -> Self {
        Self {
            voices: voices
                .iter()
                .map(|(identifier, language)| Voice {
                    identifier: identifier.to_string(),
                    name: identifier.to_string(),
                    language: language.to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// 结束最近一次朗读
    pub fn finish_latest(&self, event: speech_translator::speech::SpeechEvent) {
        let callback = self.callbacks.lock().unwrap().pop();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl SpeechEngine for RecordingEngine {
    fn stop(&self) -> TranslationResult<()> {
        self.calls.lock().unwrap().push("stop".to_string());
        Ok(())
    }

    fn available_voices(&self) -> TranslationResult<Vec<Voice>> {
        Ok(self.voices.clone())
    }

    fn speak(
        &self,
        text: &str,
        options: &SpeechOptions,
        on_event: SpeechCallback,
    ) -> TranslationResult<()> {
        if self.fail_speak {
            return Err(speech_translator::translation::helpers::speech_error(
                "engine unavailable",
            ));
        }
        self.calls.lock().unwrap().push(format!("speak:{}", text));
        self.spoken.lock().unwrap().push(options.clone());
        self.callbacks.lock().unwrap().push(on_event);
        Ok(())
    }
}
