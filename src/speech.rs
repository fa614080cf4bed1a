//! 语音朗读
//!
//! 语音引擎是进程内唯一的共享资源，同一时间只播放一段语音：开始新的朗读之前
//! 必须先停止当前朗读（后来者优先），没有排队。

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::storage::TranslationRecord;
use crate::translation::config::TranslatorConfig;
use crate::translation::error::{helpers, TranslationError, TranslationResult};

/// 可用的语音
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub identifier: String,
    pub name: String,
    /// 语言标签，例如 `en-US`
    pub language: String,
}

/// 朗读参数
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    pub language: String,
    pub voice: Option<String>,
    pub pitch: f32,
    pub rate: f32,
}

/// 朗读结束事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Done,
    Error(String),
}

pub type SpeechCallback = Box<dyn FnOnce(SpeechEvent) + Send + 'static>;

/// 语音合成引擎
pub trait SpeechEngine: Send + Sync {
    /// 停止当前朗读，没有朗读时也应成功
    fn stop(&self) -> TranslationResult<()>;

    fn available_voices(&self) -> TranslationResult<Vec<Voice>>;

    /// 开始朗读，结束或出错时调用一次 `on_event`
    fn speak(
        &self,
        text: &str,
        options: &SpeechOptions,
        on_event: SpeechCallback,
    ) -> TranslationResult<()>;
}

/// 选择语言标签以语言代码前两个字符开头的第一个语音
pub fn select_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    let prefix: String = language.chars().take(2).collect();
    voices.iter().find(|voice| voice.language.starts_with(&prefix))
}

/// 朗读协调器
pub struct Speaker {
    engine: Arc<dyn SpeechEngine>,
    speaking: Arc<AtomicBool>,
    /// 每次朗读递增，过期回调据此忽略
    generation: Arc<AtomicU64>,
    pitch: f32,
    rate: f32,
}

impl Speaker {
    pub fn new(engine: Arc<dyn SpeechEngine>, pitch: f32, rate: f32) -> Self {
        Self {
            engine,
            speaking: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            pitch,
            rate,
        }
    }

    pub fn from_config(engine: Arc<dyn SpeechEngine>, config: &TranslatorConfig) -> Self {
        Self::new(engine, config.speech_pitch, config.speech_rate)
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// 朗读文本
    ///
    /// 任何引擎错误都会重置朗读状态，并以 `SpeechError` 返回给界面提示用户。
    pub fn speak(&self, text: &str, language: &str) -> TranslationResult<()> {
        self.start(text, language).map_err(|e| {
            self.speaking.store(false, Ordering::SeqCst);
            tracing::error!("朗读失败: {}", e);
            match e {
                TranslationError::SpeechError(_) => e,
                other => helpers::speech_error(other),
            }
        })
    }

    /// 用记录的目标语言朗读历史记录中的译文
    pub fn speak_record(&self, record: &TranslationRecord) -> TranslationResult<()> {
        self.speak(record.translated_text(), record.target_language())
    }

    /// 停止当前朗读
    pub fn stop(&self) -> TranslationResult<()> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.speaking.store(false, Ordering::SeqCst);
        self.engine.stop()
    }

    fn start(&self, text: &str, language: &str) -> TranslationResult<()> {
        self.engine.stop()?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.speaking.store(true, Ordering::SeqCst);

        let voices = self.engine.available_voices()?;
        let voice = select_voice(&voices, language).map(|voice| voice.identifier.clone());
        tracing::debug!("朗读语言 {}，语音 {:?}", language, voice);

        let options = SpeechOptions {
            language: language.to_string(),
            voice,
            pitch: self.pitch,
            rate: self.rate,
        };

        let speaking = Arc::clone(&self.speaking);
        let current = Arc::clone(&self.generation);
        let on_event: SpeechCallback = Box::new(move |event| {
            if let SpeechEvent::Error(message) = &event {
                tracing::warn!("朗读中断: {}", message);
            }
            // 只有最新一次朗读的回调才能重置状态
            if current.load(Ordering::SeqCst) == generation {
                speaking.store(false, Ordering::SeqCst);
            }
        });

        self.engine.speak(text, &options, on_event)
    }
}

/// 调用 espeak-ng 兼容程序的语音引擎
pub struct CommandSpeechEngine {
    program: String,
    current: Arc<Mutex<Option<Child>>>,
}

impl CommandSpeechEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// 解析 `--voices` 输出
    ///
    /// 每行格式为 `Pty Language Age/Gender VoiceName File Other`，第一行是表头。
    pub fn parse_voices(output: &str) -> Vec<Voice> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let columns: Vec<&str> = line.split_whitespace().collect();
                if columns.len() < 4 {
                    return None;
                }
                Some(Voice {
                    identifier: columns[3].to_string(),
                    name: columns[3].replace('_', " "),
                    language: columns[1].to_string(),
                })
            })
            .collect()
    }

    fn lock_current(&self) -> TranslationResult<std::sync::MutexGuard<'_, Option<Child>>> {
        self.current
            .lock()
            .map_err(|_| helpers::speech_error("语音进程状态已失效"))
    }

    fn watch(current: Arc<Mutex<Option<Child>>>, pid: u32, on_event: SpeechCallback) {
        thread::spawn(move || {
            let event = loop {
                thread::sleep(Duration::from_millis(50));
                let Ok(mut guard) = current.lock() else {
                    break SpeechEvent::Error("语音进程状态已失效".to_string());
                };

                let finished = match guard.as_mut() {
                    Some(child) if child.id() == pid => match child.try_wait() {
                        Ok(Some(status)) if status.success() => Some(SpeechEvent::Done),
                        Ok(Some(status)) => {
                            Some(SpeechEvent::Error(format!("语音程序退出状态 {}", status)))
                        }
                        Ok(None) => None,
                        Err(e) => Some(SpeechEvent::Error(e.to_string())),
                    },
                    // 已被停止或被新的朗读取代
                    _ => break SpeechEvent::Done,
                };

                if let Some(event) = finished {
                    guard.take();
                    break event;
                }
            };
            on_event(event);
        });
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn stop(&self) -> TranslationResult<()> {
        let mut guard = self.lock_current()?;
        if let Some(mut child) = guard.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        Ok(())
    }

    fn available_voices(&self) -> TranslationResult<Vec<Voice>> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .output()
            .map_err(|e| helpers::speech_error(format!("无法运行 {}: {}", self.program, e)))?;

        Ok(Self::parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn speak(
        &self,
        text: &str,
        options: &SpeechOptions,
        on_event: SpeechCallback,
    ) -> TranslationResult<()> {
        // espeak-ng 的音调范围 0-99（默认 50），语速单位为每分钟词数（默认 175）
        let pitch = (options.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
        let rate = (options.rate * 175.0).round().max(80.0) as u32;
        let voice = options.voice.as_deref().unwrap_or(&options.language);

        let child = Command::new(&self.program)
            .arg("-v")
            .arg(voice)
            .arg("-p")
            .arg(pitch.to_string())
            .arg("-s")
            .arg(rate.to_string())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| helpers::speech_error(format!("无法启动 {}: {}", self.program, e)))?;

        let pid = child.id();
        {
            let mut guard = self.lock_current()?;
            if let Some(mut previous) = guard.replace(child) {
                let _ = previous.kill();
                let _ = previous.wait();
            }
        }

        Self::watch(Arc::clone(&self.current), pid, on_event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 记录调用顺序的测试引擎
    #[derive(Default)]
    struct ScriptedEngine {
        calls: Mutex<Vec<String>>,
        callbacks: Mutex<Vec<SpeechCallback>>,
        voices: Vec<Voice>,
        fail_voices: bool,
    }

    impl SpeechEngine for ScriptedEngine {
        fn stop(&self) -> TranslationResult<()> {
            self.calls.lock().unwrap().push("stop".to_string());
            Ok(())
        }

        fn available_voices(&self) -> TranslationResult<Vec<Voice>> {
            if self.fail_voices {
                return Err(TranslationError::InternalError("无语音".to_string()));
            }
            Ok(self.voices.clone())
        }

        fn speak(
            &self,
            text: &str,
            options: &SpeechOptions,
            on_event: SpeechCallback,
        ) -> TranslationResult<()> {
            self.calls.lock().unwrap().push(format!(
                "speak:{}:{}:{:?}",
                text, options.language, options.voice
            ));
            self.callbacks.lock().unwrap().push(on_event);
            Ok(())
        }
    }

    fn voice(identifier: &str, language: &str) -> Voice {
        Voice {
            identifier: identifier.to_string(),
            name: identifier.to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn test_select_voice_by_prefix() {
        let voices = vec![voice("en-1", "en-US"), voice("fr-1", "fr-FR"), voice("fr-2", "fr-CA")];
        assert_eq!(select_voice(&voices, "fr").unwrap().identifier, "fr-1");
        assert_eq!(select_voice(&voices, "en-GB").unwrap().identifier, "en-1");
        assert!(select_voice(&voices, "ja").is_none());
    }

    #[test]
    fn test_speak_stops_first_and_resets_on_done() {
        let engine = Arc::new(ScriptedEngine {
            voices: vec![voice("es-voice", "es-ES")],
            ..Default::default()
        });
        let speaker = Speaker::new(engine.clone(), 1.0, 0.9);

        speaker.speak("Hola", "es").unwrap();
        assert!(speaker.is_speaking());
        assert_eq!(
            *engine.calls.lock().unwrap(),
            vec!["stop".to_string(), "speak:Hola:es:Some(\"es-voice\")".to_string()]
        );

        let callback = engine.callbacks.lock().unwrap().pop().unwrap();
        callback(SpeechEvent::Done);
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn test_stale_callback_does_not_reset_new_utterance() {
        let engine = Arc::new(ScriptedEngine::default());
        let speaker = Speaker::new(engine.clone(), 1.0, 0.9);

        speaker.speak("uno", "es").unwrap();
        speaker.speak("dos", "es").unwrap();

        let first = engine.callbacks.lock().unwrap().remove(0);
        first(SpeechEvent::Error("interrupted".to_string()));
        assert!(speaker.is_speaking());
    }

    #[test]
    fn test_engine_error_surfaces_speech_error() {
        let engine = Arc::new(ScriptedEngine {
            fail_voices: true,
            ..Default::default()
        });
        let speaker = Speaker::new(engine, 1.0, 0.9);

        let err = speaker.speak("Hola", "es").unwrap_err();
        assert!(matches!(err, TranslationError::SpeechError(_)));
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn test_speak_record_uses_record_language() {
        let engine = Arc::new(ScriptedEngine {
            voices: vec![voice("de-voice", "de-DE"), voice("ja-voice", "ja-JP")],
            ..Default::default()
        });
        let speaker = Speaker::new(engine.clone(), 1.0, 0.9);
        let record = TranslationRecord::new("Thank you", "ありがとう", "ja").unwrap();

        speaker.speak_record(&record).unwrap();
        assert_eq!(
            engine.calls.lock().unwrap().last().unwrap(),
            "speak:ありがとう:ja:Some(\"ja-voice\")"
        );
    }

    #[test]
    fn test_parse_espeak_voices() {
        let output = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
 5  de              --/M      German             gmw/de\n \
 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)\n";
        let voices = CommandSpeechEngine::parse_voices(output);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].language, "de");
        assert_eq!(voices[1].identifier, "English_(America)");
        assert_eq!(voices[1].name, "English (America)");
    }
}
