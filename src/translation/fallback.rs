//! 离线兜底翻译器
//!
//! 远程翻译失败时使用的确定性启发式翻译：先查常用短语表，未命中时按目标语言做
//! 简单的整词替换和前后缀改写。纯函数，不会失败。

use std::sync::OnceLock;

use regex::Regex;

/// 常用短语表，键大小写敏感
const PHRASES: &[(&str, &[(&str, &str)])] = &[
    (
        "Hello",
        &[
            ("es", "Hola"),
            ("fr", "Bonjour"),
            ("de", "Hallo"),
            ("it", "Ciao"),
            ("ja", "こんにちは"),
            ("ko", "안녕하세요"),
            ("zh", "你好"),
        ],
    ),
    (
        "How are you?",
        &[
            ("es", "¿Cómo estás?"),
            ("fr", "Comment ça va?"),
            ("de", "Wie geht es dir?"),
            ("it", "Come stai?"),
            ("ja", "お元気ですか？"),
            ("ko", "어떻게 지내세요?"),
            ("zh", "你好吗？"),
        ],
    ),
    (
        "Thank you",
        &[
            ("es", "Gracias"),
            ("fr", "Merci"),
            ("de", "Danke"),
            ("it", "Grazie"),
            ("ja", "ありがとう"),
            ("ko", "감사합니다"),
            ("zh", "谢谢"),
        ],
    ),
    (
        "Goodbye",
        &[
            ("es", "Adiós"),
            ("fr", "Au revoir"),
            ("de", "Auf Wiedersehen"),
            ("it", "Arrivederci"),
            ("ja", "さようなら"),
            ("ko", "안녕히 가세요"),
            ("zh", "再见"),
        ],
    ),
    (
        "Yes",
        &[
            ("es", "Sí"),
            ("fr", "Oui"),
            ("de", "Ja"),
            ("it", "Sì"),
            ("ja", "はい"),
            ("ko", "예"),
            ("zh", "是"),
        ],
    ),
    (
        "No",
        &[
            ("es", "No"),
            ("fr", "Non"),
            ("de", "Nein"),
            ("it", "No"),
            ("ja", "いいえ"),
            ("ko", "아니요"),
            ("zh", "不"),
        ],
    ),
];

/// 改写规则中会被替换的英文单词
#[derive(Debug, Clone, Copy)]
enum Word {
    The,
    Is,
    /// 只匹配独立的单词 "ing"，不改写 "running" 这类词尾
    Ing,
}

/// 单个目标语言的改写规则
struct RewriteRule {
    replacements: &'static [(Word, &'static str)],
    prefix: &'static str,
    suffix: &'static str,
}

fn rewrite_rule(target_lang: &str) -> Option<RewriteRule> {
    let rule = match target_lang {
        "es" => RewriteRule {
            replacements: &[(Word::Ing, "ando"), (Word::The, "el")],
            prefix: "¡",
            suffix: "!",
        },
        "fr" => RewriteRule {
            replacements: &[(Word::The, "le"), (Word::Is, "est")],
            prefix: "",
            suffix: " (en français)",
        },
        "de" => RewriteRule {
            replacements: &[(Word::The, "die"), (Word::Is, "ist")],
            prefix: "",
            suffix: " (auf Deutsch)",
        },
        "it" => RewriteRule {
            replacements: &[(Word::The, "il"), (Word::Is, "è")],
            prefix: "",
            suffix: " (in italiano)",
        },
        "ja" => RewriteRule {
            replacements: &[],
            prefix: "",
            suffix: "です",
        },
        "ko" => RewriteRule {
            replacements: &[],
            prefix: "",
            suffix: "입니다",
        },
        "zh" => RewriteRule {
            replacements: &[],
            prefix: "",
            suffix: "是",
        },
        _ => return None,
    };
    Some(rule)
}

/// 正则表达式缓存
#[derive(Default)]
struct RegexCache {
    the_regex: OnceLock<Regex>,
    is_regex: OnceLock<Regex>,
    ing_regex: OnceLock<Regex>,
}

/// 启发式兜底翻译器
#[derive(Default)]
pub struct FallbackTranslator {
    regex_cache: RegexCache,
}

impl FallbackTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 翻译文本
    ///
    /// 空输入返回空字符串；不认识的语言代码原样返回输入。
    pub fn translate(&self, text: &str, target_lang: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        if let Some(phrase) = lookup_phrase(text, target_lang) {
            return phrase.to_string();
        }

        let Some(rule) = rewrite_rule(target_lang) else {
            return text.to_string();
        };

        let mut rewritten = text.to_string();
        for (word, replacement) in rule.replacements {
            rewritten = self
                .word_regex(*word)
                .replace_all(&rewritten, *replacement)
                .into_owned();
        }

        format!("{}{}{}", rule.prefix, rewritten, rule.suffix)
    }

    /// 整词匹配，忽略大小写，不会命中更长单词内部的子串
    fn word_regex(&self, word: Word) -> &Regex {
        let (cell, pattern) = match word {
            Word::The => (&self.regex_cache.the_regex, r"(?i)\bthe\b"),
            Word::Is => (&self.regex_cache.is_regex, r"(?i)\bis\b"),
            Word::Ing => (&self.regex_cache.ing_regex, r"(?i)\bing\b"),
        };
        cell.get_or_init(|| Regex::new(pattern).expect("内置正则表达式必须有效"))
    }
}

/// 精确短语查找
pub fn lookup_phrase(text: &str, target_lang: &str) -> Option<&'static str> {
    PHRASES
        .iter()
        .find(|(source, _)| *source == text)
        .and_then(|(_, translations)| {
            translations
                .iter()
                .find(|(lang, _)| *lang == target_lang)
                .map(|(_, translated)| *translated)
        })
}

/// 使用共享的兜底翻译器翻译
pub fn fallback_translate(text: &str, target_lang: &str) -> String {
    static TRANSLATOR: OnceLock<FallbackTranslator> = OnceLock::new();
    TRANSLATOR
        .get_or_init(FallbackTranslator::new)
        .translate(text, target_lang)
}
