//! AI 清理适配器 - 把 OCR 文本交给 Groq 补全接口做语义层修复
//!
//! 失败永远不向上层抛：凭证缺失、网络错误、响应畸形都折叠成 None，
//! 调用方回退到原始 OCR 文本。内部保留 Result 方便测试和日志定位。

use log::warn;
use serde::Serialize;
use thiserror::Error;

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
pub const GROQ_KEY_ENV: &str = "GROQ_KEY";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that cleans and corrects Python code \
    extracted from OCR. Return only the corrected code without explanations or markdown \
    formatting.";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("missing API key: {0} environment variable is not set")]
    MissingApiKey(&'static str),
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected API response: {0}")]
    MalformedResponse(String),
}

/// 清理结果 + 限流遥测（响应头里有就带回）
#[derive(Debug, Clone, Serialize)]
pub struct CleanupOutcome {
    pub cleaned_code: String,
    pub requests_remaining: Option<i64>,
    pub reset_time: Option<String>,
}

pub struct CodeCleaner {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
}

impl CodeCleaner {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
        }
    }

    /// 从 GROQ_KEY 环境变量读取凭证，缺失不报错，调用时才暴露
    pub fn from_env() -> Self {
        Self::new(std::env::var(GROQ_KEY_ENV).ok().filter(|key| !key.is_empty()))
    }

    /// 同步调一次补全接口，低随机参数，不走流式
    pub fn clean(&self, ocr_text: &str) -> Result<CleanupOutcome, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AiError::MissingApiKey(GROQ_KEY_ENV))?;

        let response = self
            .client
            .post(GROQ_API_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "model": GROQ_MODEL,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": build_user_prompt(ocr_text)},
                ],
                "temperature": 0.1,
                "max_completion_tokens": 1024,
                "top_p": 0.9,
                "stream": false,
            }))
            .send()?;

        // 响应头先取走，json() 会消费掉 response
        let requests_remaining = header_value(&response, "x-ratelimit-remaining-requests")
            .and_then(|value| value.parse().ok());
        let reset_time = header_value(&response, "x-ratelimit-reset-requests");

        let body: serde_json::Value = response.json()?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AiError::MalformedResponse(body.to_string()))?;

        Ok(CleanupOutcome {
            cleaned_code: strip_code_fences(content),
            requests_remaining,
            reset_time,
        })
    }

    /// 跨层出口：任何失败记一条日志后折叠为 None
    pub fn clean_or_none(&self, ocr_text: &str) -> Option<CleanupOutcome> {
        match self.clean(ocr_text) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("AI cleanup unavailable, falling back to raw OCR text: {}", e);
                None
            }
        }
    }
}

fn header_value(response: &reqwest::blocking::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn build_user_prompt(ocr_text: &str) -> String {
    format!(
        "Clean up this OCR-extracted Python code and fix any syntax errors. \
         Please correct common OCR mistakes like:\n\
         - Missing colons after function/class definitions\n\
         - Incorrect method names (e.g., 'init__' should be '__init__')\n\
         - Variable names with spaces (e.g., 'full _ name' should be 'full_name')\n\
         - Missing indentation and line breaks\n\
         - Misrecognized characters\n\n\
         Return only the corrected Python code:\n\n\
         This is the extracted Python code:\n\"{}\"",
        ocr_text
    )
}

/// 模型偶尔还是会带代码围栏，掐头去尾
fn strip_code_fences(reply: &str) -> String {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // 围栏行可能带语言标签，整行丢弃
        text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_an_error_not_a_panic() {
        let cleaner = CodeCleaner::new(None);
        let result = cleaner.clean("def foo(): pass");
        assert!(matches!(result, Err(AiError::MissingApiKey(GROQ_KEY_ENV))));
    }

    #[test]
    fn test_missing_api_key_folds_to_none() {
        let cleaner = CodeCleaner::new(None);
        assert!(cleaner.clean_or_none("def foo(): pass").is_none());
    }

    #[test]
    fn test_user_prompt_embeds_ocr_text() {
        let prompt = build_user_prompt("def greet(name):");
        assert!(prompt.contains("def greet(name):"));
        assert!(prompt.contains("Missing colons"));
        assert!(prompt.contains("__init__"));
    }

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        assert_eq!(
            strip_code_fences("```python\ndef foo():\n    pass\n```"),
            "def foo():\n    pass"
        );
    }

    #[test]
    fn test_strip_code_fences_bare() {
        assert_eq!(strip_code_fences("```\nx = 1\n```"), "x = 1");
    }

    #[test]
    fn test_strip_code_fences_absent() {
        assert_eq!(strip_code_fences("  x = 1  "), "x = 1");
    }
}
