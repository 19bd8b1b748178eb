//! LLM Configuration

use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_PERSONA: &str = "你是 TCZC（Zinger 車隊）LINE 群組裡的小幫手，個性熱情、說話簡短，\
請一律使用繁體中文回答，不確定的車輛或保固資訊請建議車友洽詢原廠。車友的問題是：";

/// LLM Configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LLMConfig {
    /// Gemini API key; without it the fallback branch stays silent
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,

    /// Instruction preamble placed in front of the user's command
    pub persona: String,

    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl LLMConfig {
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.model = model;
        }

        if let Ok(persona) = std::env::var("LLM_PERSONA") {
            self.persona = persona;
        }

        if let Ok(temp) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = temp.parse() {
                self.temperature = Some(t);
            }
        }
    }

    /// API key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Prompt sent for a fallback command: persona preamble, then the command verbatim
    pub fn prompt_for(&self, command: &str) -> String {
        format!("{}{}", self.persona, command)
    }
}
