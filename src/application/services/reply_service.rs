//! Reply producers - Static answers, weather proxy, generative fallback
//!
//! Producers never fail outward: upstream errors are logged and replaced
//! with a fixed apology. `None` means the event gets no reply at all.

use std::sync::Arc;

use crate::domain::entities::{Command, Route};
use crate::domain::traits::{is_unknown_location, WeatherSource};
use crate::infrastructure::llm::{LLMConfig, LLMMessage, LLM};

pub const RALLY_REPLY: &str = "🚗 TCZC 全國大會師資訊：\n日期：2026年3月14日\n地點：台中中科大運河停車場\n期待您的參加！";

pub const WARRANTY_REPLY: &str = "關於 Zinger 1.5T 保固：\n請參考中華汽車官網，或洽詢原廠技師。";

pub const STICKERS_REPLY: &str = "想要購買車隊貼紙嗎？\n請直接私訊版主或管理員喔！";

pub const WEATHER_USAGE: &str = "想查天氣嗎？請輸入像是「#台中天氣」喔！(記得加 # 號)";

pub const WEATHER_UNAVAILABLE: &str = "⚠️ 天氣服務暫時無法使用，請稍後再試。";

pub const LLM_OVERLOADED: &str = "🤯 AI 大腦暫時過載中，請稍後再問一次！";

pub fn weather_not_found(location: &str) -> String {
    format!("找不到【{}】這個地點，請確認地名後再試一次喔！", location)
}

pub fn weather_report(location: &str, body: &str) -> String {
    format!("🌤️ 【{}】天氣報告：\n{}", location, body.trim())
}

/// Fixed answer for the static routes, `None` for the rest
pub fn static_reply(route: &Route) -> Option<&'static str> {
    match route {
        Route::Rally => Some(RALLY_REPLY),
        Route::Warranty => Some(WARRANTY_REPLY),
        Route::Stickers => Some(STICKERS_REPLY),
        Route::Weather { .. } | Route::Fallback { .. } => None,
    }
}

/// Runs the producer selected by a route. Client handles are shared, read-only.
pub struct ReplyService {
    weather: Arc<dyn WeatherSource>,
    llm: Option<Arc<dyn LLM>>,
    llm_config: LLMConfig,
}

impl ReplyService {
    pub fn new(weather: Arc<dyn WeatherSource>, llm: Option<Arc<dyn LLM>>, llm_config: LLMConfig) -> Self {
        Self {
            weather,
            llm,
            llm_config,
        }
    }

    pub async fn produce(&self, route: &Route) -> Option<String> {
        match route {
            Route::Weather { location } => self.weather_reply(location).await,
            Route::Fallback { command } => self.generative_reply(command).await,
            other => static_reply(other).map(str::to_string),
        }
    }

    async fn weather_reply(&self, location: &str) -> Option<String> {
        if location.is_empty() {
            return Some(WEATHER_USAGE.to_string());
        }

        match self.weather.fetch(location).await {
            Ok(body) if is_unknown_location(&body) => {
                tracing::info!("Weather location not resolved: {}", location);
                Some(weather_not_found(location))
            }
            Ok(body) => Some(weather_report(location, &body)),
            Err(e) => {
                tracing::warn!("Weather lookup for {} failed: {}", location, e);
                Some(WEATHER_UNAVAILABLE.to_string())
            }
        }
    }

    async fn generative_reply(&self, command: &Command) -> Option<String> {
        let Some(llm) = &self.llm else {
            tracing::debug!("No LLM configured, staying silent for: {}", command);
            return None;
        };

        let prompt = self.llm_config.prompt_for(command.as_str());
        let result = llm
            .chat(
                vec![LLMMessage::user(prompt)],
                None,
                self.llm_config.temperature,
                self.llm_config.max_tokens,
            )
            .await;

        match result {
            Ok(response) => {
                tracing::debug!("{} answered with model {}", llm.name(), response.model);
                Some(response.content)
            }
            Err(e) => {
                tracing::warn!("{} request failed: {}", llm.name(), e);
                Some(LLM_OVERLOADED.to_string())
            }
        }
    }
}
