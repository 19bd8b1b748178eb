use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::application::errors::{BotError, WebhookError};
use crate::application::messaging::{Gatekeeper, MessageDispatcher, MessageParser};
use crate::domain::entities::{InboundEvent, WebhookPayload};
use crate::domain::traits::Bot;
use super::ReplyService;

/// What happened to one inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not a text message
    Ignored,
    /// Text was not addressed to the bot, or produced nothing
    Silent,
    /// A reply was delivered
    Replied,
}

/// Service for processing inbound events: gate, normalize, route, produce, deliver
pub struct MessageService<B: Bot> {
    bot: B,
    gatekeeper: Gatekeeper,
    parser: MessageParser,
    dispatcher: MessageDispatcher,
    replies: ReplyService,
}

impl<B: Bot + 'static> MessageService<B> {
    pub fn new(bot: B, gatekeeper: Gatekeeper, replies: ReplyService) -> Self {
        let parser = MessageParser::new(gatekeeper.marker());
        Self {
            bot,
            gatekeeper,
            parser,
            dispatcher: MessageDispatcher::new(),
            replies,
        }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    /// Compute the reply for raw user text, `None` for silence
    pub async fn respond(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if !self.gatekeeper.is_eligible(text) {
            tracing::debug!("Ignoring unaddressed text");
            return None;
        }

        let command = self.parser.normalize(text)?;
        let route = self.dispatcher.route(&command);
        tracing::info!(route = route.name(), "Routing command: {}", command);

        self.replies.produce(&route).await
    }

    /// Process one event and deliver its reply, if any. Delivery is not retried.
    pub async fn handle_event(&self, event: &InboundEvent) -> Result<EventOutcome, BotError> {
        let Some((reply_token, text)) = event.text_message() else {
            tracing::debug!("Ignoring {} event", event.event_type);
            return Ok(EventOutcome::Ignored);
        };

        let Some(reply) = self.respond(text).await else {
            return Ok(EventOutcome::Silent);
        };

        if reply.is_empty() {
            return Ok(EventOutcome::Silent);
        }

        if let Err(e) = self.bot.reply(reply_token, &reply).await {
            tracing::error!("Failed to deliver reply: {}", e);
            return Err(e);
        }
        Ok(EventOutcome::Replied)
    }

    /// Process every event of a webhook call as its own task. All tasks run to
    /// completion; the call fails if any one of them failed or panicked.
    pub async fn handle_payload(
        service: Arc<Self>,
        payload: WebhookPayload,
    ) -> Result<Vec<EventOutcome>, WebhookError> {
        let total = payload.events.len();
        let mut tasks = JoinSet::new();

        for (index, event) in payload.events.into_iter().enumerate() {
            let service = Arc::clone(&service);
            let span = tracing::info_span!(
                "event",
                index,
                source = %event.source.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            );
            tasks.spawn(
                async move { (index, service.handle_event(&event).await) }.instrument(span),
            );
        }

        let mut outcomes = vec![EventOutcome::Ignored; total];
        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(outcome))) => outcomes[index] = outcome,
                Ok((index, Err(e))) => {
                    tracing::error!("Event {} failed: {}", index, e);
                    failed += 1;
                }
                Err(e) => {
                    tracing::error!("Event task panicked: {}", e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(WebhookError::EventsFailed { failed, total });
        }
        Ok(outcomes)
    }
}
