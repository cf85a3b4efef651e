//! Caller-facing entry point: one question in, one answer out, always.

use super::store::{AnswerRecord, AnswerStore};
use crate::config::Config;
use crate::error::RelayError;
use crate::llm::factory;
use crate::llm::handshake::HandshakeCoordinator;
use crate::llm::prompt::{PromptSettings, build_request};
use crate::llm::registry::ProviderRegistry;
use crate::llm::sequencer::FallbackSequencer;
use crate::llm::types::{AnswerReply, FormatHint, HistoryMessage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct AnswerService {
    sequencer: FallbackSequencer,
    handshake: Option<Arc<HandshakeCoordinator>>,
    store: Option<Arc<dyn AnswerStore>>,
    prompt: PromptSettings,
    refresh_before_answer: bool,
    refreshing: Arc<AtomicBool>,
}

impl AnswerService {
    pub fn new(sequencer: FallbackSequencer, prompt: PromptSettings) -> Self {
        Self {
            sequencer,
            handshake: None,
            store: None,
            prompt,
            refresh_before_answer: false,
            refreshing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Full pipeline from config: registry, status cache, handshake, sequencer.
    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        let registry = Arc::new(factory::build_registry(&config.providers)?);
        let cache = Arc::new(factory::status_cache(&config.health));
        let handshake = Arc::new(HandshakeCoordinator::new(
            Arc::clone(&registry),
            Arc::clone(&cache),
            factory::health_probe(&config.health),
        ));
        let sequencer = factory::create_sequencer(config, registry, cache);

        Ok(Self::new(sequencer, factory::prompt_settings(&config.prompt))
            .with_handshake(handshake, config.health.refresh_before_answer))
    }

    /// Attach a handshake coordinator. With `refresh_before_answer` an answer
    /// that finds the snapshot expired starts a background refresh; the
    /// answer itself uses whatever order is cached.
    #[must_use]
    pub fn with_handshake(mut self, handshake: Arc<HandshakeCoordinator>, refresh_before_answer: bool) -> Self {
        self.handshake = Some(handshake);
        self.refresh_before_answer = refresh_before_answer;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn AnswerStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn handshake(&self) -> Option<&Arc<HandshakeCoordinator>> {
        self.handshake.as_ref()
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.sequencer.registry()
    }

    /// Answer `question`. Never fails: total provider failure yields the
    /// safe default with `success == false`.
    pub async fn answer(
        &self,
        question: &str,
        context: Option<&str>,
        history: &[HistoryMessage],
        format_hint: FormatHint,
    ) -> AnswerReply {
        if question.trim().is_empty() {
            tracing::warn!("empty question; returning safe default");
            return AnswerReply::safe_default(Vec::new());
        }

        if self.refresh_before_answer
            && let Some(handshake) = &self.handshake
        {
            self.spawn_refresh(handshake);
        }

        let request = build_request(&self.prompt, question, context, history, format_hint);
        let reply = self.sequencer.answer(&request).await;

        if let Some(store) = &self.store {
            let record = AnswerRecord::new(question, &reply);
            if let Err(e) = store.record(&record).await {
                tracing::warn!(store = store.name(), id = %record.id, "Failed to record answer: {e:#}");
            }
        }
        reply
    }

    /// At most one background refresh runs at a time.
    fn spawn_refresh(&self, handshake: &Arc<HandshakeCoordinator>) {
        if handshake.cache().is_valid() || self.refreshing.swap(true, Ordering::AcqRel) {
            return;
        }
        let handshake = Arc::clone(handshake);
        let refreshing = Arc::clone(&self.refreshing);
        tokio::spawn(async move {
            handshake.refresh().await;
            refreshing.store(false, Ordering::Release);
        });
    }
}
