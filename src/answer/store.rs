use crate::llm::types::AnswerReply;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use uuid::Uuid;

/// One answered (or defaulted) question, as handed to storage.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub provider_used: Option<String>,
    pub model_used: Option<String>,
    pub success: bool,
    pub failure_count: usize,
    pub created_at: DateTime<Utc>,
}

impl AnswerRecord {
    pub fn new(question: &str, reply: &AnswerReply) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.to_string(),
            answer: reply.text.clone(),
            provider_used: reply.provider_used.clone(),
            model_used: reply.model_used.clone(),
            success: reply.success,
            failure_count: reply.failures.len(),
            created_at: Utc::now(),
        }
    }
}

/// Where answered questions go. Failures are the caller's to log; they never
/// reach the person asking.
pub trait AnswerStore: Send + Sync {
    fn name(&self) -> &str;

    fn record<'a>(
        &'a self,
        record: &'a AnswerRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
}

/// In-process store for the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryAnswerStore {
    records: Mutex<Vec<AnswerRecord>>,
}

impl MemoryAnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AnswerRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnswerStore for MemoryAnswerStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn record<'a>(
        &'a self,
        record: &'a AnswerRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.records
                .lock()
                .map_err(|_| anyhow::anyhow!("answer store lock poisoned"))?
                .push(record.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_keeps_records_in_order() {
        let store = MemoryAnswerStore::new();
        let ok = AnswerReply {
            text: "Yes.".into(),
            provider_used: Some("gemini".into()),
            model_used: Some("gemini-2.5-pro".into()),
            success: true,
            failures: vec![],
        };
        store.record(&AnswerRecord::new("first?", &ok)).await.unwrap();
        store
            .record(&AnswerRecord::new("second?", &AnswerReply::safe_default(vec![])))
            .await
            .unwrap();

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question, "first?");
        assert!(records[0].success);
        assert!(!records[1].success);
        assert_ne!(records[0].id, records[1].id);
    }
}
