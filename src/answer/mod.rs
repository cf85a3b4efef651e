pub mod service;
pub mod store;

pub use service::AnswerService;
pub use store::{AnswerRecord, AnswerStore, MemoryAnswerStore};
