//! Chat-style question answering over stored graphs.

pub mod chat;
pub mod error;
pub mod summary;
pub mod terms;

pub use chat::{ChatResponse, ChatService, NO_RESULTS_ANSWER, answer_prompt};
pub use error::{QueryError, Result};
pub use summary::{GraphStats, GraphSummary, suggest_questions, summarize};
pub use terms::{MAX_MERGED, extract_key_terms, merge_unique};
