//! External dependency implementations (ports + adapters).

pub mod case_store;
pub mod clock;
pub mod ollama;
pub mod persistence;
pub mod ports;
pub mod resilient_llm;

pub use case_store::{CaseStore, CaseStoreError};
pub use clock::SystemClock;
pub use ollama::OllamaClient;
pub use persistence::SqliteGameRepo;
pub use resilient_llm::{ResilientLlmClient, RetryConfig};
