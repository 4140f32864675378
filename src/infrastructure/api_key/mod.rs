//! API Key infrastructure implementations
//!
//! Token generation, the persisted key store, the validation simulator,
//! text export and the service tying them together.

mod export;
mod generator;
mod service;
mod simulator;
mod store;

pub use export::{export_file_name, export_text, format_date, write_export, EXPORT_FILE_PREFIX};
pub use generator::TokenGenerator;
pub use service::KeyService;
pub use simulator::{ValidationResult, ValidationSimulator, DEFAULT_LATENCY};
pub use store::{KeyStore, WipeConfirmation, DEFAULT_NAMESPACE};
