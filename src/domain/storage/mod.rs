//! Storage domain - durable key-value abstraction

mod repository;

pub use repository::KeyValueStorage;

#[cfg(test)]
pub use repository::MockKeyValueStorage;
