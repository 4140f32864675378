//! Infrastructure layer - Storage backends, key services and process plumbing

pub mod api_key;
pub mod gate;
pub mod logging;
pub mod storage;
