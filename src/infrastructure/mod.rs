//! Infrastructure layer - Storage, credential services and logging

pub mod api_key;
pub mod logging;
pub mod storage;
pub mod user;
