pub mod error;
pub mod picker_api;
pub mod redis;
pub mod source_client;
