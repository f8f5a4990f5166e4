// Public API for integration tests and potential library usage

pub mod error;
pub mod machine;
pub mod protocol;
pub mod roles;
pub mod service;
pub mod store;
pub mod types;
pub mod words;
pub mod ws;
