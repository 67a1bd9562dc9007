pub mod config;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod naming;
pub mod runner;
