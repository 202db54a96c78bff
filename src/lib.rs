pub mod acquire;
pub mod cli;
pub mod config;
pub mod consolidate;
pub mod decompress;
pub mod fiscal;
pub mod jobs;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod service;
pub mod util;
