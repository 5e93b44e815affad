pub mod chat;
pub mod cli;
pub mod commands;
pub mod console;
pub mod llm;
pub mod models;
pub mod planner;
pub mod quotes;
pub mod review;
pub mod session;
pub mod storage;
pub mod types;
pub mod utils;
