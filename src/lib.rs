// src/lib.rs
pub mod config;
pub mod embedder;
pub mod loader;
pub mod matching;
pub mod models;
pub mod preprocessing;
pub mod similar;
pub mod utils;
