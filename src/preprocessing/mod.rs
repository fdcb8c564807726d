// src/preprocessing/mod.rs
pub mod text_cleaner;
pub mod user_processor;
