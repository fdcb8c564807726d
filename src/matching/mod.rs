// src/matching/mod.rs
pub mod disambiguator;
pub mod embedding;
pub mod extractor;
pub mod fuzzy;
pub mod pipeline;
pub mod tables;
pub mod variants;
