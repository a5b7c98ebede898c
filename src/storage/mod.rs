// src/storage/mod.rs

//! Preference persistence.

pub mod prefs;

pub use prefs::{JsonFileStore, MemoryStore, PrefStore};
