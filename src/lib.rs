// src/lib.rs

//! feedscan library
//!
//! A tick-driven automation agent for infinite-scroll feeds: scrolls,
//! validates progress, extracts records from item elements, and keeps
//! the ones above a selectable popularity threshold.

pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod invoker;
pub mod locale;
pub mod models;
pub mod page;
pub mod probe;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;
pub mod watcher;
