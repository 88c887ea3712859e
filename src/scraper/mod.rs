//! # Scraper Module
//!
//! The engine-facing side of the spider middleware manager.
//!
//! ## Overview
//!
//! The scraper receives download outcomes from the engine, runs each of them
//! through the spider middleware manager with the spider's callback, and
//! passes the resulting items and requests back. Failures that no exception
//! hook handled end up in the scraper's failure path, where they are logged
//! and counted.
//!
//! ## Internal Components
//!
//! - `spawn_scraper_task`: starts the worker pool that drives scrapes
//! - `Downloaded`: a request paired with its download outcome

mod response_parser;

pub use response_parser::{Downloaded, spawn_scraper_task};
