//! Raou Studio Library
//!
//! Content-editing core of the Raou travel site: the content document
//! model and its cache, image preparation for uploads, the editor's
//! draft engine, the HTTP client and the persistence service.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod content;
pub mod editor;
pub mod images;
pub mod store;
#[cfg(feature = "server")]
pub mod web;
