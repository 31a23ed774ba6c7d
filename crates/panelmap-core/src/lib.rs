//! PanelMap Core - Domain models, identifier handling, and configuration
//!
//! This crate contains the site data model, the identifier normalizer, the
//! cable-length parser, label classification, and the port definitions used by
//! the loader and the daily log.

pub mod classify;
pub mod config;
pub mod error;
pub mod lengths;
pub mod models;
pub mod normalize;
pub mod ports;

pub use error::{Error, Result};
