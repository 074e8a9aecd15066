//! Prospect API Library
//!
//! This library provides the core functionality for the prospect API relay:
//! a single JSON dispatch entry point routing to operations that paginate
//! the Apollo sales-intelligence API (organization search, people search,
//! contact enrichment) and aggregate the results.
//!
//! # Modules
//!
//! - `apollo`: Apollo API client and sequential pagination engine.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and dispatch routing.
//! - `models`: Request and response models.

pub mod apollo;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
