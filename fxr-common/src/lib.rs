//! # FXR Common Library
//!
//! Shared code for the recipe harvester and the recipe analyst:
//! - Recipe record model
//! - Field normalization for free-text setting values
//! - Database initialization and recipe persistence
//! - Configuration loading and root folder resolution

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod normalize;

pub use error::{Error, Result};
pub use models::{RecipeRecord, StepField, StepValue};
pub use normalize::normalize;
