//! Cravings Library
//!
//! Ingredient and recipe nutrition with unit conversion and inventory tracking.

pub mod build_info;
pub mod config;
pub mod db;
pub mod edamam;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
