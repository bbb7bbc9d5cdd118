//! Cravings Tools module
//!
//! Service operations behind the MCP tools.

pub mod ingredients;
pub mod inventory;
pub mod recipes;
pub mod status;
pub mod webhooks;
