//! Command implementations for the ecopack CLI

pub mod bundle;
pub mod completions;
pub mod helpers;
pub mod manager;
pub mod notify;
pub mod registry;
pub mod release;
pub mod upload;
pub mod validate;
pub mod version;
