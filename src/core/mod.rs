//! Platform-independent core: data model, provider capability, locator,
//! signing gateway and the session controller.

pub mod config;
pub mod error;
pub mod gateway;
pub mod locator;
pub mod paths;
pub mod provider;
pub mod session;
pub mod types;
