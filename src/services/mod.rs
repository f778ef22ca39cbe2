//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own file access and validation so route handlers stay
//! focused on extracting requests and mapping errors to status codes.

pub mod pack;
pub mod store;
