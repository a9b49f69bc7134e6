//! Revokes every active session of a data-warehouse user by disabling and
//! re-enabling the account through the warehouse SQL API.

pub mod app;
pub mod constants;
pub mod errors;
pub mod host;
pub mod managers;
pub mod services;
pub mod utils;
