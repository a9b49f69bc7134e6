pub mod action;
pub mod auth;
pub mod context;
pub mod logger;
pub mod validation;
