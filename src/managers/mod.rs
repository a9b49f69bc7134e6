pub mod revoke;
pub mod statement;
