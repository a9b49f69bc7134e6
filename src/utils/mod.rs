pub mod duration;
pub mod redact;
pub mod sql;
pub mod text;
pub mod token_type;
