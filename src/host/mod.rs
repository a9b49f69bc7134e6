//! Line-delimited JSON adapter that lets a host drive the action over stdio.

pub mod protocol;
pub mod server;
