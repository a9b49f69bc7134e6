mod action_error;

pub use action_error::{ActionError, ActionErrorKind};
