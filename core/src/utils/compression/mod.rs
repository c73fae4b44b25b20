pub(crate) mod decoder;
pub(crate) mod error;
pub(crate) mod xpress;
