pub(crate) mod error;
pub(crate) mod formats;
pub(crate) mod local;
