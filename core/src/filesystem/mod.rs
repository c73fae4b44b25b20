pub(crate) mod error;
pub(crate) mod files;
pub(crate) mod metadata;
