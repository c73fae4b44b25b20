pub(crate) mod collector;
pub(crate) mod compression;
pub(crate) mod environment;
pub(crate) mod error;
pub(crate) mod logging;
pub(crate) mod nom_helper;
pub(crate) mod strings;
pub(crate) mod time;
