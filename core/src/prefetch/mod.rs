pub mod error;
pub mod filemetrics;
mod filenames;
pub mod header;
pub mod parser;
pub mod pf;
pub mod record;
pub mod resolve;
#[cfg(test)]
pub(crate) mod testing;
pub mod versions;
pub mod volume;
