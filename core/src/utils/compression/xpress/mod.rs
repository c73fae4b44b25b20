#[cfg(target_os = "windows")]
pub(crate) mod api;
pub(crate) mod huffman;
