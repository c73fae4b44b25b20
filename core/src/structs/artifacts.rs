use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PrefetchOptions {
    /**Parse Prefetch files in an alternative directory instead of `%SystemDrive%\Windows\Prefetch` */
    pub alt_dir: Option<String>,
    /**Volume serial number (hex) to drive letter. Used to rewrite `\VOLUME{...}` paths */
    #[serde(default)]
    pub drives: HashMap<String, String>,
}
