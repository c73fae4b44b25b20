use super::artifacts::PrefetchOptions;
use serde::Deserialize;

/// Collector file driving a prefetch collection
#[derive(Debug, Deserialize)]
pub struct PrefetchToml {
    pub output: Output,
    #[serde(default)]
    pub prefetch: PrefetchOptions,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Output {
    pub name: String,
    pub directory: String,
    /**json, jsonl, or sqlite */
    pub format: String,
    /**error, warn, info, or debug. Default is warn */
    pub logging: Option<String>,
}
