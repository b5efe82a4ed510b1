use serde::Deserialize;

const fn default_federation_enabled() -> bool { true }
const fn default_fetcher_timeout() -> u64 { 30 }
const fn default_deliverer_timeout() -> u64 { 30 }
const fn default_deliverer_retries() -> u32 { 3 }
const fn default_require_signatures() -> bool { true }
const fn default_collection_page_size() -> u16 { 60 }
const fn default_response_size_limit() -> usize { 2_000_000 }
const fn default_object_cache_ttl() -> u32 { 3600 * 24 }
const fn default_object_cache_size() -> usize { 10_000 }

#[derive(Clone, Debug, Deserialize)]
pub struct FederationConfig {
    #[serde(default = "default_federation_enabled")]
    pub enabled: bool,

    #[serde(default = "default_fetcher_timeout")]
    pub fetcher_timeout: u64,
    // Maximum size of a fetched document, in bytes
    #[serde(default = "default_response_size_limit")]
    pub fetcher_response_size_limit: usize,
    #[serde(default = "default_deliverer_timeout")]
    pub deliverer_timeout: u64,
    // Number of re-queue attempts for failed deliveries
    #[serde(default = "default_deliverer_retries")]
    pub deliverer_retries: u32,

    #[serde(default = "default_require_signatures")]
    pub require_signatures: bool,

    #[serde(default = "default_collection_page_size")]
    pub collection_page_size: u16,

    // Dereferenced documents expire after this number of seconds
    #[serde(default = "default_object_cache_ttl")]
    pub object_cache_ttl: u32,
    #[serde(default = "default_object_cache_size")]
    pub object_cache_size: usize,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            enabled: default_federation_enabled(),
            fetcher_timeout: default_fetcher_timeout(),
            fetcher_response_size_limit: default_response_size_limit(),
            deliverer_timeout: default_deliverer_timeout(),
            deliverer_retries: default_deliverer_retries(),
            require_signatures: default_require_signatures(),
            collection_page_size: default_collection_page_size(),
            object_cache_ttl: default_object_cache_ttl(),
            object_cache_size: default_object_cache_size(),
        }
    }
}
