use url::Url;

use super::{
    config::Config,
    SOFTWARE_NAME,
    SOFTWARE_VERSION,
};

/// Parses instance URL, adding `https` scheme if it is missing
pub fn parse_instance_url(value: &str) -> Result<Url, &'static str> {
    let value = if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!("https://{value}")
    };
    let url = Url::parse(&value).map_err(|_| "invalid URL")?;
    if url.host_str().is_none() {
        return Err("URL must contain a host");
    };
    if url.path() != "/" || url.query().is_some() {
        return Err("URL must not contain a path");
    };
    Ok(url)
}

#[derive(Clone, Debug)]
pub struct Instance {
    _url: Url,
    pub federation_enabled: bool,
    pub fetcher_timeout: u64,
    pub fetcher_response_size_limit: usize,
    pub deliverer_timeout: u64,
    pub deliverer_retries: u32,
    pub require_signatures: bool,
    pub collection_page_size: u16,
    pub object_cache_ttl: u32,
    pub object_cache_size: usize,
    pub search_domain_enabled: bool,
    pub search_domain_name: String,
}

impl Instance {
    pub(crate) fn from_config(config: &Config) -> Result<Self, &'static str> {
        let instance = Self {
            _url: parse_instance_url(&config.instance_url)?,
            federation_enabled: config.federation.enabled,
            fetcher_timeout: config.federation.fetcher_timeout,
            fetcher_response_size_limit: config.federation.fetcher_response_size_limit,
            deliverer_timeout: config.federation.deliverer_timeout,
            deliverer_retries: config.federation.deliverer_retries,
            require_signatures: config.federation.require_signatures,
            collection_page_size: config.federation.collection_page_size,
            object_cache_ttl: config.federation.object_cache_ttl,
            object_cache_size: config.federation.object_cache_size,
            search_domain_enabled: config.search_domain.enabled,
            search_domain_name: config.search_domain.name.clone(),
        };
        Ok(instance)
    }

    /// Returns instance URL without trailing slash
    pub fn url(&self) -> String {
        self._url.as_str().trim_end_matches('/').to_string()
    }

    /// Returns instance host name (without port number)
    pub fn hostname(&self) -> String {
        self._url.host_str()
            .unwrap_or_default()
            .to_string()
    }

    pub fn agent(&self) -> String {
        format!(
            "{name} {version}; {instance_url}",
            name=SOFTWARE_NAME,
            version=SOFTWARE_VERSION,
            instance_url=self.url(),
        )
    }
}
