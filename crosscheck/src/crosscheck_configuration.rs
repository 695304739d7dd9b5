use crate::{
    catalog::Catalog,
    error::Error,
    payload::{DEFAULT_UNIQUE_DOMAIN, DEFAULT_UNIQUE_FIELD},
    variant::{ResolutionPolicy, VariantSet},
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "CROSSCHECK_CONFIG";
pub const BASE_URLS_ENV: &str = "CROSSCHECK_BASE_URLS";

lazy_static! {
    static ref BASE_URL_REGEX: Regex = Regex::new(r"^https?://[^\s/?#]+(/\S*)?$").unwrap();
}

const DEFAULT_BASE_URLS: [&str; 3] = [
    "https://deployment.api-csharp.boilerplate.hng.tech/api/v1",
    "https://deployment.api-golang.boilerplate.hng.tech/api/v1",
    "https://deployment.api-php.boilerplate.hng.tech/api/v1",
];

fn default_base_urls() -> Vec<String> {
    DEFAULT_BASE_URLS.iter().map(|url| String::from(*url)).collect()
}

// endpoint paths start with `/`, so a trailing slash here would double it
fn normalize_base_urls<I, S>(base_urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    base_urls
        .into_iter()
        .map(|url| {
            let url = url.into();
            url.trim_end_matches('/').to_string()
        })
        .collect()
}

fn default_unique_field() -> String {
    DEFAULT_UNIQUE_FIELD.into()
}

fn default_unique_domain() -> String {
    DEFAULT_UNIQUE_DOMAIN.into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrosscheckConfiguration {
    #[serde(default = "default_base_urls")]
    base_urls: Vec<String>,
    #[serde(default)]
    variants: VariantSet,
    #[serde(default)]
    resolution: ResolutionPolicy,
    #[serde(default = "default_unique_field")]
    unique_field: String,
    #[serde(default = "default_unique_domain")]
    unique_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(default = "Catalog::builtin")]
    endpoints: Catalog,
}

impl CrosscheckConfiguration {
    pub fn new<I, S>(base_urls: I, variants: VariantSet, endpoints: Catalog) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_urls: normalize_base_urls(base_urls),
            variants,
            resolution: ResolutionPolicy::default(),
            unique_field: default_unique_field(),
            unique_domain: default_unique_domain(),
            timeout_secs: None,
            endpoints,
        }
    }

    pub fn builtin() -> Self {
        Self::new(default_base_urls(), VariantSet::default(), Catalog::builtin())
    }

    /// Parses without validating, so overrides can still be applied before [`Self::validate`].
    pub fn parse_toml(contents: &str) -> Result<Self, Error> {
        let mut configuration: Self = toml::from_str(contents)?;
        configuration.base_urls = normalize_base_urls(configuration.base_urls);

        Ok(configuration)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let configuration = Self::parse_toml(contents)?;
        configuration.validate()?;

        Ok(configuration)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        debug!(path = %path.as_ref().display(), "loading configuration");
        Self::parse_toml(&fs::read_to_string(path)?)
    }

    pub fn load_or_builtin<P: AsRef<Path>>(path: Option<P>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn apply_env_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(value) = lookup(BASE_URLS_ENV) {
            let base_urls: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(String::from)
                .collect();

            if !base_urls.is_empty() {
                self.base_urls = normalize_base_urls(base_urls);
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.base_urls.is_empty() {
            return Err(Error::InvalidConfiguration(
                "at least one base URL has to be configured".into(),
            ));
        }

        if let Some(url) = self
            .base_urls
            .iter()
            .find(|url| !BASE_URL_REGEX.is_match(url))
        {
            return Err(Error::InvalidBaseUrl(url.clone()));
        }

        if self.unique_field.is_empty() {
            return Err(Error::InvalidConfiguration(
                "unique_field should not be empty".into(),
            ));
        }

        self.endpoints.validate(&self.variants, self.resolution)
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn base_urls(&self) -> &[String] {
        &self.base_urls
    }

    pub fn set_base_urls<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, base_urls: I) {
        self.base_urls = normalize_base_urls(base_urls);
    }

    pub fn variants(&self) -> &VariantSet {
        &self.variants
    }

    pub fn resolution(&self) -> ResolutionPolicy {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: ResolutionPolicy) {
        self.resolution = resolution;
    }

    pub fn unique_field(&self) -> &str {
        &self.unique_field
    }

    pub fn set_unique_field<S: Into<String>>(&mut self, field: S) {
        self.unique_field = field.into();
    }

    pub fn unique_domain(&self) -> &str {
        &self.unique_domain
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout_secs = timeout.map(|timeout| timeout.as_secs());
    }

    pub fn catalog(&self) -> &Catalog {
        &self.endpoints
    }
}

impl Default for CrosscheckConfiguration {
    fn default() -> Self {
        Self::builtin()
    }
}
