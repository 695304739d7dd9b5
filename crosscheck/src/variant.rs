use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const REGISTRATION_PREFIX: &str = "register";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct VariantSet {
    tags: Vec<String>,
}

impl VariantSet {
    pub fn new<I, S>(tags: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();

        if tags.is_empty() || tags.iter().any(|tag| tag.is_empty()) {
            return Err(Error::NoVariants);
        }

        Ok(Self { tags })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The first tag contained in `base_url` wins; with no match the last tag is used.
    pub fn resolve(&self, base_url: &str) -> &str {
        self.tags
            .iter()
            .find(|tag| base_url.contains(tag.as_str()))
            .or_else(|| self.tags.last())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Default for VariantSet {
    fn default() -> Self {
        Self {
            tags: vec!["csharp".into(), "golang".into(), "php".into()],
        }
    }
}

impl TryFrom<Vec<String>> for VariantSet {
    type Error = Error;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VariantSet> for Vec<String> {
    fn from(set: VariantSet) -> Self {
        set.tags
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointCategory {
    Registration,
    Login,
    Products,
    Organizations,
    Subscriptions,
    Jobs,
    Generic,
}

impl EndpointCategory {
    pub fn from_key(key: &str) -> Self {
        if key.starts_with(REGISTRATION_PREFIX) {
            return EndpointCategory::Registration;
        }

        match key {
            "login" => EndpointCategory::Login,
            "products" => EndpointCategory::Products,
            "organizations" => EndpointCategory::Organizations,
            "subscriptions" => EndpointCategory::Subscriptions,
            "jobs" => EndpointCategory::Jobs,
            _ => EndpointCategory::Generic,
        }
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EndpointCategory::Registration | EndpointCategory::Login => &["email", "password"],
            EndpointCategory::Products => &["name", "description", "category", "price"],
            EndpointCategory::Organizations => &["name", "email"],
            EndpointCategory::Subscriptions => &["userId", "organizationId"],
            EndpointCategory::Jobs => &["title", "description", "location"],
            EndpointCategory::Generic => &[],
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    PerCategory,
    Generic,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        ResolutionPolicy::PerCategory
    }
}

impl FromStr for ResolutionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-category" => Ok(ResolutionPolicy::PerCategory),
            "generic" => Ok(ResolutionPolicy::Generic),
            _ => Err(Error::UnknownResolutionPolicy(s.into())),
        }
    }
}

pub fn registration_key(variant: &str) -> String {
    format!("{}_{}", REGISTRATION_PREFIX, variant)
}
