use crate::{
    data::{HttpMethod, Payload},
    error::Error,
    variant::{self, EndpointCategory, ResolutionPolicy, VariantSet},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};

const DEFAULT_EXPECTED_STATUS: u16 = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadTemplate {
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub payload: Payload,
}

impl PayloadTemplate {
    pub fn new(expected_status: u16, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Payload::new(),
        };

        Self {
            expected_status,
            payload,
        }
    }
}

fn default_expected_status() -> u16 {
    DEFAULT_EXPECTED_STATUS
}

fn default_inject_unique() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq)]
pub enum Templates {
    Single(PayloadTemplate),
    PerVariant(BTreeMap<String, PayloadTemplate>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEndpoint", into = "RawEndpoint")]
pub struct EndpointDefinition {
    pub key: String,
    pub path: String,
    pub method: HttpMethod,
    pub category: EndpointCategory,
    pub inject_unique: bool,
    pub templates: Templates,
}

impl EndpointDefinition {
    pub fn single<K, P>(key: K, path: P, method: HttpMethod, template: PayloadTemplate) -> Self
    where
        K: Into<String>,
        P: Into<String>,
    {
        let key = key.into();

        Self {
            category: EndpointCategory::from_key(&key),
            key,
            path: path.into(),
            method,
            inject_unique: true,
            templates: Templates::Single(template),
        }
    }

    pub fn per_variant<K, P, I, S>(key: K, path: P, method: HttpMethod, templates: I) -> Self
    where
        K: Into<String>,
        P: Into<String>,
        I: IntoIterator<Item = (S, PayloadTemplate)>,
        S: Into<String>,
    {
        let key = key.into();

        Self {
            category: EndpointCategory::from_key(&key),
            key,
            path: path.into(),
            method,
            inject_unique: true,
            templates: Templates::PerVariant(
                templates
                    .into_iter()
                    .map(|(variant, template)| (variant.into(), template))
                    .collect(),
            ),
        }
    }

    pub fn without_unique_injection(mut self) -> Self {
        self.inject_unique = false;
        self
    }

    pub fn template_for(&self, variant: &str) -> Result<&PayloadTemplate, Error> {
        match &self.templates {
            Templates::Single(template) => Ok(template),
            Templates::PerVariant(templates) => {
                templates
                    .get(variant)
                    .ok_or_else(|| Error::MissingVariantTemplate {
                        endpoint: self.key.clone(),
                        variant: variant.into(),
                    })
            }
        }
    }

    fn all_templates(&self) -> Vec<&PayloadTemplate> {
        match &self.templates {
            Templates::Single(template) => vec![template],
            Templates::PerVariant(templates) => templates.values().collect(),
        }
    }

    fn validate(&self, variants: &VariantSet) -> Result<(), Error> {
        if !self.path.starts_with('/') {
            return Err(Error::InvalidConfiguration(format!(
                "endpoint `{}` path `{}` should start with `/`",
                self.key, self.path
            )));
        }

        if let Templates::PerVariant(_) = self.templates {
            for tag in variants.tags() {
                self.template_for(tag)?;
            }
        }

        for template in self.all_templates() {
            for field in self.category.required_fields() {
                if !template.payload.contains_key(*field) {
                    return Err(Error::MissingRequiredField {
                        endpoint: self.key.clone(),
                        field: (*field).into(),
                    });
                }
            }

            if let Some((field, _)) = template
                .payload
                .iter()
                .find(|(_, value)| {
                    !(value.is_string() || value.is_number() || value.is_boolean())
                })
            {
                // payloads have to survive `to_toml`, which has no null
                return Err(Error::InvalidConfiguration(format!(
                    "endpoint `{}` field `{}` should hold a string, number or bool",
                    self.key, field
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEndpoint {
    key: String,
    path: String,
    method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<EndpointCategory>,
    #[serde(default = "default_inject_unique")]
    inject_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<PayloadTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variants: Option<BTreeMap<String, PayloadTemplate>>,
}

impl TryFrom<RawEndpoint> for EndpointDefinition {
    type Error = Error;

    fn try_from(raw: RawEndpoint) -> Result<Self, Self::Error> {
        let templates = match (raw.template, raw.variants) {
            (Some(template), None) => Templates::Single(template),
            (None, Some(variants)) => Templates::PerVariant(variants),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidConfiguration(format!(
                    "endpoint `{}` declares both `template` and `variants`",
                    raw.key
                )))
            }
            (None, None) => {
                return Err(Error::InvalidConfiguration(format!(
                    "endpoint `{}` declares neither `template` nor `variants`",
                    raw.key
                )))
            }
        };

        Ok(Self {
            category: raw
                .category
                .unwrap_or_else(|| EndpointCategory::from_key(&raw.key)),
            key: raw.key,
            path: raw.path,
            method: raw.method,
            inject_unique: raw.inject_unique,
            templates,
        })
    }
}

impl From<EndpointDefinition> for RawEndpoint {
    fn from(endpoint: EndpointDefinition) -> Self {
        let category = if endpoint.category == EndpointCategory::from_key(&endpoint.key) {
            None
        } else {
            Some(endpoint.category)
        };
        let (template, variants) = match endpoint.templates {
            Templates::Single(template) => (Some(template), None),
            Templates::PerVariant(variants) => (None, Some(variants)),
        };

        Self {
            key: endpoint.key,
            path: endpoint.path,
            method: endpoint.method,
            category,
            inject_unique: endpoint.inject_unique,
            template,
            variants,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<EndpointDefinition>", into = "Vec<EndpointDefinition>")]
pub struct Catalog {
    endpoints: Vec<EndpointDefinition>,
}

impl Catalog {
    pub fn new(endpoints: Vec<EndpointDefinition>) -> Result<Self, Error> {
        let mut keys = HashSet::new();

        for endpoint in &endpoints {
            if !keys.insert(endpoint.key.as_str()) {
                return Err(Error::InvalidConfiguration(format!(
                    "endpoint `{}` is declared more than once",
                    endpoint.key
                )));
            }
        }

        Ok(Self { endpoints })
    }

    pub fn lookup(&self, key: &str) -> Result<&EndpointDefinition, Error> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.key == key)
            .ok_or_else(|| Error::UnknownEndpoint(key.into()))
    }

    pub fn endpoints(&self) -> &[EndpointDefinition] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn validate(&self, variants: &VariantSet, policy: ResolutionPolicy) -> Result<(), Error> {
        for endpoint in &self.endpoints {
            endpoint.validate(variants)?;
        }

        let has_registration = self
            .endpoints
            .iter()
            .any(|endpoint| endpoint.category == EndpointCategory::Registration);

        if policy == ResolutionPolicy::PerCategory && has_registration {
            for tag in variants.tags() {
                self.lookup(&variant::registration_key(tag))?;
            }
        }

        Ok(())
    }

    pub fn builtin() -> Self {
        let product = json!({
            "name": "product",
            "description": "product",
            "category": "category",
            "price": 0.01
        });
        let organization = json!({
            "name": "string",
            "description": "string",
            "email": "string",
            "industry": "string",
            "type": "string",
            "country": "string",
            "address": "string",
            "state": "string"
        });
        let subscription = json!({
            "userId": "string",
            "organizationId": "string"
        });
        let credentials = json!({
            "email": "test.kim@example.com",
            "password": "Password123"
        });
        let job = json!({
            "title": "string",
            "description": "string",
            "location": "string",
            "salary": 0,
            "level": 0,
            "company": "string"
        });
        let golang_job = json!({
            "title": "string",
            "salary": "5000-7000",
            "job_type": "string",
            "location": "string",
            "deadline": "2024-12-31T23:59:59Z",
            "work_mode": "string",
            "experience": "string",
            "how_to_apply": "string",
            "job_benefits": "string",
            "company_name": "string",
            "description": "string",
            "key_responsibilities": "string",
            "qualifications": "string"
        });

        let same_for_all = |status: u16, payload: &Value| {
            ["csharp", "golang", "php"]
                .iter()
                .map(|tag| (*tag, PayloadTemplate::new(status, payload.clone())))
                .collect::<Vec<_>>()
        };

        Self {
            endpoints: vec![
                EndpointDefinition::single(
                    "register_csharp",
                    "/auth/register",
                    HttpMethod::Post,
                    PayloadTemplate::new(
                        201,
                        json!({
                            "firstName": "test",
                            "lastName": "kim",
                            "email": "test.kim@example.com",
                            "password": "Password123",
                            "phoneNumber": "123-456-7890"
                        }),
                    ),
                ),
                EndpointDefinition::single(
                    "register_golang",
                    "/auth/register",
                    HttpMethod::Post,
                    PayloadTemplate::new(
                        201,
                        json!({
                            "FirstName": "go",
                            "LastName": "lang",
                            "email": "go.lang@example.com",
                            "password": "Password123"
                        }),
                    ),
                ),
                EndpointDefinition::single(
                    "register_php",
                    "/auth/register",
                    HttpMethod::Post,
                    PayloadTemplate::new(
                        201,
                        json!({
                            "first_name": "Php",
                            "last_name": "Diana",
                            "email": "john.php@example.com",
                            "password": "Janphp163!"
                        }),
                    ),
                ),
                EndpointDefinition::per_variant(
                    "login",
                    "/auth/login",
                    HttpMethod::Post,
                    same_for_all(200, &credentials),
                )
                .without_unique_injection(),
                EndpointDefinition::per_variant(
                    "products",
                    "/products",
                    HttpMethod::Post,
                    same_for_all(201, &product),
                ),
                EndpointDefinition::per_variant(
                    "organizations",
                    "/organizations",
                    HttpMethod::Post,
                    same_for_all(201, &organization),
                ),
                EndpointDefinition::per_variant(
                    "subscriptions",
                    "/subscriptions/free",
                    HttpMethod::Post,
                    same_for_all(201, &subscription),
                ),
                EndpointDefinition::per_variant(
                    "jobs",
                    "/jobs",
                    HttpMethod::Post,
                    vec![
                        ("csharp", PayloadTemplate::new(201, job.clone())),
                        ("golang", PayloadTemplate::new(201, golang_job)),
                        ("php", PayloadTemplate::new(201, job)),
                    ],
                ),
            ],
        }
    }
}

impl TryFrom<Vec<EndpointDefinition>> for Catalog {
    type Error = Error;

    fn try_from(value: Vec<EndpointDefinition>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Catalog> for Vec<EndpointDefinition> {
    fn from(catalog: Catalog) -> Self {
        catalog.endpoints
    }
}
