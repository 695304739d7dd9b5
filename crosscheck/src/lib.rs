pub mod catalog;
mod crosscheck_configuration;
mod data;
mod error;
mod http_client;
pub mod payload;
mod report;
pub mod runner;
mod simulated_backend;
pub mod variant;

pub use catalog::{Catalog, EndpointDefinition, PayloadTemplate, Templates};
pub use crosscheck_codegen::simulated_backend_test;
pub use crosscheck_configuration::{CrosscheckConfiguration, BASE_URLS_ENV, CONFIG_PATH_ENV};
pub use data::{HttpMethod, Payload, RequestData, ResponseBody, ResponseData};
pub use error::Error;
pub use http_client::{HttpClient, ReqwestHttpClient};
pub use payload::{RandomTokenSource, UniqueTokenSource};
pub use report::{CheckReport, Outcome, RunSummary, Verdict};
pub use runner::run;
pub use simulated_backend::{
    RecordedRequest, Reply, SimulatedBackend, SimulatedBackendConfiguration,
};
pub use variant::{EndpointCategory, ResolutionPolicy, VariantSet};
