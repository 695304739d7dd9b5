use crate::{
    catalog::EndpointDefinition,
    crosscheck_configuration::CrosscheckConfiguration,
    data::{HttpMethod, RequestData},
    error::Error,
    http_client::HttpClient,
    payload::{self, UniqueTokenSource},
    report::{CheckReport, Outcome, RunSummary},
    variant::{self, EndpointCategory, ResolutionPolicy},
};
use std::io::Write;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct PlannedCheck<'a> {
    pub endpoint: &'a EndpointDefinition,
    pub variant: &'a str,
}

pub fn plan<'a>(
    configuration: &'a CrosscheckConfiguration,
    base_url: &str,
) -> Result<Vec<PlannedCheck<'a>>, Error> {
    let catalog = configuration.catalog();
    let variant = configuration.variants().resolve(base_url);
    let mut checks = Vec::with_capacity(catalog.len());
    let mut registration_planned = false;

    for endpoint in catalog.endpoints() {
        match configuration.resolution() {
            ResolutionPolicy::Generic => checks.push(PlannedCheck { endpoint, variant }),
            ResolutionPolicy::PerCategory => match endpoint.category {
                EndpointCategory::Registration => {
                    if !registration_planned {
                        registration_planned = true;
                        checks.push(PlannedCheck {
                            endpoint: catalog.lookup(&variant::registration_key(variant))?,
                            variant,
                        });
                    }
                }
                EndpointCategory::Login
                | EndpointCategory::Products
                | EndpointCategory::Organizations
                | EndpointCategory::Subscriptions
                | EndpointCategory::Jobs
                | EndpointCategory::Generic => checks.push(PlannedCheck { endpoint, variant }),
            },
        }
    }

    Ok(checks)
}

pub fn execute_check<C, T>(
    configuration: &CrosscheckConfiguration,
    client: &C,
    tokens: &mut T,
    base_url: &str,
    check: PlannedCheck<'_>,
) -> Result<CheckReport, Error>
where
    C: HttpClient + ?Sized,
    T: UniqueTokenSource + ?Sized,
{
    let endpoint = check.endpoint;
    let template = endpoint.template_for(check.variant)?;

    let payload = if endpoint.inject_unique {
        payload::inject_unique(
            &template.payload,
            configuration.unique_field(),
            configuration.unique_domain(),
            tokens,
        )
    } else {
        template.payload.clone()
    };

    let request_data = RequestData {
        method: endpoint.method,
        url: format!("{}{}", base_url, endpoint.path),
        body: match endpoint.method {
            HttpMethod::Post => Some(payload),
            HttpMethod::Get => None,
        },
    };

    debug!(
        endpoint = %endpoint.key,
        variant = check.variant,
        method = %request_data.method,
        url = %request_data.url,
        "dispatching request"
    );

    let outcome = match client.execute(&request_data) {
        Ok(response) => Outcome::Completed {
            status_code: response.status_code,
            body: response.body,
        },
        Err(error) => {
            warn!(url = %request_data.url, error = %error, "request failed");
            Outcome::NotEvaluated {
                error: error.to_string(),
            }
        }
    };

    Ok(CheckReport {
        base_url: base_url.into(),
        endpoint_key: endpoint.key.clone(),
        variant: check.variant.into(),
        method: request_data.method,
        url: request_data.url,
        expected_status: template.expected_status,
        outcome,
    })
}

pub fn run<C, T, W>(
    configuration: &CrosscheckConfiguration,
    client: &C,
    tokens: &mut T,
    out: &mut W,
) -> Result<RunSummary, Error>
where
    C: HttpClient + ?Sized,
    T: UniqueTokenSource + ?Sized,
    W: Write + ?Sized,
{
    let mut summary = RunSummary::default();

    for base_url in configuration.base_urls() {
        let checks = plan(configuration, base_url)?;
        info!(
            base_url = %base_url,
            variant = configuration.variants().resolve(base_url),
            checks = checks.len(),
            "checking backend"
        );

        for check in checks {
            let report = execute_check(configuration, client, tokens, base_url, check)?;
            report.write_to(out)?;
            summary.record(report.verdict());
        }
    }

    summary.write_to(out)?;

    Ok(summary)
}
