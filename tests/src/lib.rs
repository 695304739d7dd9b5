#[cfg(test)]
mod tests {
    use crosscheck::{
        simulated_backend_test, CrosscheckConfiguration, HttpMethod, RandomTokenSource, Reply,
        ReqwestHttpClient, ResolutionPolicy, RunSummary, SimulatedBackend,
        SimulatedBackendConfiguration,
    };
    use serde_json::json;
    use std::net::TcpListener;

    fn configuration_for(base_urls: Vec<String>) -> CrosscheckConfiguration {
        let mut configuration = CrosscheckConfiguration::builtin();
        configuration.set_base_urls(base_urls);
        configuration.validate().unwrap();
        configuration
    }

    fn run_checks(configuration: &CrosscheckConfiguration) -> (RunSummary, String) {
        let client = ReqwestHttpClient::new().unwrap();
        let mut out = Vec::new();

        let summary = crosscheck::run(
            configuration,
            &client,
            &mut RandomTokenSource::new(),
            &mut out,
        )
        .unwrap();

        (summary, String::from_utf8(out).unwrap())
    }

    fn refused_base_url(prefix: &str) -> String {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        format!("http://{}{}", address, prefix)
    }

    fn golang_products_created(config: &mut SimulatedBackendConfiguration) {
        config.respond(
            HttpMethod::Post,
            "/golang/api/v1/products",
            Reply::json(201, &json!({"status": "success", "status_code": 201})),
        );
    }

    fn golang_products_broken(config: &mut SimulatedBackendConfiguration) {
        config.respond(
            HttpMethod::Post,
            "/golang/api/v1/products",
            Reply::json(500, &json!({"error": "internal server error"})),
        );
    }

    fn every_endpoint_succeeds(config: &mut SimulatedBackendConfiguration) {
        for variant in ["csharp", "golang"].iter() {
            let prefix = format!("/{}/api/v1", variant);
            config
                .respond(
                    HttpMethod::Post,
                    format!("{}/auth/register", prefix),
                    Reply::empty(201),
                )
                .respond(HttpMethod::Post, format!("{}/auth/login", prefix), Reply::empty(200))
                .respond(HttpMethod::Post, format!("{}/products", prefix), Reply::empty(201))
                .respond(
                    HttpMethod::Post,
                    format!("{}/organizations", prefix),
                    Reply::empty(201),
                )
                .respond(
                    HttpMethod::Post,
                    format!("{}/subscriptions/free", prefix),
                    Reply::empty(201),
                )
                .respond(HttpMethod::Post, format!("{}/jobs", prefix), Reply::empty(201));
        }
    }

    fn gateway_error_page(config: &mut SimulatedBackendConfiguration) {
        config.set_fallback(Reply::text(502, "<html>Bad Gateway</html>"));
    }

    fn accept_everything(config: &mut SimulatedBackendConfiguration) {
        config.set_fallback(Reply::json(201, &json!({"status": "success"})));
    }

    #[simulated_backend_test(golang_products_created)]
    fn products_pass_when_golang_answers_201(backend: &SimulatedBackend) {
        let base_url = backend.url("/golang/api/v1");
        let configuration = configuration_for(vec![base_url.clone()]);

        let (summary, output) = run_checks(&configuration);

        assert!(output.contains(&format!(
            "Testing POST {}/products\n\
             Expected status code: 201, Got: 201\n\
             Test passed!\n\
             Response: {{\"status\":\"success\",\"status_code\":201}}\n",
            base_url
        )));
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.total(), 6);
    }

    #[simulated_backend_test(golang_products_broken)]
    fn products_fail_when_golang_answers_500(backend: &SimulatedBackend) {
        let base_url = backend.url("/golang/api/v1");
        let configuration = configuration_for(vec![base_url.clone()]);

        let (summary, output) = run_checks(&configuration);

        assert!(output.contains(&format!(
            "Testing POST {}/products\n\
             Expected status code: 201, Got: 500\n\
             Test failed.\n",
            base_url
        )));
        assert_eq!(summary.passed, 0);
        assert_eq!(summary.failed, 6);
    }

    #[simulated_backend_test(every_endpoint_succeeds)]
    fn refused_connection_does_not_abort_the_run(backend: &SimulatedBackend) {
        let dead_base_url = refused_base_url("/php/api/v1");
        let configuration = configuration_for(vec![
            backend.url("/csharp/api/v1"),
            dead_base_url.clone(),
            backend.url("/golang/api/v1"),
        ]);

        let (summary, output) = run_checks(&configuration);

        assert_eq!(summary.total(), 3 * 6);
        assert_eq!(summary.not_evaluated, 6);
        // login uses a fixed credential and the backend accepts it
        assert_eq!(summary.passed, 12);
        assert!(!summary.all_passed());
        assert_eq!(backend.recorded_requests().unwrap().len(), 12);
        assert!(output.contains(&format!("Request to {}/auth/register failed:", dead_base_url)));
        assert!(output.contains(&format!("Request to {}/jobs failed:", dead_base_url)));
    }

    #[simulated_backend_test(gateway_error_page)]
    fn non_json_body_is_reported_as_text(backend: &SimulatedBackend) {
        let configuration = configuration_for(vec![backend.url("/php/api/v1")]);

        let (summary, output) = run_checks(&configuration);

        assert_eq!(summary.failed, 6);
        assert!(output.contains(
            "Expected status code: 200, Got: 502\n\
             Test failed.\n\
             Response: <html>Bad Gateway</html>\n"
        ));
    }

    #[simulated_backend_test(accept_everything)]
    fn registration_uses_the_backend_field_names(backend: &SimulatedBackend) {
        let configuration = configuration_for(vec![backend.url("/golang/api/v1")]);

        run_checks(&configuration);

        let requests = backend.recorded_requests().unwrap();
        let registrations = requests
            .iter()
            .filter(|request| request.path == "/golang/api/v1/auth/register")
            .collect::<Vec<_>>();
        assert_eq!(registrations.len(), 1);
        assert_eq!(
            registrations[0].content_type.as_deref(),
            Some("application/json")
        );

        let body = registrations[0].json_body().unwrap();
        assert_eq!(body["FirstName"], json!("go"));
        assert_eq!(body["LastName"], json!("lang"));
        assert_eq!(body["password"], json!("Password123"));
        let email = body["email"].as_str().unwrap();
        assert_ne!(email, "go.lang@example.com");
        assert!(email.ends_with("@example.com"));
    }

    #[simulated_backend_test(accept_everything)]
    fn generic_resolution_sends_every_registration_template(backend: &SimulatedBackend) {
        let mut configuration = configuration_for(vec![backend.url("/golang/api/v1")]);
        configuration.set_resolution(ResolutionPolicy::Generic);

        let (summary, _) = run_checks(&configuration);

        assert_eq!(summary.total(), 8);
        let requests = backend.recorded_requests().unwrap();
        let first_names = requests
            .iter()
            .filter(|request| request.path == "/golang/api/v1/auth/register")
            .map(|request| {
                let body = request.json_body().unwrap();
                ["firstName", "FirstName", "first_name"]
                    .iter()
                    .find(|field| body.get(**field).is_some())
                    .map(|field| String::from(*field))
                    .unwrap()
            })
            .collect::<Vec<_>>();
        assert_eq!(first_names, vec!["firstName", "FirstName", "first_name"]);
    }
}
