use clap::Parser;
use crosscheck::{
    CrosscheckConfiguration, Error, RandomTokenSource, ReqwestHttpClient, ResolutionPolicy,
    CONFIG_PATH_ENV,
};
use std::{
    env,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_CHECKS_FAILED: u8 = 1;
const EXIT_ERROR: u8 = 2;

/// Checks several implementations of the same API against one set of endpoint expectations.
#[derive(Debug, Parser)]
#[command(name = "api-crosscheck", version)]
struct Cli {
    /// TOML configuration file (falls back to CROSSCHECK_CONFIG, then to the built-in table)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL to check; repeat to check several. Replaces the configured list.
    #[arg(long = "base-url", value_name = "URL")]
    base_urls: Vec<String>,

    /// `per-category` or `generic`
    #[arg(long, value_name = "POLICY")]
    resolution: Option<ResolutionPolicy>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Exit with a failure code when any check failed or could not be evaluated
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let stdout = io::stdout();
    let result = execute(Cli::parse(), |name| env::var(name).ok(), &mut stdout.lock());

    ExitCode::from(exit_status(result))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

fn exit_status(result: Result<u8, Error>) -> u8 {
    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "crosscheck aborted");
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn execute<F, W>(cli: Cli, env_lookup: F, out: &mut W) -> Result<u8, Error>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let config_path = cli
        .config
        .or_else(|| env_lookup(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut configuration = CrosscheckConfiguration::load_or_builtin(config_path.as_ref())?;
    configuration.apply_env_overrides(&env_lookup);

    if !cli.base_urls.is_empty() {
        configuration.set_base_urls(cli.base_urls);
    }
    if let Some(resolution) = cli.resolution {
        configuration.set_resolution(resolution);
    }
    configuration.validate()?;

    if cli.print_config {
        write!(out, "{}", configuration.to_toml()?)?;
        return Ok(0);
    }

    info!(
        base_urls = configuration.base_urls().len(),
        endpoints = configuration.catalog().len(),
        "starting crosscheck"
    );

    let client = ReqwestHttpClient::with_timeout(configuration.timeout())?;
    let summary = crosscheck::run(
        &configuration,
        &client,
        &mut RandomTokenSource::new(),
        out,
    )?;
    out.flush()?;

    if cli.strict && !summary.all_passed() {
        return Ok(EXIT_CHECKS_FAILED);
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosscheck::{HttpMethod, Reply, SimulatedBackend, SimulatedBackendConfiguration};
    use std::{fs, net::TcpListener};
    use tempfile::NamedTempFile;

    const HEALTH_ONLY: &str = r#"
base_urls = ["http://localhost:8081/from-file/api/v1"]

[[endpoints]]
key = "health"
path = "/health"
method = "GET"
inject_unique = false

[endpoints.template]
expected_status = 200
"#;

    const GOLANG_REGISTRATION_ONLY: &str = r#"
base_urls = ["http://localhost:8081/golang/api/v1"]
variants = ["csharp", "golang"]

[[endpoints]]
key = "register_golang"
path = "/auth/register"
method = "POST"

[endpoints.template]
expected_status = 201
payload = { email = "go.lang@example.com", password = "Password123" }
"#;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("api-crosscheck").chain(args.iter().copied())).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn execute_with<F: Fn(&str) -> Option<String>>(
        args: &[&str],
        env_lookup: F,
    ) -> (Result<u8, Error>, String) {
        let mut out = Vec::<u8>::new();
        let result = execute(cli(args), env_lookup, &mut out);

        (result, String::from_utf8(out).unwrap())
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), contents).unwrap();
        file
    }

    fn failing_backend() -> SimulatedBackend {
        let mut configuration = SimulatedBackendConfiguration::new();
        configuration.set_fallback(Reply::empty(500));
        SimulatedBackend::start(configuration).unwrap()
    }

    #[test]
    fn test_failed_checks_exit_zero_by_default() {
        let backend = failing_backend();
        let base_url = backend.url("/golang/api/v1");

        let (result, output) = execute_with(&["--base-url", &base_url], no_env);

        assert_eq!(result.unwrap(), 0);
        assert!(output.contains(&format!("Testing POST {}/products", base_url)));
        assert!(output.contains("Test failed."));
        // the flag replaces the built-in deployments
        assert!(!output.contains("deployment.api-csharp"));
        assert_eq!(backend.recorded_requests().unwrap().len(), 6);
    }

    #[test]
    fn test_strict_exits_one_when_a_check_failed() {
        let backend = failing_backend();
        let base_url = backend.url("/golang/api/v1");

        let (result, _) = execute_with(&["--strict", "--base-url", &base_url], no_env);

        assert_eq!(result.unwrap(), EXIT_CHECKS_FAILED);
    }

    #[test]
    fn test_strict_exits_one_when_a_check_was_not_evaluated() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let base_url = format!("http://{}/golang/api/v1", listener.local_addr().unwrap());
        drop(listener);
        let file = config_file(HEALTH_ONLY);
        let config = file.path().to_str().unwrap();

        let (result, output) =
            execute_with(&["--strict", "--config", config, "--base-url", &base_url], no_env);

        assert_eq!(result.unwrap(), EXIT_CHECKS_FAILED);
        assert!(output.contains("Summary: 0 passed, 0 failed, 1 not evaluated"));
    }

    #[test]
    fn test_strict_exits_zero_when_every_check_passed() {
        let mut configuration = SimulatedBackendConfiguration::new();
        configuration.respond(HttpMethod::Get, "/php/api/v1/health", Reply::empty(200));
        let backend = SimulatedBackend::start(configuration).unwrap();
        let base_url = backend.url("/php/api/v1");
        let file = config_file(HEALTH_ONLY);
        let config = file.path().to_str().unwrap();

        let (result, output) =
            execute_with(&["--strict", "--config", config, "--base-url", &base_url], no_env);

        assert_eq!(result.unwrap(), 0);
        assert!(output.contains("Test passed!"));
    }

    #[test]
    fn test_configuration_error_exits_two() {
        let (result, output) = execute_with(&["--base-url", "not-a-url"], no_env);

        assert!(matches!(&result, Err(Error::InvalidBaseUrl(url)) if url == "not-a-url"));
        assert_eq!(exit_status(result), EXIT_ERROR);
        assert!(output.is_empty());
    }

    #[test]
    fn test_print_config_writes_toml_without_checking() {
        let (result, output) = execute_with(
            &["--print-config", "--base-url", "http://localhost:8081/golang/api/v1/"],
            no_env,
        );

        assert_eq!(result.unwrap(), 0);
        assert!(!output.contains("Testing"));

        let printed = CrosscheckConfiguration::from_toml_str(&output).unwrap();
        assert_eq!(printed.base_urls(), &["http://localhost:8081/golang/api/v1"]);
        assert_eq!(printed.catalog().len(), 8);
    }

    #[test]
    fn test_config_path_falls_back_to_environment() {
        let file = config_file(HEALTH_ONLY);
        let path = file.path().to_str().unwrap().to_string();

        let (result, output) = execute_with(&["--print-config"], |name| match name {
            CONFIG_PATH_ENV => Some(path.clone()),
            _ => None,
        });

        assert_eq!(result.unwrap(), 0);
        let printed = CrosscheckConfiguration::from_toml_str(&output).unwrap();
        assert_eq!(printed.base_urls(), &["http://localhost:8081/from-file/api/v1"]);
        assert_eq!(printed.catalog().len(), 1);
    }

    #[test]
    fn test_environment_base_urls_are_overridden_by_the_flag() {
        let env_lookup = |name: &str| match name {
            crosscheck::BASE_URLS_ENV => Some("http://localhost:9000/php/api/v1".to_string()),
            _ => None,
        };

        let (_, from_env) = execute_with(&["--print-config"], env_lookup);
        let (_, from_flag) = execute_with(
            &["--print-config", "--base-url", "http://localhost:9001/csharp/api/v1"],
            env_lookup,
        );

        assert!(from_env.contains("http://localhost:9000/php/api/v1"));
        assert!(!from_flag.contains("localhost:9000"));
        assert!(from_flag.contains("http://localhost:9001/csharp/api/v1"));
    }

    #[test]
    fn test_resolution_flag_applies_before_validation() {
        let file = config_file(GOLANG_REGISTRATION_ONLY);
        let config = file.path().to_str().unwrap();

        let (rejected, _) = execute_with(&["--print-config", "--config", config], no_env);
        let (accepted, output) = execute_with(
            &["--print-config", "--config", config, "--resolution", "generic"],
            no_env,
        );

        assert!(matches!(rejected, Err(Error::UnknownEndpoint(key)) if key == "register_csharp"));
        assert_eq!(accepted.unwrap(), 0);
        assert!(output.contains("resolution = \"generic\""));
    }
}
