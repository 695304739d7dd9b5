use crate::{data::HttpMethod, error::Error};
use futures::channel::oneshot;
use hyper::{
    body,
    header::CONTENT_TYPE,
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    convert::Infallible,
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};
use tokio::runtime::Runtime;
use tracing::error;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl Reply {
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            content_type: Some("application/json".into()),
            body: body.to_string(),
        }
    }

    pub fn text<S: Into<String>>(status_code: u16, body: S) -> Self {
        Self {
            status_code,
            content_type: Some("text/plain".into()),
            body: body.into(),
        }
    }

    pub fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            content_type: None,
            body: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Result<Value, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedBackendConfiguration {
    routes: HashMap<(String, String), Reply>,
    fallback: Reply,
}

impl SimulatedBackendConfiguration {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            fallback: Reply::text(404, "Not Found"),
        }
    }

    pub fn respond<P: Into<String>>(
        &mut self,
        method: HttpMethod,
        path: P,
        reply: Reply,
    ) -> &mut Self {
        self.routes.insert((method.as_str().into(), path.into()), reply);
        self
    }

    pub fn set_fallback(&mut self, reply: Reply) -> &mut Self {
        self.fallback = reply;
        self
    }

    fn reply_for(&self, method: &str, path: &str) -> &Reply {
        self.routes
            .get(&(method.into(), path.into()))
            .unwrap_or(&self.fallback)
    }
}

impl Default for SimulatedBackendConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SimulatedBackend {
    address: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl SimulatedBackend {
    pub fn start(configuration: SimulatedBackendConfiguration) -> Result<Self, Error> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown, shutdown_signal) = oneshot::channel::<()>();
        let runtime = Runtime::new()?;

        let configuration = Arc::new(configuration);
        let recorded = requests.clone();

        let join_handle = thread::spawn(move || {
            runtime.block_on(async move {
                let builder = match Server::from_tcp(listener) {
                    Ok(builder) => builder,
                    Err(e) => {
                        error!(error = %e, "simulated backend couldn't start");
                        return;
                    }
                };

                let server = builder
                    .http1_keepalive(false)
                    .serve(make_service_fn(move |_| {
                        let configuration = configuration.clone();
                        let recorded = recorded.clone();

                        async move {
                            Ok::<_, Infallible>(service_fn(move |request| {
                                handle_request(request, configuration.clone(), recorded.clone())
                            }))
                        }
                    }))
                    .with_graceful_shutdown(async move {
                        let _ = shutdown_signal.await;
                    });

                if let Err(e) = server.await {
                    error!(error = %e, "simulated backend error");
                }
            });
        });

        Ok(Self {
            address,
            requests,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn url<S: AsRef<str>>(&self, prefix: S) -> String {
        format!("http://{}{}", self.address, prefix.as_ref())
    }

    pub fn recorded_requests(&self) -> Result<Vec<RecordedRequest>, Error> {
        Ok(self.requests.lock()?.clone())
    }
}

impl Drop for SimulatedBackend {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                error!("Couldn't gracefully shutdown the simulated backend thread");
            }
        }
    }
}

async fn handle_request(
    mut request: Request<Body>,
    configuration: Arc<SimulatedBackendConfiguration>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<Response<Body>, Infallible> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    let body = body::to_bytes(request.body_mut())
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();

    let reply = configuration.reply_for(&method, &path).clone();

    if let Ok(mut requests) = recorded.lock() {
        requests.push(RecordedRequest {
            method,
            path,
            content_type,
            body,
        });
    }

    let mut response_builder = Response::builder().status(reply.status_code);

    if let Some(content_type) = &reply.content_type {
        response_builder = response_builder.header(CONTENT_TYPE, content_type.as_str());
    }

    Ok(response_builder
        .body(reply.body.into())
        .unwrap_or_else(|_| Response::new(Body::empty())))
}
