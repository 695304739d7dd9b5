use crate::{
    data::{HttpMethod, RequestData, ResponseBody, ResponseData},
    error::Error,
};
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use std::{fmt::Debug, time::Duration};

pub trait HttpClient: Debug {
    fn execute(&self, request_data: &RequestData) -> Result<ResponseData, Error>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = Client::builder();

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request_data: &RequestData) -> Result<ResponseData, Error> {
        let mut request_builder = match request_data.method {
            HttpMethod::Get => self.client.get(request_data.url.as_str()),
            HttpMethod::Post => self.client.post(request_data.url.as_str()),
        };

        if let Some(body) = &request_data.body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send()?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let text = response.text()?;

        Ok(ResponseData {
            status_code,
            body: ResponseBody::decode(content_type.as_deref(), text),
            content_type,
        })
    }
}
