//! Blocking HTTP transport backed by `ureq`.

use std::{io::Read, time::Duration};

use comext::{HttpRequest, HttpResponse, Transport, TransportError};

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Transport for UreqTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut call = self.agent.get(&request.url).timeout(request.timeout);
        for (key, value) in &request.query {
            call = call.query(key, value);
        }
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let response = match call.call() {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::Request {
                    url: request.url.clone(),
                    message: err.to_string(),
                });
            }
        };

        let status = response.status();
        // `into_string` caps bodies at 10 MB; bulk datasets are larger.
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|source| TransportError::Body {
                url: request.url.clone(),
                source,
            })?;
        Ok(HttpResponse { status, body })
    }
}
