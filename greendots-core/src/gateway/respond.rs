use crate::gateway::RequestError;
use crate::gateway::session_sink::SessionSink;
use crate::static_files::{NO_CACHE, StaticBody, StaticResponse};
use bytes::{Bytes, BytesMut};
use http::{Method, StatusCode, header};
use pingora::prelude::Session;
use pingora_http::ResponseHeader;
use serde::Serialize;
use tokio::io::AsyncReadExt;

const FILE_CHUNK_SIZE: usize = 32 * 1024;

/// One request/response pair. Tracks whether the response has started, since
/// after that an error can only end the connection.
pub(crate) struct Exchange<'a> {
    session: &'a mut Session,
    head: bool,
    no_cache: bool,
    started: bool,
}

impl<'a> Exchange<'a> {
    pub(crate) fn new(session: &'a mut Session, head: bool, no_cache: bool) -> Self {
        Self {
            session,
            head,
            no_cache,
            started: false,
        }
    }

    pub(crate) fn session(&mut self) -> &mut Session {
        self.session
    }

    pub(crate) fn is_head(&self) -> bool {
        self.head
    }

    pub(crate) fn started(&self) -> bool {
        self.started
    }

    pub(crate) fn sink(&mut self) -> SessionSink<'_> {
        SessionSink::new(self.session)
    }

    /// Never reuse this connection once the response is abandoned midway.
    pub(crate) fn abandon(&mut self) {
        self.session.set_keepalive(None);
    }

    pub(crate) fn header(&self, status: StatusCode) -> Result<ResponseHeader, RequestError> {
        let mut resp = ResponseHeader::build(status, None)?;
        if self.no_cache {
            resp.insert_header(header::CACHE_CONTROL, NO_CACHE)?;
        }
        Ok(resp)
    }

    /// Write the header. With `end`, the response has no body at all.
    pub(crate) async fn start(&mut self, resp: ResponseHeader, end: bool) -> Result<(), RequestError> {
        self.started = true;
        self.session
            .write_response_header(Box::new(resp), end)
            .await?;
        if self.head && !end {
            self.session.write_response_body(None, true).await?;
        }
        Ok(())
    }

    /// Close the body of a response started without a length.
    pub(crate) async fn finish(&mut self) -> Result<(), RequestError> {
        if !self.head {
            self.session.write_response_body(None, true).await?;
        }
        Ok(())
    }

    pub(crate) async fn send(
        &mut self,
        status: StatusCode,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), RequestError> {
        let mut resp = self.header(status)?;
        resp.insert_header(header::CONTENT_TYPE, content_type)?;
        self.send_with(resp, body).await
    }

    /// Send a complete body under a prepared header.
    pub(crate) async fn send_with(
        &mut self,
        mut resp: ResponseHeader,
        body: Bytes,
    ) -> Result<(), RequestError> {
        resp.insert_header(header::CONTENT_LENGTH, body.len().to_string())?;
        self.start(resp, false).await?;
        if !self.head {
            self.session.write_response_body(Some(body), true).await?;
        }
        Ok(())
    }

    pub(crate) async fn send_json<T>(&mut self, status: StatusCode, value: &T) -> Result<(), RequestError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        self.send(status, "application/json", Bytes::from(body)).await
    }

    /// Plain-text error: the canonical reason phrase and nothing else.
    pub(crate) async fn send_error(&mut self, status: StatusCode) -> Result<(), RequestError> {
        let reason = status.canonical_reason().unwrap_or("Error");
        self.send(
            status,
            "text/plain; charset=utf-8",
            Bytes::from(format!("{reason}\n")),
        )
        .await
    }

    pub(crate) async fn send_method_not_allowed(&mut self, allowed: &Method) -> Result<(), RequestError> {
        let status = StatusCode::METHOD_NOT_ALLOWED;
        let mut resp = self.header(status)?;
        let allow = if *allowed == Method::GET {
            "GET, HEAD"
        } else {
            allowed.as_str()
        };
        resp.insert_header(header::ALLOW, allow)?;
        resp.insert_header(header::CONTENT_TYPE, "text/plain; charset=utf-8")?;
        self.send_with(resp, Bytes::from_static(b"Method Not Allowed\n"))
            .await
    }

    pub(crate) async fn send_static(&mut self, static_resp: StaticResponse) -> Result<(), RequestError> {
        let mut resp = self.header(static_resp.status)?;
        for (name, value) in static_resp.headers.iter() {
            resp.insert_header(name, value)?;
        }

        match static_resp.body {
            StaticBody::Empty => self.start(resp, true).await,
            StaticBody::Bytes(bytes) => {
                self.start(resp, false).await?;
                if !self.head {
                    self.session.write_response_body(Some(bytes), true).await?;
                }
                Ok(())
            }
            StaticBody::File {
                mut file,
                mut remaining,
            } => {
                self.start(resp, false).await?;
                if self.head {
                    return Ok(());
                }

                let mut buf = BytesMut::with_capacity(FILE_CHUNK_SIZE);
                while remaining > 0 {
                    let to_read = remaining.min(FILE_CHUNK_SIZE as u64) as usize;
                    buf.resize(to_read, 0);

                    let n = file
                        .read(&mut buf[..])
                        .await
                        .map_err(|source| RequestError::Io {
                            what: "static file",
                            source,
                        })?;
                    if n == 0 {
                        break;
                    }

                    remaining -= n as u64;
                    buf.truncate(n);
                    self.session
                        .write_response_body(Some(buf.split().freeze()), false)
                        .await?;
                }

                self.session.write_response_body(None, true).await?;
                Ok(())
            }
        }
    }
}
