use crate::sink::{SinkClosed, StreamSink};
use async_trait::async_trait;
use bytes::Bytes;
use pingora::prelude::Session;

/// Response body of a pingora session as a [`StreamSink`].
pub(crate) struct SessionSink<'a> {
    session: &'a mut Session,
}

impl<'a> SessionSink<'a> {
    pub(crate) fn new(session: &'a mut Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl StreamSink for SessionSink<'_> {
    async fn send(&mut self, data: Bytes) -> Result<(), SinkClosed> {
        self.session
            .write_response_body(Some(data), false)
            .await
            .map_err(|_| SinkClosed)
    }

    async fn closed(&mut self) {
        // Once the request body is consumed, the only thing a well-behaved
        // client can do on the connection is close it.
        loop {
            match self.session.read_body_or_idle(true).await {
                Err(_) => return,
                Ok(None) => std::future::pending::<()>().await,
                Ok(Some(_)) => continue,
            }
        }
    }
}
