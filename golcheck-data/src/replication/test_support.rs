//! Shared fixtures for replication tests.
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::io::{self, Write};

use async_trait::async_trait;

use super::{BaseUrl, ChangeSource, ReplicationFile, SequenceNumber, TransportError};

/// Stub [`ChangeSource`] serving in-memory bodies.
///
/// URLs without a body answer `404 Not Found`.
#[derive(Debug)]
pub struct StubChangeSource {
    base_url: BaseUrl,
    bodies: BTreeMap<String, Vec<u8>>,
    broken: BTreeSet<String>,
    requests: RefCell<Vec<String>>,
}

impl StubChangeSource {
    /// Construct an empty stub for `base_url`.
    #[must_use]
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            bodies: BTreeMap::new(),
            broken: BTreeSet::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Serve `body` at `url`.
    #[must_use]
    pub fn with_body(mut self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.bodies.insert(url.into(), body);
        self
    }

    /// Serve both files of `sequence`.
    #[must_use]
    pub fn with_sequence(self, sequence: SequenceNumber, change: Vec<u8>, state: Vec<u8>) -> Self {
        let path = sequence.path();
        let change_url = path.url(&self.base_url, ReplicationFile::Change);
        let state_url = path.url(&self.base_url, ReplicationFile::State);
        self.with_body(change_url, change).with_body(state_url, state)
    }

    /// Fail requests for `url` with a network error after writing part of the body.
    #[must_use]
    pub fn with_broken_transfer(mut self, url: impl Into<String>) -> Self {
        self.broken.insert(url.into());
        self
    }

    /// URLs requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ChangeSource for StubChangeSource {
    fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransportError> {
        self.requests.borrow_mut().push(url.to_owned());
        let Some(body) = self.bodies.get(url) else {
            return Err(TransportError::Http {
                url: url.to_owned(),
                status: 404,
                message: "Not Found".to_owned(),
            });
        };
        let sink_error = |source: io::Error| TransportError::Sink {
            url: url.to_owned(),
            source,
        };
        if self.broken.contains(url) {
            let partial = body.get(..1).unwrap_or_default();
            sink.write_all(partial).map_err(sink_error)?;
            return Err(TransportError::Network {
                url: url.to_owned(),
                source: io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"),
            });
        }
        sink.write_all(body).map_err(sink_error)?;
        Ok(u64::try_from(body.len()).unwrap_or(u64::MAX))
    }
}

/// Drive `future` to completion on a current-thread Tokio runtime.
///
/// # Panics
/// Panics when the runtime cannot be created.
#[expect(clippy::expect_used, reason = "test helpers should fail fast during setup")]
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("create Tokio runtime")
        .block_on(future)
}
