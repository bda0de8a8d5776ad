//! HTTP transport errors
//!
//! Requests go through `reqwless` over any `embedded-nal-async` TCP stack and resolver.
//! Its errors are folded into [`HttpError`] so the sync loop can report them.

use embedded_io_async::ErrorKind;

/// HTTP exchange errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
    /// Host name did not resolve
    #[error("could not resolve the light's address")]
    Resolve,
    /// Connect, read or write failed
    #[error("connection error: {0:?}")]
    Io(ErrorKind),
    /// Light URL could not be parsed
    #[error("invalid light URL")]
    InvalidUrl,
    /// Response head or body does not fit the receive buffer
    #[error("response does not fit the receive buffer")]
    ResponseTooLarge,
    /// Response could not be decoded as HTTP
    #[error("malformed HTTP exchange")]
    Protocol,
    /// The server answered with a non-success status
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

impl From<reqwless::Error> for HttpError {
    fn from(error: reqwless::Error) -> Self {
        match error {
            reqwless::Error::Dns => HttpError::Resolve,
            reqwless::Error::Network(kind) => HttpError::Io(kind),
            reqwless::Error::InvalidUrl(_) => HttpError::InvalidUrl,
            reqwless::Error::BufferTooSmall => HttpError::ResponseTooLarge,
            _ => HttpError::Protocol,
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use core::cell::{RefCell, RefMut};
    use core::net::{IpAddr, SocketAddr};
    use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
    use embedded_nal_async::{AddrType, Dns, TcpConnect};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Scripted stream: serves a canned response, records what was written
    pub(crate) struct MockStream<'a> {
        response: Vec<u8>,
        pos: usize,
        written: RefMut<'a, Vec<u8>>,
    }

    impl ErrorType for MockStream<'_> {
        type Error = ErrorKind;
    }

    impl Read for MockStream<'_> {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
            let n = (self.response.len() - self.pos).min(buf.len()).min(7);
            buf[..n].copy_from_slice(&self.response[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl Write for MockStream<'_> {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    /// Hands out one scripted stream per queued response; refuses once they run out
    pub(crate) struct MockTcp {
        responses: RefCell<VecDeque<Vec<u8>>>,
        requests: RefCell<Vec<Vec<u8>>>,
        pub(crate) remotes: RefCell<Vec<SocketAddr>>,
    }

    impl MockTcp {
        pub(crate) fn new(responses: &[&str]) -> Self {
            Self {
                responses: RefCell::new(responses.iter().map(|r| r.as_bytes().to_vec()).collect()),
                requests: RefCell::new(Vec::new()),
                remotes: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn request(&self, index: usize) -> std::string::String {
            std::string::String::from_utf8(self.requests.borrow()[index].clone()).unwrap()
        }
    }

    impl TcpConnect for MockTcp {
        type Error = ErrorKind;
        type Connection<'a>
            = MockStream<'a>
        where
            Self: 'a;

        async fn connect<'a>(&'a self, remote: SocketAddr) -> Result<MockStream<'a>, ErrorKind> {
            let response = self
                .responses
                .borrow_mut()
                .pop_front()
                .ok_or(ErrorKind::ConnectionRefused)?;
            self.remotes.borrow_mut().push(remote);
            let mut requests = self.requests.borrow_mut();
            requests.push(Vec::new());
            Ok(MockStream {
                response,
                pos: 0,
                written: RefMut::map(requests, |r| r.last_mut().unwrap()),
            })
        }
    }

    /// Resolves address literals only
    pub(crate) struct LiteralDns;

    impl Dns for LiteralDns {
        type Error = ErrorKind;

        async fn get_host_by_name(
            &self,
            host: &str,
            _addr_type: AddrType,
        ) -> Result<IpAddr, ErrorKind> {
            host.parse().map_err(|_| ErrorKind::InvalidInput)
        }

        async fn get_host_by_address(
            &self,
            _addr: IpAddr,
            _result: &mut [u8],
        ) -> Result<usize, ErrorKind> {
            Err(ErrorKind::Unsupported)
        }
    }
}
