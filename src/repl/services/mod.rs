//! # Services Layer
//!
//! Work that reaches outside the event loop: building and sending HTTP
//! requests and decoding what comes back.

pub mod decoder;
pub mod http;
pub mod transport;

pub use http::{CompletedExchange, ExchangeResult, HttpService, SubmitError};
pub use transport::{HttpSettings, HttpTransport, ReqwestTransport, TlsVersion};
