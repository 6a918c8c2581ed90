//! Request pipeline: descriptors, transport, retry policy and the API client.

mod cancel;
mod client;
mod error;
mod request;
mod response;
mod retry;
mod transport;

pub use cancel::CancellationToken;
pub use client::ApiClient;
pub use error::RequestError;
pub use request::{HttpMethod, RequestDescriptor};
pub use response::{ApiResponse, TransportResponse};
pub use retry::{
    BASE_RETRY_DELAY, FailureKind, RetryState, Sleeper, TokioSleeper, Transition, backoff_delay,
};
pub use transport::{OutboundRequest, ReqwestTransport, Transport};
