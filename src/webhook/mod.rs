//! Webhook Client
//!
//! Forwards chat messages to a configurable HTTP webhook and turns whatever
//! comes back into displayable reply fragments.
//! Protocol: `GET <endpoint>?message=..&timestamp=..&userId=..`, JSON or text reply.

pub mod endpoint;
pub mod normalizer;
pub mod policy;
pub mod probe;
pub mod sender;
pub mod transport;

pub use endpoint::{EndpointSource, EndpointWatch, WebhookConfig};
pub use normalizer::{normalize, NormalizedResult, RawResponse, ReplyFragment};
pub use policy::RetryPolicy;
pub use probe::{probe, ProbeStatus};
pub use sender::RetryingSender;
pub use transport::{OutboundRequest, ReqwestTransport, Transport};
