//! HTTP plumbing: request options, transport, endpoint failover.
//!
//! Layers, from the bottom up:
//!
//! - [`request_config`]: per-request headers, parameters, timeout and response type
//! - [`client`]: the [`Transport`] trait and its `reqwest` implementation
//! - [`endpoint_pool`]: the ordered endpoints of a repository with failover
//! - [`headers`], [`mime`], [`utils`]: shared helpers and constants

pub mod client;
pub mod endpoint_pool;
pub mod headers;
pub mod mime;
pub mod request_config;
pub mod utils;

pub use client::{
    ByteStream, HttpClientConfig, HttpRequest, HttpResponse, ReqwestTransport, ResponseBody, Transport,
};
pub use endpoint_pool::EndpointPool;
pub use request_config::{HttpRequestConfig, HttpRequestConfigBuilder, ResponseType};
