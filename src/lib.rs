//! IP address lookup service: class, classful subnet, gateway and privacy of
//! an IPv4 or IPv6 address, served over HTTP.

pub mod address;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;

pub use address::{Address, Prefix};
pub use analyzer::{analyze, AddressClass, SubnetDescriptor};
pub use error::{AnalyzeError, ApiError};
