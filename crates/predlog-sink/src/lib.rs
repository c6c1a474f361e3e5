//! Hand-off of reconciled tables to a downstream consumer.

pub mod config;
pub mod error;
pub mod frame;
pub mod sink;

pub use config::{Environment, ModelType, SinkConfig};
pub use error::{Result, SinkError};
pub use frame::table_to_dataframe;
pub use sink::{
    DeliveryManifest, DirectorySink, LogRequest, Sink, SinkResponse, validate_request,
};
