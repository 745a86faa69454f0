//! # trap-ingest
//!
//! Async SNMP trap ingestion for Rust: receive trap/notification packets
//! over UDP, validate the connection's security configuration, correlate
//! each trap's indexed varbinds onto logical resources, and forward one
//! structured record per resource to a downstream consumer.
//!
//! Wire-protocol decoding is deliberately external: the receiver hands every
//! datagram to a [`TrapDecoder`] you provide and consumes the decoded
//! [`TrapPdu`] it returns. Finished [`TrapRecord`]s go to your
//! [`RecordConsumer`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trap_ingest::{Config, TrapReceiver};
//!
//! # fn my_decoder() -> impl trap_ingest::TrapDecoder {
//! #     |_data: bytes::Bytes, _source: std::net::SocketAddr|
//! #         -> Result<trap_ingest::TrapPdu, trap_ingest::DecodeError> {
//! #         Err(trap_ingest::DecodeError::new("example"))
//! #     }
//! # }
//! # struct LogConsumer;
//! # impl trap_ingest::RecordConsumer for LogConsumer {
//! #     fn consume(&self, records: Vec<trap_ingest::TrapRecord>)
//! #         -> impl std::future::Future<Output = trap_ingest::Result<()>> + Send {
//! #         std::future::ready(Ok(()))
//! #     }
//! # }
//! #[tokio::main]
//! async fn main() -> trap_ingest::Result<()> {
//!     let config: Config = serde_json::from_str(
//!         r#"{
//!             "listen_address": "0.0.0.0:1162",
//!             "version": "v2c",
//!             "community": "public",
//!             "resource_attributes": {
//!                 "if.index": { "oid": "1.3.6.1.2.1.2.2.1.1" }
//!             }
//!         }"#,
//!     ).expect("config");
//!
//!     let receiver = TrapReceiver::new(config, my_decoder(), LogConsumer)?;
//!     receiver.start().await?;
//!     // ... traps flow to the consumer ...
//!     receiver.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod correlate;
pub mod error;
pub mod oid;
pub mod pdu;
pub mod receiver;
pub mod v3;
pub mod version;

pub(crate) mod util;

// Re-exports for convenience
pub use config::{
    AttributeBinding, AttributeConfig, AttributeSource, Config, ListenAddress, Opaque,
    ResourceAttributeConfig, ResourceAttributeSource, TransportScheme, normalize_listen_address,
};
pub use correlate::{CorrelationEngine, Resource, ResourceIndex, TrapRecord};
pub use error::{ConfigError, ConfigErrors, DecodeError, Error, Result};
pub use oid::Oid;
pub use pdu::{TrapPdu, Value, VarBind};
pub use receiver::{ReceiverState, RecordConsumer, TrapDecoder, TrapReceiver};
pub use v3::{AuthProtocol, PrivProtocol, SecurityLevel};
pub use version::Version;
