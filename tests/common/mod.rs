//! Shared test utilities for trap-ingest integration tests.

// Allow dead code since not all test files use all utilities
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use trap_ingest::{
    Config, DecodeError, Oid, RecordConsumer, ResourceAttributeConfig, ResourceAttributeSource,
    TrapDecoder, TrapPdu, TrapRecord, Value, VarBind, Version,
};

/// Initialize tracing output for a test binary (RUST_LOG-controlled).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// A decoder for a trivial line format used by the tests:
/// `oid=value;oid=value;...`. Integer values become `Value::Integer`,
/// anything else an octet string. Anything that is not UTF-8 or not
/// `oid=value` shaped is a decode error.
pub fn line_decoder() -> impl TrapDecoder {
    |data: Bytes, _source: SocketAddr| -> Result<TrapPdu, DecodeError> {
        let text =
            std::str::from_utf8(&data).map_err(|_| DecodeError::new("payload is not UTF-8"))?;

        let mut varbinds = Vec::new();
        for pair in text.split(';').filter(|p| !p.trim().is_empty()) {
            let (oid, value) = pair
                .split_once('=')
                .ok_or_else(|| DecodeError::new(format!("missing '=' in '{}'", pair)))?;
            let oid = Oid::parse(oid.trim())
                .map_err(|e| DecodeError::with_source("bad varbind OID", e))?;
            let value = match value.trim().parse::<i32>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::OctetString(Bytes::copy_from_slice(value.trim().as_bytes())),
            };
            varbinds.push(VarBind::new(oid, value));
        }

        Ok(TrapPdu::new(Version::V2c, varbinds))
    }
}

/// Consumer that forwards every batch into an unbounded channel.
pub struct CollectingConsumer {
    tx: mpsc::UnboundedSender<Vec<TrapRecord>>,
}

impl RecordConsumer for CollectingConsumer {
    fn consume(
        &self,
        records: Vec<TrapRecord>,
    ) -> impl std::future::Future<Output = trap_ingest::Result<()>> + Send {
        let result = self.tx.send(records).map_err(|_| {
            trap_ingest::Error::sink(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "collector dropped",
            ))
        });
        std::future::ready(result)
    }
}

/// Build a collecting consumer and the receiving end of its channel.
pub fn collecting_consumer() -> (CollectingConsumer, mpsc::UnboundedReceiver<Vec<TrapRecord>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CollectingConsumer { tx }, rx)
}

/// Consumer that signals when a batch arrives, then stalls for `delay`.
/// Used to exercise the bounded shutdown drain.
pub struct SlowConsumer {
    started: mpsc::UnboundedSender<()>,
    delay: Duration,
}

impl SlowConsumer {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { started: tx, delay }, rx)
    }
}

impl RecordConsumer for SlowConsumer {
    fn consume(
        &self,
        _records: Vec<TrapRecord>,
    ) -> impl std::future::Future<Output = trap_ingest::Result<()>> + Send {
        let started = self.started.clone();
        let delay = self.delay;
        async move {
            let _ = started.send(());
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}

/// A config listening on an ephemeral local port with two interface-table
/// column resource attributes.
pub fn interface_config() -> Config {
    let mut cfg = Config {
        listen_address: "udp://127.0.0.1:0".to_string(),
        listener_close_timeout: Duration::from_millis(500),
        ..Config::default()
    };
    cfg.resource_attributes.insert(
        "if.index".to_string(),
        ResourceAttributeConfig {
            description: None,
            source: ResourceAttributeSource::Oid("1.3.6.1.2.1.2.2.1.1".to_string()),
        },
    );
    cfg.resource_attributes.insert(
        "if.name".to_string(),
        ResourceAttributeConfig {
            description: Some("interface name".to_string()),
            source: ResourceAttributeSource::Oid("1.3.6.1.2.1.31.1.1.1.1".to_string()),
        },
    );
    cfg
}

/// Send one UDP datagram to the receiver under test.
pub async fn send_datagram(target: SocketAddr, payload: &[u8]) {
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("bind sender socket");
    socket
        .send_to(payload, target)
        .await
        .expect("send datagram");
}

/// Wait for the next batch of records, failing the test after 5 seconds.
pub async fn recv_records(
    rx: &mut mpsc::UnboundedReceiver<Vec<TrapRecord>>,
) -> Vec<TrapRecord> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for records")
        .expect("record channel closed")
}
