//! Trap receiver lifecycle and ingestion path.
//!
//! A [`TrapReceiver`] owns the validated configuration, the compiled
//! correlation engine, and the listening socket. `start` binds the socket
//! and spawns a background receive loop; every datagram becomes one tracked
//! ingestion task (decode, correlate, forward); `shutdown` cancels the loop,
//! drains in-flight work within a bounded timeout, and force-closes whatever
//! is left.

use std::future::Future;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::{Config, ListenAddress};
use crate::correlate::{CorrelationEngine, TrapRecord};
use crate::error::{DecodeError, Error, Result};
use crate::pdu::TrapPdu;
use crate::util::bind_udp_socket;

/// Wire-protocol decoding collaborator.
///
/// Invoked once per received datagram with the raw bytes and the sender's
/// address. Implemented for plain closures with the same signature.
pub trait TrapDecoder: Send + Sync + 'static {
    /// Decode one packet into a trap PDU.
    fn decode(
        &self,
        data: Bytes,
        source: SocketAddr,
    ) -> std::result::Result<TrapPdu, DecodeError>;
}

impl<F> TrapDecoder for F
where
    F: Fn(Bytes, SocketAddr) -> std::result::Result<TrapPdu, DecodeError>
        + Send
        + Sync
        + 'static,
{
    fn decode(
        &self,
        data: Bytes,
        source: SocketAddr,
    ) -> std::result::Result<TrapPdu, DecodeError> {
        self(data, source)
    }
}

/// Downstream sink for finished records.
///
/// Called once per trap with one record per correlated resource. Delivery
/// and retry semantics are the sink's own business; a returned error is
/// logged and does not affect the receiver.
pub trait RecordConsumer: Send + Sync + 'static {
    /// Accept a batch of records.
    fn consume(&self, records: Vec<TrapRecord>) -> impl Future<Output = Result<()>> + Send;
}

/// Receiver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// Constructed with a validated config; not yet listening.
    Created,
    /// `start` is binding the socket.
    Starting,
    /// Listening and ingesting traps.
    Running,
    /// `shutdown` is draining in-flight work.
    ShuttingDown,
    /// Torn down; cannot be restarted.
    Stopped,
}

/// SNMP trap receiver.
///
/// Cheap to clone; all clones share the same listener and state.
pub struct TrapReceiver<D, C> {
    inner: Arc<Inner<D, C>>,
}

impl<D, C> Clone for TrapReceiver<D, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<D, C> {
    config: Config,
    engine: CorrelationEngine,
    decoder: D,
    consumer: C,
    state: Mutex<ReceiverState>,
    local_addr: Mutex<Option<SocketAddr>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    /// Serializes concurrent `shutdown` calls into one teardown.
    shutdown_gate: tokio::sync::Mutex<()>,
}

fn relaxed<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<D: TrapDecoder, C: RecordConsumer> TrapReceiver<D, C> {
    /// Build a receiver from a raw configuration.
    ///
    /// Normalizes the listen address, validates the full configuration, and
    /// compiles the correlation engine. Returns [`Error::Config`] carrying
    /// every violated constraint if anything is wrong.
    pub fn new(config: Config, decoder: D, consumer: C) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        let engine = CorrelationEngine::new(&config)?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                engine,
                decoder,
                consumer,
                state: Mutex::new(ReceiverState::Created),
                local_addr: Mutex::new(None),
                listener: Mutex::new(None),
                cancel: CancellationToken::new(),
                tracker: TaskTracker::new(),
                shutdown_gate: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReceiverState {
        *relaxed(&self.inner.state)
    }

    /// Address the listener is bound to, once running.
    ///
    /// Useful when the configured port is `0` and the OS picked one.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *relaxed(&self.inner.local_addr)
    }

    /// The validated, normalized configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Bind the listening socket and spawn the background receive loop.
    ///
    /// Returns as soon as the listener is bound; receiving runs on its own
    /// task. Idempotent: calling `start` while already starting or running
    /// is a no-op returning `Ok`. A receiver that has been shut down refuses
    /// with [`Error::ReceiverStopped`]; a bind failure reverts the receiver
    /// to `Created` so start can be retried.
    pub async fn start(&self) -> Result<()> {
        {
            let mut state = relaxed(&self.inner.state);
            match *state {
                ReceiverState::Created => *state = ReceiverState::Starting,
                ReceiverState::Starting | ReceiverState::Running => return Ok(()),
                ReceiverState::ShuttingDown | ReceiverState::Stopped => {
                    return Err(Error::ReceiverStopped);
                }
            }
        }

        let bound = match self.bind_listener().await {
            Ok(socket) => socket.local_addr().map(|addr| (socket, addr)).map_err(Error::io),
            Err(e) => Err(e),
        };
        let (socket, local_addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                let mut state = relaxed(&self.inner.state);
                if *state == ReceiverState::Starting {
                    *state = ReceiverState::Created;
                }
                return Err(e);
            }
        };

        let mut state = relaxed(&self.inner.state);
        if *state != ReceiverState::Starting {
            // Shut down while we were binding; drop the socket unused.
            return Err(Error::ReceiverStopped);
        }

        *relaxed(&self.inner.local_addr) = Some(local_addr);
        let handle = tokio::spawn(Self::recv_loop(Arc::clone(&self.inner), socket));
        *relaxed(&self.inner.listener) = Some(handle);
        *state = ReceiverState::Running;

        tracing::info!(snmp.local_addr = %local_addr, "trap listener started");
        Ok(())
    }

    async fn bind_listener(&self) -> Result<UdpSocket> {
        let config = &self.inner.config;

        // The address was validated in `new`; parse failures here are
        // unreachable in practice but surface as config errors, not panics.
        let address = ListenAddress::parse(&config.listen_address).map_err(|_| {
            Error::Config(
                crate::error::ConfigError::InvalidListenAddress {
                    address: config.listen_address.clone(),
                }
                .into(),
            )
        })?;

        if !address.scheme.is_udp() {
            return Err(Error::UnsupportedTransport {
                scheme: address.scheme.as_str().to_string(),
            });
        }

        let socket_addr = address
            .authority()
            .to_socket_addrs()
            .map_err(Error::io)?
            .next()
            .ok_or_else(|| {
                Error::io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "could not resolve listen address",
                ))
            })?;

        bind_udp_socket(socket_addr, config.recv_buffer_size)
            .await
            .map_err(|e| Error::io_at(socket_addr, e))
    }

    async fn recv_loop(inner: Arc<Inner<D, C>>, socket: UdpSocket) {
        let mut buf = vec![0u8; inner.config.max_packet_size];

        loop {
            tokio::select! {
                _ = inner.cancel.cancelled() => break,
                recv = socket.recv_from(&mut buf) => match recv {
                    Ok((len, source)) => {
                        let data = Bytes::copy_from_slice(&buf[..len]);
                        let worker = Arc::clone(&inner);
                        inner
                            .tracker
                            .spawn(async move { worker.ingest(data, source).await });
                    }
                    Err(e) => {
                        // Keep listening; transient receive errors must not
                        // take the receiver down.
                        tracing::error!(error = %e, "failed to receive trap datagram");
                    }
                },
            }
        }

        tracing::debug!("trap listener loop exited");
    }

    /// Tear the receiver down.
    ///
    /// Signals cancellation, then waits up to `listener_close_timeout` for
    /// the receive loop and in-flight ingestion tasks to finish before
    /// force-aborting the loop. Work still running after the timeout is
    /// abandoned and its records are discarded. Idempotent: concurrent
    /// `shutdown` calls collapse into a single teardown, and shutting down a
    /// never-started receiver just marks it stopped.
    pub async fn shutdown(&self) -> Result<()> {
        let _gate = self.inner.shutdown_gate.lock().await;

        {
            let mut state = relaxed(&self.inner.state);
            match *state {
                ReceiverState::Stopped => return Ok(()),
                ReceiverState::Created => {
                    *state = ReceiverState::Stopped;
                    return Ok(());
                }
                _ => *state = ReceiverState::ShuttingDown,
            }
        }

        self.inner.cancel.cancel();
        self.inner.tracker.close();

        let mut listener = relaxed(&self.inner.listener).take();
        let timeout = self.inner.config.listener_close_timeout;
        let drained = tokio::time::timeout(timeout, async {
            if let Some(handle) = listener.as_mut() {
                let _ = handle.await;
            }
            self.inner.tracker.wait().await;
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                timeout = ?timeout,
                "shutdown drain timed out; forcing listener closed and abandoning in-flight traps"
            );
            if let Some(handle) = listener.take() {
                handle.abort();
            }
        }

        *relaxed(&self.inner.state) = ReceiverState::Stopped;
        tracing::info!("trap receiver stopped");
        Ok(())
    }
}

impl<D: TrapDecoder, C: RecordConsumer> Inner<D, C> {
    /// One unit of ingestion work: decode, correlate, forward.
    ///
    /// Failures here are isolated to this packet: they are logged and never
    /// touch the receiver state or other in-flight packets.
    async fn ingest(&self, data: Bytes, source: SocketAddr) {
        let pdu = match self.decoder.decode(data, source) {
            Ok(pdu) => pdu,
            Err(e) => {
                tracing::warn!(snmp.source = %source, error = %e, "failed to decode trap");
                return;
            }
        };

        let resources = self.engine.correlate(&pdu);
        if resources.is_empty() {
            tracing::trace!(snmp.source = %source, "trap matched no configured descriptors");
            return;
        }

        let records: Vec<TrapRecord> = resources
            .into_iter()
            .map(|resource| TrapRecord {
                source,
                trap_oid: pdu.trap_oid.clone(),
                uptime: pdu.uptime,
                resource,
            })
            .collect();

        tracing::debug!(
            snmp.source = %source,
            records = records.len(),
            "forwarding trap records"
        );

        if let Err(e) = self.consumer.consume(records).await {
            tracing::warn!(snmp.source = %source, error = %e, "record sink rejected trap records");
        }
    }
}
