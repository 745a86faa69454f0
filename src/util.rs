//! Internal utilities.

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Create and bind the listening UDP socket.
///
/// For IPv6 addresses, sets `IPV6_V6ONLY = false` so a single `[::]` socket
/// accepts both IPv4 and IPv6 traps. Address reuse is enabled for quick
/// restarts. `recv_buffer_size` is applied when given; the kernel may cap it
/// at `net.core.rmem_max`, and larger buffers reduce drops during trap
/// bursts.
pub(crate) async fn bind_udp_socket(
    addr: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }

    socket.set_reuse_address(true)?;

    if let Some(size) = recv_buffer_size {
        // Ignore errors - kernel will cap at rmem_max
        let _ = socket.set_recv_buffer_size(size);
    }

    // Set non-blocking before converting to tokio socket
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;

    UdpSocket::from_std(socket.into())
}
