// Listener module
// Creates the TCP listener and explains bind failures

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Pending-connection queue length passed to `listen(2)`
const BACKLOG: i32 = 1024;

/// Create a `TcpListener` with `SO_REUSEADDR` enabled.
///
/// `SO_REUSEADDR` lets a restarted server bind while old sockets linger in
/// `TIME_WAIT`; it does not allow two live listeners on one port.
pub fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

/// Operator-facing description of a bind failure
pub fn describe_bind_error(addr: &SocketAddr, err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::AddrInUse => format!(
            "Port {} is already in use; stop the other process or choose another port",
            addr.port()
        ),
        io::ErrorKind::PermissionDenied => {
            format!("Permission denied binding {addr}; try a port above 1024")
        }
        io::ErrorKind::AddrNotAvailable => {
            format!("Address {} is not available on this machine", addr.ip())
        }
        _ => format!("Failed to start server on {addr}: {err}"),
    }
}
