use std::{net, io};
use net2::TcpBuilder;
use net2::unix::UnixTcpBuilderExt;

/// Opens a reusable listening socket so a restarted server can take over the port.
pub fn create_listener(
    addr: net::SocketAddr,
    backlog: i32,
) -> io::Result<net::TcpListener> {
    let builder = match addr {
        net::SocketAddr::V4(_) => TcpBuilder::new_v4()?,
        net::SocketAddr::V6(_) => TcpBuilder::new_v6()?,
    };

    builder
        .reuse_address(true)?
        .reuse_port(true)?
        .bind(addr)?
        .listen(backlog)
}

/// Binds every address `addr` resolves to. Fails only when none could be bound.
pub fn bind_to<A: net::ToSocketAddrs>(
    addr: A,
    backlog: i32,
) -> io::Result<Vec<net::TcpListener>> {
    let mut last_err = None;
    let mut sockets = Vec::new();

    for addr in addr.to_socket_addrs()? {
        match create_listener(addr, backlog) {
            Ok(listener) => sockets.push(listener),
            Err(e) => {
                log::warn!("Failed to bind to {}: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    if !sockets.is_empty() {
        return Ok(sockets);
    }

    Err(last_err.unwrap_or_else(||
        io::Error::new(io::ErrorKind::Other, "Address resolved to nothing to bind")))
}
