use socket2::{Domain, Protocol, Socket, Type};
use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
};
use tokio::net::TcpListener;

// Wildcard host: listen on every interface.
pub const ANY_HOST: &str = "*";

const LISTEN_BACKLOG: i32 = 1024;

/// Binds the gallery server. `host == "*"` means all interfaces, IPv6
/// dual-stack first with an IPv4-only fallback.
pub async fn create_listener(host: &str, port: u16) -> io::Result<(String, TcpListener)> {
    if host == ANY_HOST {
        return create_wildcard_listener(port);
    }

    let addr = format!("{}:{}", host, port);
    tracing::info!("Attempting to bind server to {}...", addr);

    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr().map(|a| a.to_string()).unwrap_or(addr);

    Ok((bound, listener))
}

fn create_wildcard_listener(port: u16) -> io::Result<(String, TcpListener)> {
    let ipv6 = SocketAddr::from((Ipv6Addr::UNSPECIFIED, port));
    tracing::info!(
        "Attempting to bind server to {}... (IPv6 + IPv4 dual-stack)",
        ipv6
    );
    match bind_socket(Domain::IPV6, ipv6) {
        Ok(listener) => return Ok((ipv6.to_string(), listener)),
        Err(e) => tracing::warn!("Failed to bind IPv6 listener: {}. Attempting IPv4 only.", e),
    }

    let ipv4 = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    tracing::info!("Attempting to bind server to {}... (IPv4)", ipv4);
    let listener = bind_socket(Domain::IPV4, ipv4)?;

    Ok((ipv4.to_string(), listener))
}

fn bind_socket(domain: Domain, addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    if domain == Domain::IPV6 {
        // Some systems refuse dual-stack; IPv6 alone is still usable.
        if let Err(e) = socket.set_only_v6(false) {
            tracing::warn!("Failed to set dual-stack mode for IPv6 socket: {}", e);
        }
    }

    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    socket.set_nonblocking(true)?;

    TcpListener::from_std(socket.into())
}
