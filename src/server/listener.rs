// Listener module
// Binds the TCP listener the accept loop runs on

use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Bind a `TcpListener` on the given address.
///
/// A plain bind with no address reuse: if another instance already holds
/// the port this fails with `AddrInUse`, and the caller exits instead of
/// silently sharing the socket.
pub fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let std_listener = std::net::TcpListener::bind(addr)?;

    // Required for conversion into the async listener
    std_listener.set_nonblocking(true)?;

    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_an_ephemeral_port() {
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn second_bind_on_the_same_port_fails() {
        let first = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = first.local_addr().unwrap();

        let second = bind_listener(addr);
        assert_eq!(second.unwrap_err().kind(), std::io::ErrorKind::AddrInUse);
    }
}
