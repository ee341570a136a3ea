use std::fmt;
use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use api_relay_types::RelayConfig;
use listenfd::ListenFd;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Pending connection queue for the relay socket.
const LISTEN_BACKLOG: i32 = 1024;

/// Listener for the relay: an inherited socket when started under socket
/// activation, otherwise a fresh SO_REUSEPORT bind on the configured address.
pub fn create_listener(config: &RelayConfig) -> Result<TcpListener> {
    let std_listener = match inherited_listener()? {
        Some(listener) => {
            info!("🔌 Using systemd socket activation (fd=3)");
            listener
        },
        None => {
            let addr = listen_addr(config)?;
            info!("🔌 Binding relay socket with SO_REUSEPORT to {}", addr);
            bind_reuseport(addr).with_context(|| format!("Cannot bind relay to {}", addr))?
        },
    };

    std_listener.set_nonblocking(true)?;
    Ok(TcpListener::from_std(std_listener)?)
}

fn listen_addr(config: &RelayConfig) -> Result<SocketAddr> {
    let ip: IpAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind_address))?;
    Ok(SocketAddr::new(ip, config.port))
}

/// First socket passed in via `LISTEN_FDS`, if any.
fn inherited_listener() -> Result<Option<std::net::TcpListener>> {
    let mut fds = ListenFd::from_env();
    Ok(fds.take_tcp_listener(0)?)
}

/// Lets a replacement process bind the same port while this one drains.
fn bind_reuseport(addr: SocketAddr) -> std::io::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

/// Which signal ended the serve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "Ctrl+C"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Resolves once Ctrl+C or SIGTERM arrives. A handler that fails to install
/// is logged and never fires; the other one still works.
async fn wait_for_stop() -> StopSignal {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                error!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => StopSignal::Interrupt,
        () = terminate => StopSignal::Terminate,
    }
}

/// Graceful-shutdown future for `axum::serve`.
pub async fn shutdown_signal() {
    let signal = wait_for_stop().await;
    info!("🛑 Received {}, draining in-flight relay calls", signal);
}
