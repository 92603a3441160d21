use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the thread pool from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;

    // A bind failure (port taken, insufficient permission) is the only fatal
    // startup error: log it and exit non-zero, no retries
    let listener = match server::bind_listener(addr) {
        Ok(listener) => listener,
        Err(e) => {
            logger::log_bind_failed(&addr, &e);
            return Err(e.into());
        }
    };

    let state = Arc::new(config::AppState::new(cfg));
    logger::log_server_start(&addr, &state.config);

    server::run(listener, state).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::landing::LANDING_PAGE_HTML;
    use std::net::SocketAddr;
    use std::path::Path;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_config(root: &Path) -> config::Config {
        config::Config {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: config::PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
            static_files: config::StaticFilesConfig {
                root: root.display().to_string(),
                index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            },
        }
    }

    async fn spawn_server(root: &Path) -> SocketAddr {
        let listener = server::bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(config::AppState::new(test_config(root)));
        tokio::spawn(server::run(listener, state));
        addr
    }

    /// Raw HTTP/1.1 GET over a fresh connection; returns (head, body)
    async fn http_get(addr: SocketAddr, path: &str) -> (String, Vec<u8>) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();

        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has no header/body separator");
        let head = String::from_utf8_lossy(&raw[..split]).to_string();
        let body = raw[split + 4..].to_vec();
        (head, body)
    }

    #[tokio::test]
    async fn root_returns_landing_page_even_with_index_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
        let addr = spawn_server(dir.path()).await;

        let (head, body) = http_get(addr, "/").await;
        assert!(head.starts_with("HTTP/1.1 200"), "unexpected head: {head}");
        assert!(head.to_lowercase().contains("content-type: text/html"));
        assert_eq!(body, LANDING_PAGE_HTML.as_bytes());
    }

    #[tokio::test]
    async fn index_file_is_served_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
        let addr = spawn_server(dir.path()).await;

        let (head, body) = http_get(addr, "/index.html").await;
        assert!(head.starts_with("HTTP/1.1 200"), "unexpected head: {head}");
        assert_eq!(body, b"<p>hi</p>");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let addr = spawn_server(dir.path()).await;

        let (head, _) = http_get(addr, "/does-not-exist.txt").await;
        assert!(head.starts_with("HTTP/1.1 404"), "unexpected head: {head}");
    }

    #[tokio::test]
    async fn traversal_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let addr = spawn_server(dir.path()).await;

        let (head, body) = http_get(addr, "/../../etc/passwd").await;
        assert!(head.starts_with("HTTP/1.1 404"), "unexpected head: {head}");
        assert!(!body.windows(5).any(|w| w == b"root:"));
    }

    #[tokio::test]
    async fn repeated_requests_yield_identical_bodies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "stable content").unwrap();
        let addr = spawn_server(dir.path()).await;

        let (first_head, first_body) = http_get(addr, "/a.txt").await;
        let (second_head, second_body) = http_get(addr, "/a.txt").await;
        assert!(first_head.starts_with("HTTP/1.1 200"));
        assert!(second_head.starts_with("HTTP/1.1 200"));
        assert_eq!(first_body, second_body);
    }
}
