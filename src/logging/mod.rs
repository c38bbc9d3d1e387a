//! slog-backed HTTP request logging.
//!
//! Report requests are long-ish scans; the access log records how long each
//! one took next to the structured tracing spans the services emit.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use slog::{o, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, TermDecorator};

/// Configuration for the access logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub async_buffer_size: usize,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

/// Builds the root access logger.
pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = if config.use_color {
        TermDecorator::new().force_color().build()
    } else {
        TermDecorator::new().build()
    };

    let drain = FullFormat::new(decorator).build().fuse();
    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(
        drain,
        o!(
            "service" => "salesops-api",
            "version" => env!("CARGO_PKG_VERSION"),
        ),
    )
}

/// State carried by the logging middleware
#[derive(Clone)]
pub struct LoggingState {
    logger: Logger,
}

impl LoggingState {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

/// Access-log middleware: method, path, status, duration.
pub async fn logging_middleware(
    axum::extract::State(state): axum::extract::State<Arc<LoggingState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    slog::info!(
        &state.logger,
        "request completed";
        "method" => method,
        "path" => path,
        "status" => response.status().as_u16(),
        "duration_ms" => started.elapsed().as_millis() as u64,
    );

    Ok(response)
}
