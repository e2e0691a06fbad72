// Third party imports
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Khởi tạo tracing subscriber cho toàn bộ process.
/// Mức log điều khiển qua biến môi trường RUST_LOG, mặc định info.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .try_init();
}
