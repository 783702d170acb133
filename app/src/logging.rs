use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Installs the global tracing subscriber, `RUST_LOG` overrides the default filter
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let res = if cfg!(test) {
        builder.compact().with_test_writer().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = res {
        eprintln!("Logging already initialized: {}", e);
    }
}
