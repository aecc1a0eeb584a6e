use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Compact human-readable lines on stderr.
pub fn init_cli_logger(verbose: bool) {
    install(verbose, false);
}

/// JSON lines on stderr, for runs whose output is piped into other tools.
pub fn init_json_logger(verbose: bool) {
    install(verbose, true);
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "store_portal=debug,info"
    } else {
        "store_portal=info"
    }
}

fn install(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    // Reports go to stdout, so every log line stays on stderr.
    fn base_layer<S>() -> tracing_subscriber::fmt::Layer<
        S,
        tracing_subscriber::fmt::format::DefaultFields,
        tracing_subscriber::fmt::format::Format,
        fn() -> std::io::Stderr,
    > {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr as fn() -> std::io::Stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    }
    let (compact, json) = if json {
        (None, Some(base_layer().json()))
    } else {
        (Some(base_layer().compact()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(json)
        .init();
}
