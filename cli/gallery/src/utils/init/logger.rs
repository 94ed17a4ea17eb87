use std::sync::OnceLock;

use tracing::{debug, error};
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;

static LOGGER_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// Map a verbosity to an [EnvFilter] directive
pub(crate) fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        // Show only errors
        Verbosity::Quiet => "off,gallery=error",
        // Only show warnings
        Verbosity::Verbose(0) => "off,gallery=warn,gallery_rust_sdk=warn",
        // Show our own info logs
        Verbosity::Verbose(1) => "off,gallery=info,gallery_rust_sdk=info",
        // Also show debug from our libraries
        Verbosity::Verbose(2) => {
            "off,gallery=debug,gallery_rust_sdk=debug,gallery_catalog=debug,gallery_core=debug"
        },
        // Also show trace from our libraries
        Verbosity::Verbose(3) => {
            "off,gallery=trace,gallery_rust_sdk=trace,gallery_catalog=trace,gallery_core=trace"
        },
        // Also show debug from http and runtime crates
        Verbosity::Verbose(4) => {
            "debug,gallery=trace,gallery_rust_sdk=trace,gallery_catalog=trace,gallery_core=trace"
        },
        Verbosity::Verbose(_) => "trace",
    }
}

pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let verbosity = verbosity.unwrap_or_default();

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        let (subscriber, reload_handle) = create_registry_and_filter_reload_handle();
        subscriber.init();
        reload_handle
    });

    update_filters(filter_handle, log_filter(verbosity));
}

/// Replace the active filter, `RUST_LOG` takes precedence if set
pub fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

pub fn create_registry_and_filter_reload_handle() -> (
    impl tracing_subscriber::layer::SubscriberExt,
    Handle<EnvFilter, Registry>,
) {
    debug!("Initializing logger (how are you seeing this?)");
    // The first filter is replaced by `update_filters` right away,
    // start permissive so `log` records are not capped at a lower level.
    let filter = EnvFilter::new("trace");
    let (filter, filter_reload_handle) = tracing_subscriber::reload::Layer::new(filter);
    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(tracing_subscriber::fmt::format())
        .with_filter(filter);
    let registry = tracing_subscriber::registry().with(log_layer);

    (registry, filter_reload_handle)
}
