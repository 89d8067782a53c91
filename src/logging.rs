//! Tracing subscriber setup for the binary. Library code only emits events.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Install a `fmt` subscriber on stderr. Safe to call more than once.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
        install_panic_hook();
    });
}

/// Route panics through tracing before the default hook prints them.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        tracing::error!(
            thread = thread.name().unwrap_or("<unnamed>"),
            "panic: {info}"
        );
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::debug!("still alive");
    }
}
