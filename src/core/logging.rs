//! Tracing initialization for the command-line binary

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding a tracing filter, e.g. `sanity_lab=debug`
pub const LOG_ENV: &str = "SANITY_LAB_LOG";

static INIT: Once = Once::new();

/// Install the stderr subscriber.
///
/// `SANITY_LAB_LOG` wins when set and valid; otherwise `verbosity` picks the
/// level (0 = warn, 1 = info, 2+ = debug). Calling this more than once is a
/// no-op.
pub fn init_logging(verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init();
    });
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "sanity_lab=warn",
        1 => "sanity_lab=info",
        _ => "sanity_lab=debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0), "sanity_lab=warn");
        assert_eq!(default_directive(1), "sanity_lab=info");
        assert_eq!(default_directive(5), "sanity_lab=debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging(0);
        init_logging(2);
    }
}
