//! Tracing subscriber setup.
//!
//! Nothing is installed unless `ILT_LOG` or `RUST_LOG` is set. `ILT_LOG`
//! wins when both are, and takes the usual filter syntax:
//!
//! ```bash
//! ILT_LOG=ilt_rewrite=trace iltc ...
//! ILT_LOG=debug ILT_LOG_FORMAT=text iltc ...
//! ```
//!
//! Output is an indented span tree on stderr; `ILT_LOG_FORMAT=text` switches
//! to flat lines.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub const LOG_ENV: &str = "ILT_LOG";
pub const LOG_FORMAT_ENV: &str = "ILT_LOG_FORMAT";

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let Some(filter) = filter_from_env() else {
            return;
        };

        let flat = std::env::var(LOG_FORMAT_ENV)
            .is_ok_and(|format| format.eq_ignore_ascii_case("text"));
        let installed = if flat {
            Registry::default()
                .with(filter)
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .try_init()
        } else {
            let tree = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree).try_init()
        };

        // Another subscriber (a host application, a test harness) got there first.
        if let Err(error) = installed {
            tracing::debug!(%error, "tracing subscriber already installed");
        }
    });
}

fn filter_from_env() -> Option<EnvFilter> {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        return Some(EnvFilter::builder().parse_lossy(directives));
    }
    std::env::var("RUST_LOG")
        .is_ok()
        .then(EnvFilter::from_default_env)
}
