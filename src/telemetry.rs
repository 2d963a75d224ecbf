//! Dev-only diagnostics: env gate, anonymized ids, subscriber setup.
//!
//! Activation requires BOTH:
//!   - dev environment (debug build OR COA_SCORING_ENV in {local, development, dev})
//!   - COA_SCORING_DEV_LOG=1

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_DEV_LOG: &str = "COA_SCORING_DEV_LOG";
pub const ENV_RUNTIME_ENV: &str = "COA_SCORING_ENV";

fn is_dev_env() -> bool {
    cfg!(debug_assertions)
        || matches!(
            std::env::var(ENV_RUNTIME_ENV)
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        )
}

pub(crate) fn dev_logging_enabled() -> bool {
    std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1") && is_dev_env()
}

/// Short stable id for a value we must not log verbatim.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/// Install a compact fmt subscriber when the dev gate is open. No-op otherwise,
/// and a second call is ignored.
pub fn init_dev_tracing() {
    if !dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("relevance=info,resources=info,tables=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("COA-001|THR-001");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("COA-001|THR-001"));
        assert_ne!(a, anon_hash("COA-002|THR-001"));
    }

    #[test]
    fn truncate_keeps_prefix() {
        let v = vec!["a", "b", "c"];
        assert_eq!(truncate_vec(&v, 2), vec!["a".to_string(), "b".to_string()]);
    }

    #[serial_test::serial]
    #[test]
    fn dev_log_needs_flag() {
        std::env::remove_var(ENV_DEV_LOG);
        assert!(!dev_logging_enabled());
        std::env::set_var(ENV_DEV_LOG, "1");
        // test builds are debug builds unless run with --release
        assert_eq!(dev_logging_enabled(), is_dev_env());
        std::env::remove_var(ENV_DEV_LOG);
    }
}
