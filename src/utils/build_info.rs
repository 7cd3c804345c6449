//! Build metadata embedded by `build.rs`.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("OIKOS_BUILD_HASH");
pub const GIT_STATUS: &str = env!("OIKOS_BUILD_STATUS");
pub const BUILD_TIMESTAMP: &str = env!("OIKOS_BUILD_TIMESTAMP");
pub const TARGET: &str = env!("OIKOS_BUILD_TARGET");
pub const PROFILE: &str = env!("OIKOS_BUILD_PROFILE");
pub const RUSTC: &str = env!("OIKOS_BUILD_RUSTC");

/// One-line summary printed by `oikos_cli version`.
pub fn summary() -> String {
    format!(
        "oikos_core {} ({} {}) built {} for {} [{}]",
        VERSION, GIT_HASH, GIT_STATUS, BUILD_TIMESTAMP, TARGET, PROFILE
    )
}

/// Multi-line detail including the compiler version.
pub fn details() -> Vec<(&'static str, &'static str)> {
    vec![
        ("version", VERSION),
        ("commit", GIT_HASH),
        ("status", GIT_STATUS),
        ("built", BUILD_TIMESTAMP),
        ("target", TARGET),
        ("profile", PROFILE),
        ("rustc", RUSTC),
    ]
}
