//! Build metadata generated by the build script.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Crate version from Cargo.toml
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// One-line description used in startup logs and `--version`
pub fn long_version() -> String {
    format!("{} ({} built {})", version(), git_hash(), build_time())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_contains_parts() {
        let long = long_version();
        assert!(long.starts_with(version()));
        assert!(long.contains(git_hash()));
        assert!(long.contains(build_time()));
    }
}
