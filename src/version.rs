//! Build metadata, embedded by `vergen` at compile time.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const UNKNOWN: &str = "unknown";

/// Git branch at build time, or "unknown" outside a checkout.
pub const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => UNKNOWN,
};

/// Git commit SHA at build time, or "unknown" outside a checkout.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => UNKNOWN,
};

/// Short commit SHA, if the build knew it.
pub fn git_sha() -> Option<&'static str> {
    if GIT_SHA == UNKNOWN || GIT_SHA.is_empty() {
        None
    } else {
        Some(&GIT_SHA[..7.min(GIT_SHA.len())])
    }
}

/// Whether the working tree was dirty at build time.
pub fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

/// `{version}+{branch}.{sha}`, with `.dirty` appended for dirty trees.
///
/// Outside a git checkout this degrades to `{version}+unknown.unknown`.
pub fn version_string() -> String {
    let dirty = if git_dirty() { ".dirty" } else { "" };
    let sha = git_sha().unwrap_or(UNKNOWN);
    format!("{PKG_VERSION}+{GIT_BRANCH}.{sha}{dirty}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_pkg_version() {
        assert!(version_string().starts_with(PKG_VERSION));
    }

    #[test]
    fn version_string_contains_branch() {
        assert!(version_string().contains(GIT_BRANCH));
    }

    #[test]
    fn short_sha_is_at_most_seven_chars() {
        if let Some(sha) = git_sha() {
            assert!(sha.len() <= 7);
        }
    }
}
