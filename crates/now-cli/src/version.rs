pub const FULL: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "+git.",
    env!("NOW_GIT_SHA"),
    env!("NOW_GIT_DIRTY")
);

#[cfg(test)]
mod tests {
    use super::FULL;

    #[test]
    fn version_starts_with_package_version() {
        let prefix = format!("{}+git.", env!("CARGO_PKG_VERSION"));
        assert!(FULL.starts_with(&prefix), "unexpected version string: {FULL}");
        assert!(FULL.len() > prefix.len());
    }
}
