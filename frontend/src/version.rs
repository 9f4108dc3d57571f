/// Version information baked into the dashboard bundle
pub struct Version;

impl Version {
    pub fn current() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// `v0.3.0`, or `v0.3.0+abc1234` when the build recorded a commit
    pub fn label() -> String {
        Self::label_with(Self::current(), option_env!("GIT_COMMIT"))
    }

    pub fn label_with(version: &str, commit: Option<&str>) -> String {
        match commit.filter(|c| !c.is_empty()) {
            Some(commit) => format!("v{}+{}", version, commit.chars().take(7).collect::<String>()),
            None => format!("v{}", version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_current() {
        assert!(Version::current().contains('.'));
    }

    #[test]
    fn test_label_without_commit() {
        assert_eq!(Version::label_with("0.3.0", None), "v0.3.0");
        assert_eq!(Version::label_with("0.3.0", Some("")), "v0.3.0");
    }

    #[test]
    fn test_label_shortens_commit() {
        assert_eq!(
            Version::label_with("0.3.0", Some("0123456789abcdef")),
            "v0.3.0+0123456"
        );
        assert_eq!(Version::label_with("0.3.0", Some("abc")), "v0.3.0+abc");
    }
}
