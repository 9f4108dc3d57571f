//! API base-URL resolution.
//!
//! The dashboard resolves the prefix for its HTTP requests exactly once at
//! startup, before the root component is mounted. Candidates are consulted
//! in a fixed order (build-time environment value, runtime-injected global
//! configuration, a fallback derived from the page location, a literal) and
//! the first defined one wins. Which candidates take part depends on the
//! [`BaseUrlPolicy`] the build selects.
//!
//! Everything here is a pure function of explicit inputs so it can be tested
//! without a browser; the frontend crate supplies the browser adapters.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Build-time environment variable carrying the API base URL.
pub const API_URL_ENV_VAR: &str = "VITE_API_URL";

/// Literal used by [`BaseUrlPolicy::HardcodedFallback`] unless overridden.
pub const DEFAULT_PRODUCTION_URL: &str = "https://monitor-firewallmonitor.koswui.easypanel.host";

/// Port substituted by [`BaseUrlPolicy::DerivedPortFallback`].
pub const DERIVED_FALLBACK_PORT: u16 = 8000;

/// Key of the runtime configuration object on the global context.
pub const RUNTIME_CONFIG_KEY: &str = "__APP_CONFIG__";

/// Field of the runtime configuration object holding the override.
pub const RUNTIME_OVERRIDE_FIELD: &str = "API_URL";

/// Strategy used when the environment value is not defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrlPolicy {
    /// Environment value, else a fixed production URL.
    HardcodedFallback { literal: String },
    /// Environment value, else relative URLs.
    RelativeOnly,
    /// Environment value, else relative URLs and a diagnostic.
    WarnAndRelative,
    /// Environment value, else the runtime override, else
    /// `{protocol}//{hostname}:{port}` and a diagnostic.
    DerivedPortFallback { port: u16 },
}

impl BaseUrlPolicy {
    pub fn hardcoded() -> Self {
        BaseUrlPolicy::HardcodedFallback {
            literal: DEFAULT_PRODUCTION_URL.to_string(),
        }
    }

    pub fn derived_port() -> Self {
        BaseUrlPolicy::DerivedPortFallback {
            port: DERIVED_FALLBACK_PORT,
        }
    }

    /// Canonical selector name, accepted back by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            BaseUrlPolicy::HardcodedFallback { .. } => "hardcoded",
            BaseUrlPolicy::RelativeOnly => "relative",
            BaseUrlPolicy::WarnAndRelative => "warn-relative",
            BaseUrlPolicy::DerivedPortFallback { .. } => "derived-port",
        }
    }

    /// Whether taking the fallback path emits a diagnostic.
    pub fn warns_on_fallback(&self) -> bool {
        matches!(
            self,
            BaseUrlPolicy::WarnAndRelative | BaseUrlPolicy::DerivedPortFallback { .. }
        )
    }

    /// Whether the runtime global and the page location take part in resolution.
    pub fn consults_runtime_sources(&self) -> bool {
        matches!(self, BaseUrlPolicy::DerivedPortFallback { .. })
    }
}

impl Default for BaseUrlPolicy {
    fn default() -> Self {
        BaseUrlPolicy::hardcoded()
    }
}

impl fmt::Display for BaseUrlPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BaseUrlPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hardcoded" | "hardcoded-fallback" => Ok(BaseUrlPolicy::hardcoded()),
            "relative" | "relative-only" => Ok(BaseUrlPolicy::RelativeOnly),
            "warn-relative" | "warn-and-relative" => Ok(BaseUrlPolicy::WarnAndRelative),
            "derived-port" | "derived-port-fallback" => Ok(BaseUrlPolicy::derived_port()),
            _ => Err(format!("Unknown base URL policy: {}", s)),
        }
    }
}

/// Configuration object the hosting page may inject after the bundle is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(rename = "API_URL", default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl RuntimeConfig {
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
        }
    }
}

/// The parts of the page location the derived fallback needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme as the browser reports it, trailing colon included (`https:`).
    pub protocol: String,
    pub hostname: String,
}

impl PageLocation {
    pub fn new(protocol: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
        }
    }

    pub fn origin_with_port(&self, port: u16) -> String {
        format!("{}//{}:{}", self.protocol, self.hostname, port)
    }
}

/// Everything resolution may look at, passed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverInputs {
    pub env_api_url: Option<String>,
    pub runtime_config: Option<RuntimeConfig>,
    pub page_location: Option<PageLocation>,
}

impl ResolverInputs {
    pub fn with_env(mut self, value: impl Into<String>) -> Self {
        self.env_api_url = Some(value.into());
        self
    }

    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = Some(config);
        self
    }

    pub fn with_page_location(mut self, location: PageLocation) -> Self {
        self.page_location = Some(location);
        self
    }

    /// Whether the environment value is present and non-empty.
    pub fn has_env_value(&self) -> bool {
        defined(self.env_api_url.as_deref()).is_some()
    }
}

/// A candidate counts only when present and non-empty.
fn defined(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Outcome of resolution: an absolute prefix or relative-URL behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolvedBaseUrl {
    Absolute(String),
    #[default]
    Unset,
}

impl ResolvedBaseUrl {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedBaseUrl::Absolute(url) => Some(url),
            ResolvedBaseUrl::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ResolvedBaseUrl::Unset)
    }

    /// Prefix a request path the way the HTTP client combines a base URL
    /// with a request URL. Absolute request URLs are left alone.
    pub fn join(&self, path: &str) -> String {
        match self {
            ResolvedBaseUrl::Unset => path.to_string(),
            ResolvedBaseUrl::Absolute(base) => {
                if path.is_empty() {
                    base.clone()
                } else if is_absolute_url(path) {
                    path.to_string()
                } else {
                    format!(
                        "{}/{}",
                        base.trim_end_matches('/'),
                        path.trim_start_matches('/')
                    )
                }
            }
        }
    }
}

impl fmt::Display for ResolvedBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedBaseUrl::Absolute(url) => f.write_str(url),
            ResolvedBaseUrl::Unset => f.write_str("(relative)"),
        }
    }
}

/// `scheme://...` or protocol-relative `//...`.
fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    match url.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Which candidate produced the resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Environment,
    RuntimeOverride,
    DerivedFromLocation,
    HardcodedLiteral,
    Relative,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionSource::Environment => "environment",
            ResolutionSource::RuntimeOverride => "runtime override",
            ResolutionSource::DerivedFromLocation => "page location",
            ResolutionSource::HardcodedLiteral => "hardcoded literal",
            ResolutionSource::Relative => "relative fallback",
        };
        f.write_str(label)
    }
}

/// Advisory raised when a warning policy falls back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDiagnostic {
    pub policy: BaseUrlPolicy,
    pub fallback: ResolvedBaseUrl,
}

impl fmt::Display for FallbackDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fallback {
            ResolvedBaseUrl::Absolute(url) => write!(
                f,
                "{} is not set; falling back to {} for API requests",
                API_URL_ENV_VAR, url
            ),
            ResolvedBaseUrl::Unset => write!(
                f,
                "{} is not set; API requests will use URLs relative to the page origin",
                API_URL_ENV_VAR
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub base_url: ResolvedBaseUrl,
    pub source: ResolutionSource,
    pub diagnostic: Option<FallbackDiagnostic>,
}

impl Resolution {
    fn new(base_url: ResolvedBaseUrl, source: ResolutionSource) -> Self {
        Self {
            base_url,
            source,
            diagnostic: None,
        }
    }

    fn with_diagnostic(mut self, policy: &BaseUrlPolicy) -> Self {
        self.diagnostic = Some(FallbackDiagnostic {
            policy: policy.clone(),
            fallback: self.base_url.clone(),
        });
        self
    }

    pub fn has_diagnostic(&self) -> bool {
        self.diagnostic.is_some()
    }

    /// Write the diagnostic, if any, to the operator log.
    pub fn emit_diagnostic(&self) {
        if let Some(diagnostic) = &self.diagnostic {
            log::warn!("{}", diagnostic);
        }
    }
}

/// Resolve the API base URL. Never fails; an undefined configuration
/// degrades to the policy's fallback.
pub fn resolve(policy: &BaseUrlPolicy, inputs: &ResolverInputs) -> Resolution {
    if let Some(url) = defined(inputs.env_api_url.as_deref()) {
        return Resolution::new(
            ResolvedBaseUrl::Absolute(url.to_string()),
            ResolutionSource::Environment,
        );
    }

    match policy {
        BaseUrlPolicy::HardcodedFallback { literal } => Resolution::new(
            ResolvedBaseUrl::Absolute(literal.clone()),
            ResolutionSource::HardcodedLiteral,
        ),
        BaseUrlPolicy::RelativeOnly => {
            Resolution::new(ResolvedBaseUrl::Unset, ResolutionSource::Relative)
        }
        BaseUrlPolicy::WarnAndRelative => {
            Resolution::new(ResolvedBaseUrl::Unset, ResolutionSource::Relative)
                .with_diagnostic(policy)
        }
        BaseUrlPolicy::DerivedPortFallback { port } => {
            let runtime_override = inputs
                .runtime_config
                .as_ref()
                .and_then(|config| defined(config.api_url.as_deref()));
            if let Some(url) = runtime_override {
                return Resolution::new(
                    ResolvedBaseUrl::Absolute(url.to_string()),
                    ResolutionSource::RuntimeOverride,
                );
            }

            let fallback = match &inputs.page_location {
                Some(location) => Resolution::new(
                    ResolvedBaseUrl::Absolute(location.origin_with_port(*port)),
                    ResolutionSource::DerivedFromLocation,
                ),
                None => Resolution::new(ResolvedBaseUrl::Unset, ResolutionSource::Relative),
            };
            fallback.with_diagnostic(policy)
        }
    }
}

/// Write-once holder for the resolved base URL, read on every request.
#[derive(Debug, Default)]
pub struct BaseUrlSlot {
    cell: OnceCell<ResolvedBaseUrl>,
}

impl BaseUrlSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Install the resolved value. The first write wins; later writes are
    /// ignored and reported.
    pub fn install(&self, value: ResolvedBaseUrl) -> bool {
        match self.cell.set(value) {
            Ok(()) => true,
            Err(rejected) => {
                log::warn!(
                    "API base URL already installed; ignoring later value {}",
                    rejected
                );
                false
            }
        }
    }

    pub fn is_installed(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The installed value, or relative-URL behavior before installation.
    pub fn current(&self) -> ResolvedBaseUrl {
        self.cell.get().cloned().unwrap_or_default()
    }

    pub fn join(&self, path: &str) -> String {
        match self.cell.get() {
            Some(base_url) => base_url.join(path),
            None => path.to_string(),
        }
    }
}

/// Startup sequence: resolve, report, install, then mount the UI exactly once.
pub fn bootstrap<F>(
    policy: &BaseUrlPolicy,
    inputs: &ResolverInputs,
    slot: &BaseUrlSlot,
    mount: F,
) -> Resolution
where
    F: FnOnce(&Resolution),
{
    let resolution = resolve(policy, inputs);
    log::info!(
        "API base URL resolved with {} policy from {}: {}",
        policy,
        resolution.source,
        resolution.base_url
    );
    resolution.emit_diagnostic();
    slot.install(resolution.base_url.clone());
    mount(&resolution);
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::cell::Cell;
    use test_case::test_case;

    fn location() -> PageLocation {
        PageLocation::new("https:", "dashboard.internal")
    }

    fn all_policies() -> Vec<BaseUrlPolicy> {
        vec![
            BaseUrlPolicy::hardcoded(),
            BaseUrlPolicy::RelativeOnly,
            BaseUrlPolicy::WarnAndRelative,
            BaseUrlPolicy::derived_port(),
        ]
    }

    #[test]
    fn env_value_wins_under_every_policy() {
        let inputs = ResolverInputs::default()
            .with_env("https://api.example.com")
            .with_runtime_config(RuntimeConfig::with_api_url("https://runtime.example.com"))
            .with_page_location(location());

        for policy in all_policies() {
            let resolution = resolve(&policy, &inputs);
            assert_eq!(
                resolution.base_url,
                ResolvedBaseUrl::Absolute("https://api.example.com".to_string()),
                "policy {}",
                policy
            );
            assert_eq!(resolution.source, ResolutionSource::Environment);
            assert!(!resolution.has_diagnostic());
        }
    }

    #[test]
    fn hardcoded_policy_falls_back_to_literal() {
        let resolution = resolve(&BaseUrlPolicy::hardcoded(), &ResolverInputs::default());

        assert_eq!(
            resolution.base_url,
            ResolvedBaseUrl::Absolute(DEFAULT_PRODUCTION_URL.to_string())
        );
        assert_eq!(resolution.source, ResolutionSource::HardcodedLiteral);
        assert!(!resolution.has_diagnostic());
    }

    #[test]
    fn hardcoded_policy_uses_custom_literal() {
        let policy = BaseUrlPolicy::HardcodedFallback {
            literal: "https://monitor.example.org".to_string(),
        };
        let resolution = resolve(&policy, &ResolverInputs::default());
        assert_eq!(resolution.base_url.as_str(), Some("https://monitor.example.org"));
    }

    #[test]
    fn relative_policy_leaves_base_unset_without_diagnostic() {
        let resolution = resolve(&BaseUrlPolicy::RelativeOnly, &ResolverInputs::default());

        assert_eq!(resolution.base_url, ResolvedBaseUrl::Unset);
        assert_eq!(resolution.source, ResolutionSource::Relative);
        assert_eq!(resolution.diagnostic, None);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("http://localhost:8000"), false)]
    fn warn_policy_diagnoses_only_when_env_undefined(
        #[case] env: Option<&str>,
        #[case] expect_diagnostic: bool,
    ) {
        let inputs = ResolverInputs {
            env_api_url: env.map(str::to_string),
            ..Default::default()
        };
        let resolution = resolve(&BaseUrlPolicy::WarnAndRelative, &inputs);

        assert_eq!(resolution.has_diagnostic(), expect_diagnostic);
        assert_eq!(resolution.base_url.is_unset(), expect_diagnostic);
    }

    #[test]
    fn relative_and_warn_policies_ignore_runtime_sources() {
        let inputs = ResolverInputs::default()
            .with_runtime_config(RuntimeConfig::with_api_url("https://runtime.example.com"))
            .with_page_location(location());

        for policy in [BaseUrlPolicy::RelativeOnly, BaseUrlPolicy::WarnAndRelative] {
            assert_eq!(resolve(&policy, &inputs).base_url, ResolvedBaseUrl::Unset);
        }
    }

    #[test]
    fn derived_policy_prefers_runtime_override() {
        let inputs = ResolverInputs::default()
            .with_runtime_config(RuntimeConfig::with_api_url("https://runtime.example.com"))
            .with_page_location(location());
        let resolution = resolve(&BaseUrlPolicy::derived_port(), &inputs);

        assert_eq!(
            resolution.base_url,
            ResolvedBaseUrl::Absolute("https://runtime.example.com".to_string())
        );
        assert_eq!(resolution.source, ResolutionSource::RuntimeOverride);
        assert!(!resolution.has_diagnostic());
    }

    #[test]
    fn derived_policy_builds_origin_on_port_8000() {
        let inputs = ResolverInputs::default().with_page_location(location());
        let resolution = resolve(&BaseUrlPolicy::derived_port(), &inputs);

        assert_eq!(
            resolution.base_url,
            ResolvedBaseUrl::Absolute("https://dashboard.internal:8000".to_string())
        );
        assert_eq!(resolution.source, ResolutionSource::DerivedFromLocation);
        let diagnostic = resolution.diagnostic.expect("fallback should be diagnosed");
        assert_eq!(diagnostic.policy, BaseUrlPolicy::derived_port());
        assert_eq!(
            diagnostic.to_string(),
            "VITE_API_URL is not set; falling back to https://dashboard.internal:8000 for API requests"
        );
    }

    #[test_case(None ; "no runtime object")]
    #[test_case(Some(RuntimeConfig::default()) ; "object without override")]
    #[test_case(Some(RuntimeConfig::with_api_url("")) ; "empty override")]
    fn derived_policy_treats_missing_override_as_absent(runtime: Option<RuntimeConfig>) {
        let inputs = ResolverInputs {
            env_api_url: None,
            runtime_config: runtime,
            page_location: Some(PageLocation::new("http:", "10.0.0.5")),
        };
        let resolution = resolve(&BaseUrlPolicy::derived_port(), &inputs);

        assert_eq!(resolution.base_url.as_str(), Some("http://10.0.0.5:8000"));
        assert!(resolution.has_diagnostic());
    }

    #[test]
    fn derived_policy_without_location_degrades_to_relative() {
        let resolution = resolve(&BaseUrlPolicy::derived_port(), &ResolverInputs::default());

        assert_eq!(resolution.base_url, ResolvedBaseUrl::Unset);
        assert_eq!(resolution.source, ResolutionSource::Relative);
        assert!(resolution.has_diagnostic());
    }

    #[test]
    fn empty_env_value_counts_as_absent() {
        let inputs = ResolverInputs::default().with_env("");
        assert!(!inputs.has_env_value());

        let resolution = resolve(&BaseUrlPolicy::hardcoded(), &inputs);
        assert_eq!(resolution.source, ResolutionSource::HardcodedLiteral);
    }

    #[test_case("hardcoded", BaseUrlPolicy::hardcoded())]
    #[test_case("Hardcoded-Fallback", BaseUrlPolicy::hardcoded())]
    #[test_case("relative", BaseUrlPolicy::RelativeOnly)]
    #[test_case("relative-only", BaseUrlPolicy::RelativeOnly)]
    #[test_case("warn-relative", BaseUrlPolicy::WarnAndRelative)]
    #[test_case(" warn-and-relative ", BaseUrlPolicy::WarnAndRelative)]
    #[test_case("derived-port", BaseUrlPolicy::derived_port())]
    #[test_case("DERIVED-PORT-FALLBACK", BaseUrlPolicy::derived_port())]
    fn policy_parses_from_selector(input: &str, expected: BaseUrlPolicy) {
        assert_eq!(input.parse::<BaseUrlPolicy>(), Ok(expected));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = "proxy".parse::<BaseUrlPolicy>().unwrap_err();
        assert!(err.contains("proxy"));
    }

    #[test]
    fn policy_name_parses_back() {
        for policy in all_policies() {
            assert_eq!(policy.name().parse::<BaseUrlPolicy>(), Ok(policy.clone()));
        }
    }

    #[test]
    fn default_policy_is_hardcoded() {
        assert_eq!(BaseUrlPolicy::default(), BaseUrlPolicy::hardcoded());
        assert!(!BaseUrlPolicy::default().warns_on_fallback());
        assert!(BaseUrlPolicy::derived_port().consults_runtime_sources());
    }

    #[test]
    fn runtime_config_reads_injected_json() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"API_URL": "https://api.example.com", "theme": "dark"}"#)
                .unwrap();
        assert_eq!(config, RuntimeConfig::with_api_url("https://api.example.com"));

        let empty: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.api_url, None);
    }

    #[rstest]
    #[case("https://api.example.com", "/api/hosts", "https://api.example.com/api/hosts")]
    #[case("https://api.example.com/", "/api/hosts", "https://api.example.com/api/hosts")]
    #[case("https://api.example.com/v1", "api/hosts", "https://api.example.com/v1/api/hosts")]
    #[case("https://api.example.com", "", "https://api.example.com")]
    #[case("https://api.example.com", "https://other.example.com/x", "https://other.example.com/x")]
    #[case("https://api.example.com", "//cdn.example.com/x", "//cdn.example.com/x")]
    fn absolute_base_joins_paths(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let base = ResolvedBaseUrl::Absolute(base.to_string());
        assert_eq!(base.join(path), expected);
    }

    #[test]
    fn unset_base_keeps_paths_relative() {
        assert_eq!(ResolvedBaseUrl::Unset.join("/api/hosts"), "/api/hosts");
        assert_eq!(ResolvedBaseUrl::Unset.to_string(), "(relative)");
    }

    #[test]
    fn slot_keeps_first_value() {
        let slot = BaseUrlSlot::new();
        assert!(!slot.is_installed());
        assert_eq!(slot.current(), ResolvedBaseUrl::Unset);
        assert_eq!(slot.join("/api/hosts"), "/api/hosts");

        assert!(slot.install(ResolvedBaseUrl::Absolute("https://a.example.com".to_string())));
        assert!(!slot.install(ResolvedBaseUrl::Absolute("https://b.example.com".to_string())));

        assert_eq!(slot.current().as_str(), Some("https://a.example.com"));
        assert_eq!(slot.join("/api/hosts"), "https://a.example.com/api/hosts");
    }

    #[rstest]
    #[case(BaseUrlPolicy::hardcoded())]
    #[case(BaseUrlPolicy::RelativeOnly)]
    #[case(BaseUrlPolicy::WarnAndRelative)]
    #[case(BaseUrlPolicy::derived_port())]
    fn bootstrap_mounts_exactly_once(#[case] policy: BaseUrlPolicy) {
        for inputs in [
            ResolverInputs::default(),
            ResolverInputs::default().with_env("https://api.example.com"),
            ResolverInputs::default().with_page_location(location()),
        ] {
            let slot = BaseUrlSlot::new();
            let mounts = Cell::new(0);

            let resolution = bootstrap(&policy, &inputs, &slot, |resolved| {
                assert_eq!(slot.current(), resolved.base_url);
                mounts.set(mounts.get() + 1);
            });

            assert_eq!(mounts.get(), 1);
            assert_eq!(resolution, resolve(&policy, &inputs));
        }
    }

    fn arb_policy() -> impl Strategy<Value = BaseUrlPolicy> {
        prop_oneof![
            Just(BaseUrlPolicy::hardcoded()),
            Just(BaseUrlPolicy::RelativeOnly),
            Just(BaseUrlPolicy::WarnAndRelative),
            (1u16..=u16::MAX).prop_map(|port| BaseUrlPolicy::DerivedPortFallback { port }),
        ]
    }

    fn arb_inputs() -> impl Strategy<Value = ResolverInputs> {
        (
            proptest::option::of("[a-z:/.0-9]{0,24}"),
            proptest::option::of(proptest::option::of("[a-z:/.0-9]{0,24}")),
            proptest::option::of(("(http|https):", "[a-z0-9.-]{1,16}")),
        )
            .prop_map(|(env, runtime, location)| ResolverInputs {
                env_api_url: env,
                runtime_config: runtime.map(|api_url| RuntimeConfig { api_url }),
                page_location: location.map(|(protocol, host)| PageLocation::new(protocol, host)),
            })
    }

    proptest! {
        #[test]
        fn resolution_is_idempotent(policy in arb_policy(), inputs in arb_inputs()) {
            prop_assert_eq!(resolve(&policy, &inputs), resolve(&policy, &inputs.clone()));
        }

        #[test]
        fn defined_env_value_is_returned_verbatim(
            policy in arb_policy(),
            inputs in arb_inputs(),
            env in "[a-z:/.0-9]{1,24}",
        ) {
            let inputs = inputs.with_env(env.clone());
            let resolution = resolve(&policy, &inputs);
            prop_assert_eq!(resolution.base_url, ResolvedBaseUrl::Absolute(env));
            prop_assert!(resolution.diagnostic.is_none());
        }

        #[test]
        fn diagnostic_only_from_warning_policies(policy in arb_policy(), inputs in arb_inputs()) {
            let resolution = resolve(&policy, &inputs);
            if resolution.has_diagnostic() {
                prop_assert!(policy.warns_on_fallback());
                prop_assert!(!inputs.has_env_value());
            }
        }
    }

    mod captured_warnings {
        use std::cell::RefCell;
        use std::sync::Once;

        thread_local! {
            static WARNINGS: RefCell<Vec<String>> = RefCell::new(Vec::new());
        }

        struct ThreadCapture;

        impl log::Log for ThreadCapture {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                metadata.level() <= log::Level::Warn
            }

            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: ThreadCapture = ThreadCapture;
        static INIT: Once = Once::new();

        /// Warnings logged on the current thread while `f` runs.
        pub fn during<F: FnOnce()>(f: F) -> Vec<String> {
            INIT.call_once(|| {
                let _ = log::set_logger(&LOGGER);
                log::set_max_level(log::LevelFilter::Warn);
            });
            WARNINGS.with(|w| w.borrow_mut().clear());
            f();
            WARNINGS.with(|w| w.borrow_mut().drain(..).collect())
        }
    }

    #[rstest]
    #[case::warn_relative(BaseUrlPolicy::WarnAndRelative, None, 1)]
    #[case::derived_port(BaseUrlPolicy::derived_port(), None, 1)]
    #[case::warn_relative_with_env(BaseUrlPolicy::WarnAndRelative, Some("https://api.example.com"), 0)]
    #[case::derived_port_with_env(BaseUrlPolicy::derived_port(), Some("https://api.example.com"), 0)]
    #[case::relative_only(BaseUrlPolicy::RelativeOnly, None, 0)]
    #[case::hardcoded(BaseUrlPolicy::hardcoded(), None, 0)]
    fn bootstrap_logs_fallback_warning(
        #[case] policy: BaseUrlPolicy,
        #[case] env: Option<&str>,
        #[case] expected_warnings: usize,
    ) {
        let mut inputs = ResolverInputs::default();
        if let Some(env) = env {
            inputs = inputs.with_env(env);
        }
        let slot = BaseUrlSlot::new();

        let warnings = captured_warnings::during(|| {
            bootstrap(&policy, &inputs, &slot, |_| {});
        });

        assert_eq!(warnings.len(), expected_warnings, "{:?}", warnings);
        for warning in &warnings {
            assert!(warning.contains(API_URL_ENV_VAR), "{}", warning);
        }
    }
}
