use log::warn;
use shared::base_url::{
    BaseUrlPolicy, BaseUrlSlot, PageLocation, ResolvedBaseUrl, ResolverInputs, RuntimeConfig,
    RUNTIME_CONFIG_KEY, RUNTIME_OVERRIDE_FIELD,
};
use wasm_bindgen::JsValue;

/// Process-wide API base URL, written once during startup.
static API_BASE_URL: BaseUrlSlot = BaseUrlSlot::new();

pub struct Config;

impl Config {
    /// `VITE_API_URL` as captured when the bundle was built.
    pub fn env_api_url() -> Option<&'static str> {
        option_env!("VITE_API_URL")
    }

    /// Policy selected at build time through `API_URL_POLICY`.
    pub fn policy() -> BaseUrlPolicy {
        Self::policy_from(option_env!("API_URL_POLICY"))
    }

    pub fn policy_from(selector: Option<&str>) -> BaseUrlPolicy {
        match selector {
            None => BaseUrlPolicy::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}; using the {} policy", e, BaseUrlPolicy::default());
                BaseUrlPolicy::default()
            }),
        }
    }

    /// Gather resolver inputs from the build environment and the browser.
    pub fn resolver_inputs(policy: &BaseUrlPolicy) -> ResolverInputs {
        Self::resolver_inputs_with(
            policy,
            Self::env_api_url(),
            read_runtime_config,
            read_page_location,
        )
    }

    /// Browser state is only read when the policy will consult it and the
    /// environment value is not defined.
    pub fn resolver_inputs_with<R, L>(
        policy: &BaseUrlPolicy,
        env_api_url: Option<&str>,
        runtime_config: R,
        page_location: L,
    ) -> ResolverInputs
    where
        R: FnOnce() -> Option<RuntimeConfig>,
        L: FnOnce() -> Option<PageLocation>,
    {
        let inputs = ResolverInputs {
            env_api_url: env_api_url.map(str::to_string),
            ..ResolverInputs::default()
        };
        if !policy.consults_runtime_sources() || inputs.has_env_value() {
            return inputs;
        }
        ResolverInputs {
            runtime_config: runtime_config(),
            page_location: page_location(),
            ..inputs
        }
    }

    pub fn slot() -> &'static BaseUrlSlot {
        &API_BASE_URL
    }

    pub fn api_base_url() -> ResolvedBaseUrl {
        API_BASE_URL.current()
    }
}

/// Reads `window.__APP_CONFIG__`, if the hosting page injected one.
fn read_runtime_config() -> Option<RuntimeConfig> {
    let window = web_sys::window()?;
    let config = js_sys::Reflect::get(&window, &JsValue::from_str(RUNTIME_CONFIG_KEY)).ok()?;
    if config.is_undefined() || config.is_null() {
        return None;
    }
    let api_url = js_sys::Reflect::get(&config, &JsValue::from_str(RUNTIME_OVERRIDE_FIELD))
        .ok()
        .and_then(|value| value.as_string());
    Some(RuntimeConfig { api_url })
}

fn read_page_location() -> Option<PageLocation> {
    let location = web_sys::window()?.location();
    match (location.protocol(), location.hostname()) {
        (Ok(protocol), Ok(hostname)) => Some(PageLocation::new(protocol, hostname)),
        _ => {
            warn!("Could not read the page location");
            None
        }
    }
}
