use chrono::Utc;
use gloo_timers::callback::Interval;
use shared::dto::host::{HostDto, SettingsDto};
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::api::hosts::{fetch_hosts, fetch_settings, trigger_alert};
use crate::api::utils::{store_api_key, stored_api_key};
use crate::view::{disabled_profiles, format_last_seen, silence_timeout, status_badge_class, StatusCounts};

const REFRESH_INTERVAL_MS: u32 = 30_000;

#[derive(Clone, PartialEq)]
enum TriggerState {
    Idle,
    Sending,
    Done(String),
    Failed(String),
}

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    let hosts = use_state(Vec::<HostDto>::new);
    let settings = use_state(|| None::<SettingsDto>);
    let error = use_state(|| None::<String>);
    let loading = use_state(|| true);
    let api_key = use_state(|| stored_api_key().unwrap_or_default());
    let trigger_state = use_state(|| TriggerState::Idle);

    let reload = {
        let hosts = hosts.clone();
        let error = error.clone();
        let loading = loading.clone();
        Callback::from(move |_: ()| {
            let hosts = hosts.clone();
            let error = error.clone();
            let loading = loading.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match fetch_hosts().await {
                    Ok(list) => {
                        hosts.set(list);
                        error.set(None);
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        error.set(Some(e));
                    }
                }
                loading.set(false);
            });
        })
    };

    {
        let reload = reload.clone();
        let settings = settings.clone();
        use_effect_with((), move |_| {
            reload.emit(());
            wasm_bindgen_futures::spawn_local(async move {
                match fetch_settings().await {
                    Ok(s) => settings.set(Some(s)),
                    Err(e) => log::warn!("{}", e),
                }
            });
            let interval = Interval::new(REFRESH_INTERVAL_MS, move || reload.emit(()));
            move || drop(interval)
        });
    }

    let on_key_input = {
        let api_key = api_key.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value = input.value();
            store_api_key(&value);
            api_key.set(value);
        })
    };

    let on_trigger = {
        let trigger_state = trigger_state.clone();
        let reload = reload.clone();
        Callback::from(move |_: MouseEvent| {
            let trigger_state = trigger_state.clone();
            let reload = reload.clone();
            trigger_state.set(TriggerState::Sending);
            wasm_bindgen_futures::spawn_local(async move {
                match trigger_alert().await {
                    Ok(response) if response.sent => {
                        trigger_state.set(TriggerState::Done(format!(
                            "Alert sent for {} host(s)",
                            response.alerted_hosts
                        )));
                    }
                    Ok(response) if response.alerted_hosts == 0 => {
                        trigger_state.set(TriggerState::Done("No problematic hosts".to_string()));
                    }
                    Ok(response) => {
                        trigger_state.set(TriggerState::Failed(format!(
                            "{} host(s) need attention but the e-mail could not be sent",
                            response.alerted_hosts
                        )));
                    }
                    Err(e) => trigger_state.set(TriggerState::Failed(e)),
                }
                reload.emit(());
            });
        })
    };

    let now = Utc::now();
    let timeout = silence_timeout((*settings).as_ref().map(|s| s.alert_timeout_minutes));
    let counts = StatusCounts::from_hosts(&hosts, now, timeout);

    html! {
        <div class="dashboard">
            <header class="dashboard-header">
                <h1>{"FirewallWatch"}</h1>
                if let Some(s) = (*settings).as_ref() {
                    <p class="settings">
                        {format!(
                            "Hosts silent for more than {} min are alerted to {}",
                            s.alert_timeout_minutes, s.alert_recipient_email
                        )}
                    </p>
                }
            </header>

            <section class="summary">
                <span class={status_badge_class(shared::HostStatus::Ok)}>{format!("{} OK", counts.ok)}</span>
                <span class={status_badge_class(shared::HostStatus::AtRisk)}>{format!("{} at risk", counts.at_risk)}</span>
                <span class={status_badge_class(shared::HostStatus::Silent)}>{format!("{} silent", counts.silent)}</span>
            </section>

            <section class="alert-trigger">
                <input
                    type="password"
                    placeholder="API key"
                    value={(*api_key).clone()}
                    oninput={on_key_input}
                />
                <button
                    onclick={on_trigger}
                    disabled={api_key.is_empty() || *trigger_state == TriggerState::Sending}
                >
                    {"Send alert now"}
                </button>
                {
                    match &*trigger_state {
                        TriggerState::Idle => html! {},
                        TriggerState::Sending => html! { <span>{"Sending..."}</span> },
                        TriggerState::Done(msg) => html! { <span class="ok">{msg}</span> },
                        TriggerState::Failed(msg) => html! { <span class="error">{msg}</span> },
                    }
                }
            </section>

            if let Some(err) = (*error).as_ref() {
                <div class="error">{err}</div>
            }

            if *loading {
                <p>{"Loading hosts..."}</p>
            } else if hosts.is_empty() {
                <p>{"No agent has reported yet."}</p>
            } else {
                <table class="hosts">
                    <thead>
                        <tr>
                            <th>{"Host"}</th>
                            <th>{"IP"}</th>
                            <th>{"Status"}</th>
                            <th>{"Disabled profiles"}</th>
                            <th>{"Last heartbeat"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for hosts.iter().map(|host| {
                            let status = host.status(now, timeout);
                            let disabled = disabled_profiles(&host.profiles_status).join(", ");
                            html! {
                                <tr key={host.id.to_string()}>
                                    <td>{&host.hostname}</td>
                                    <td class="mono">{&host.ip_address}</td>
                                    <td><span class={status_badge_class(status)}>{status.label()}</span></td>
                                    <td>{disabled}</td>
                                    <td title={host.last_seen.to_rfc3339()}>{format_last_seen(host.last_seen, now)}</td>
                                </tr>
                            }
                        }) }
                    </tbody>
                </table>
            }
        </div>
    }
}
