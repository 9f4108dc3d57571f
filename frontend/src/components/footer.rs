use crate::api::version::{fetch_backend_version, BackendVersion};
use crate::config::Config;
use crate::version::Version;
use yew::prelude::*;

#[function_component(Footer)]
pub fn footer() -> Html {
    let backend = use_state(|| None::<BackendVersion>);
    let error = use_state(|| None::<String>);

    {
        let backend = backend.clone();
        let error = error.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match fetch_backend_version().await {
                    Ok(info) => backend.set(Some(info)),
                    Err(e) => error.set(Some(e)),
                }
            });
        });
    }

    html! {
        <footer class="footer">
            <span>{"Dashboard "}{Version::label()}</span>
            {
                match ((*backend).as_ref(), (*error).as_ref()) {
                    (Some(info), _) => html! {
                        <span>{format!(" · API v{} ({})", info.version, info.environment)}</span>
                    },
                    (None, Some(err)) => html! { <span class="error">{format!(" · {}", err)}</span> },
                    (None, None) => html! {},
                }
            }
            <span class="mono">{format!(" · {}", Config::api_base_url())}</span>
        </footer>
    }
}
