use log::{debug, info};
use shared::base_url::bootstrap;
use wasm_bindgen::prelude::*;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::footer::Footer;
use crate::config::Config;

pub mod api;
pub mod components;
pub mod config;
pub mod version;
pub mod view;
pub mod pages {
    pub mod dashboard;
    pub mod not_found;
}

use pages::{dashboard::Dashboard, not_found::NotFound};


#[derive(Clone, Routable, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Dashboard,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    debug!("Route switch: {:?}", route);
    match route {
        Route::Dashboard => html! { <Dashboard /> },
        Route::NotFound => html! { <NotFound /> },
    }
}

#[function_component(App)]
fn app() -> Html {
    html! {
        <BrowserRouter>
            <div class="app-container">
                <main class="flex-1">
                    <Switch<Route> render={switch} />
                </main>
                <Footer />
            </div>
        </BrowserRouter>
    }
}

/// Entry point: resolve the API base URL, then mount the app exactly once.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    let policy = Config::policy();
    let inputs = Config::resolver_inputs(&policy);
    bootstrap(&policy, &inputs, Config::slot(), |_| {
        info!("Mounting application");
        yew::Renderer::<App>::new().render();
    });

    Ok(())
}
