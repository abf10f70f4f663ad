//! Job cards front-end using Yew.
//! Wires the controller hook to the header, card list and add-city dialog.

use job_cards::CityKey;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

mod components;
mod hooks;

use components::{AddCityDialog, Header, JobCard, Loader};
use hooks::use_job_controller;

/// Primary application component.
#[function_component(App)]
fn app() -> Html {
    let controller = use_job_controller();

    let (is_loading, dialog_visible, cards) = {
        let view = controller.view();
        (view.is_loading(), view.add_dialog_visible(), view.cards().to_vec())
    };

    let on_refresh = {
        let controller = controller.clone();
        Callback::from(move |_| spawn_local(controller.refresh_all_visible()))
    };

    let on_add = {
        let controller = controller.clone();
        Callback::from(move |_| controller.toggle_add_dialog(true))
    };

    let on_confirm = {
        let controller = controller.clone();
        Callback::from(move |(key, label): (String, String)| {
            spawn_local(controller.add_city(CityKey::new(key), &label));
            controller.toggle_add_dialog(false);
        })
    };

    let on_cancel = {
        let controller = controller.clone();
        Callback::from(move |_| controller.toggle_add_dialog(false))
    };

    html! {
        <>
            <Header {on_refresh} {on_add} />
            <Loader hidden={!is_loading} />
            <main class="main" hidden={is_loading}>
                { cards.into_iter().map(|card| {
                    let key = card.key.to_string();
                    html! { <JobCard key={key} {card} /> }
                }).collect::<Html>() }
            </main>
            <AddCityDialog visible={dialog_visible} {on_confirm} {on_cancel} />
        </>
    }
}

/// Entry point: installs the panic hook and renders the app.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
