//! Pure Yew view components for the job cards UI.
//!
//! Components render from props only; all state lives in the controller.

use job_cards::config::CITY_OPTIONS;
use job_cards::render::Card;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub on_refresh: Callback<()>,
    pub on_add: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    html! {
        <header class="header">
            <h1 class="header__title">{ "Top Jobs" }</h1>
            <button id="butRefresh" class="headerButton" aria-label="Refresh"
                onclick={props.on_refresh.reform(|_| ())}></button>
            <button id="butAdd" class="headerButton" aria-label="Add"
                onclick={props.on_add.reform(|_| ())}></button>
        </header>
    }
}

#[derive(Properties, PartialEq)]
pub struct JobCardProps {
    pub card: Card,
}

/// One city's card: location, date and the top areas by ad count.
#[function_component(JobCard)]
pub fn job_card(props: &JobCardProps) -> Html {
    let card = &props.card;
    html! {
        <div class="card">
            <div class="card-last-updated" hidden={true}>{ &card.last_updated_text }</div>
            <div class="location">{ &card.label }</div>
            <div class="date">{ &card.date }</div>
            <div class="areas">
                { card.areas.iter().map(|area| html! {
                    <div class="area">{ area }</div>
                }).collect::<Html>() }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AddCityDialogProps {
    pub visible: bool,
    /// Emits `(key, label)` of the chosen city.
    pub on_confirm: Callback<(String, String)>,
    pub on_cancel: Callback<()>,
}

#[function_component(AddCityDialog)]
pub fn add_city_dialog(props: &AddCityDialogProps) -> Html {
    let select_ref = use_node_ref();

    let on_add = {
        let select_ref = select_ref.clone();
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(select) = select_ref.cast::<HtmlSelectElement>() else {
                return;
            };
            let selected = usize::try_from(select.selected_index()).ok();
            if let Some(&(key, label)) = selected.and_then(|idx| CITY_OPTIONS.get(idx)) {
                on_confirm.emit((key.to_string(), label.to_string()));
            }
        })
    };

    html! {
        <div class={classes!("dialog-container", props.visible.then_some("dialog-container--visible"))}>
            <div class="dialog">
                <div class="dialog-title">{ "Add new city" }</div>
                <div class="dialog-body">
                    <select id="selectCityToAdd" ref={select_ref}>
                        { CITY_OPTIONS.iter().map(|(key, label)| html! {
                            <option value={*key}>{ *label }</option>
                        }).collect::<Html>() }
                    </select>
                </div>
                <div class="dialog-buttons">
                    <button id="butAddCity" class="button" onclick={on_add}>{ "Add" }</button>
                    <button id="butAddCancel" class="button"
                        onclick={props.on_cancel.reform(|_| ())}>{ "Cancel" }</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LoaderProps {
    pub hidden: bool,
}

#[function_component(Loader)]
pub fn loader(props: &LoaderProps) -> Html {
    html! {
        <div class="loader" hidden={props.hidden}>
            <svg viewBox="0 0 32 32" width="32" height="32">
                <circle id="spinner" cx="16" cy="16" r="14" fill="none"></circle>
            </svg>
        </div>
    }
}
