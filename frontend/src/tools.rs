use flipfile_core::tools;
use yew::{function_component, html, Callback, Html};
use yew_router::hooks::{use_location, use_navigator};

use crate::{
    modal::ToolGrid,
    navbar::NavBar,
    route::{Route, SearchQuery, ToolQuery},
};

#[function_component(Tools)]
pub fn tools_page() -> Html {
    let navigator = use_navigator();
    let search = use_location()
        .and_then(|location| location.query::<SearchQuery>().ok())
        .and_then(|query| query.search)
        .unwrap_or_default();

    let on_pick = Callback::from(move |tool: String| {
        let Some(navigator) = &navigator else {
            return;
        };
        if let Err(error) = navigator.push_with_query(&Route::Upload, &ToolQuery { tool: Some(tool) }) {
            log::error!("failed to open tool: {:?}", error);
        }
    });

    let heading = if search.trim().is_empty() {
        "All tools".to_string()
    } else {
        format!("Tools matching \"{}\"", search.trim())
    };

    html! {
        <NavBar>
            <h2 class="text-2xl font-bold">{ heading }</h2>
            <ToolGrid tools={tools::search(&search)} {on_pick} />
        </NavBar>
    }
}
