use serde::{Deserialize, Serialize};
use yew::{html, Html};
use yew_router::Routable;

use crate::{tools::Tools, upload::Upload};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[at("/")]
    Upload,
    #[at("/tools")]
    Tools,
    #[not_found]
    #[at("/404")]
    NotFound,
}

/// `/?tool=<id>` opens the tool selector for `id` on load.
#[derive(Serialize, Deserialize)]
pub struct ToolQuery {
    pub tool: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub fn switch(route: Route) -> Html {
    match route {
        Route::Upload => html! { <Upload /> },
        Route::Tools => html! { <Tools /> },
        Route::NotFound => html! { <Upload /> },
    }
}
