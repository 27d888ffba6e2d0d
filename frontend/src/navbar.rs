use flipfile_core::tools;
use web_sys::{HtmlInputElement, SubmitEvent};
use yew::{function_component, html, use_node_ref, Callback, Children, Html, Properties};

use crate::browser;

#[derive(Properties, PartialEq)]
pub struct NavBarProps {
    pub children: Children,
}

#[function_component(NavBar)]
pub fn navbar(props: &NavBarProps) -> Html {
    let search_ref = use_node_ref();

    let onsubmit = {
        let search_ref = search_ref.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(input) = search_ref.cast::<HtmlInputElement>() else {
                return;
            };
            if let Some(location) = tools::search_location(&input.value()) {
                browser::redirect(&location);
            }
        })
    };

    html! {
        <>
            <div class="bg-gray-100">
                <div class="container mx-auto navbar">
                    <div class="flex-1">
                        <a href="/" class="font-bold normal-case text-xl">{ "FlipFile" }</a>
                    </div>
                    <form class="flex-none" {onsubmit}>
                        <input
                            type="search"
                            placeholder="Search tools"
                            class="input input-bordered input-sm"
                            ref={search_ref}
                        />
                    </form>
                </div>
            </div>
            <div class="min-h-[calc(100vh-4rem)] w-full bg-gray-200 flex flex-col items-center justify-center gap-8 p-8">
                { for props.children.iter() }
            </div>
        </>
    }
}
