use flipfile_core::tools;
use web_sys::MouseEvent;
use yew::{function_component, html, Callback, Html, Properties};

#[derive(Properties, PartialEq)]
pub struct ToolModalProps {
    pub tool: String,
    pub on_select: Callback<String>,
    pub on_cancel: Callback<()>,
}

#[function_component(ToolModal)]
pub fn tool_modal(props: &ToolModalProps) -> Html {
    let onselect = {
        let tool = props.tool.clone();
        props.on_select.reform(move |_: MouseEvent| tool.clone())
    };
    let oncancel = props.on_cancel.reform(|_: MouseEvent| ());

    html! {
        <div class="modal modal-open">
            <div class="modal-box">
                <h3 class="font-bold text-lg">{ tools::display_name(&props.tool) }</h3>
                <p class="py-4">{ "Choose a file to process with this tool." }</p>
                <div class="modal-action">
                    <button class="btn btn-primary" onclick={onselect}>{ "Select file" }</button>
                    <button class="btn" onclick={oncancel}>{ "Cancel" }</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToolGridProps {
    pub tools: Vec<&'static tools::Tool>,
    pub on_pick: Callback<String>,
}

#[function_component(ToolGrid)]
pub fn tool_grid(props: &ToolGridProps) -> Html {
    if props.tools.is_empty() {
        return html! {
            <p class="text-center opacity-70">{ "No tool matches your search." }</p>
        };
    }
    html! {
        <div class="grid grid-cols-2 md:grid-cols-4 gap-4 w-full">
            { for props.tools.iter().map(|tool| {
                let id = tool.id.to_string();
                let onclick = props.on_pick.reform(move |_: MouseEvent| id.clone());
                html! {
                    <button key={tool.id} class="card bg-base-100 shadow p-4 text-left" {onclick}>
                        <span class="font-bold">{ tool.name }</span>
                        <span class="text-sm opacity-70">{ tool.description }</span>
                    </button>
                }
            }) }
        </div>
    }
}
