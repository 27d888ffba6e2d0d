use std::rc::Rc;

use flipfile_core::{
    config::{DEFAULT_TOOL, SAMPLE_FILE_URL},
    tools,
    upload::{run_upload, Severity, UploadContext, UploadFlow, UploadView},
    usage,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{DragEvent, Event, HtmlInputElement, MouseEvent};
use yew::{
    function_component, html, use_context, use_effect_with_deps, use_memo, use_node_ref,
    use_reducer, use_state, Callback, Html, NodeRef, Reducible, TargetCast, UseReducerHandle,
};
use yew_router::hooks::use_location;

use crate::{
    browser::{self, BrowserFile, FetchTransport, GlooTimer, LocalUsageStore},
    download::{self, DownloadAnchor},
    modal::{ToolGrid, ToolModal},
    navbar::NavBar,
    notification::{notify, NoticeContext},
    route::ToolQuery,
};

#[derive(Clone, PartialEq)]
pub enum Phase {
    DropZone,
    Progress {
        file_name: String,
        percent: u8,
        done: bool,
    },
}

pub enum PhaseAction {
    Start(String),
    Progress(u8),
    Done,
    Reset,
}

#[derive(PartialEq)]
pub struct UploadUi {
    pub phase: Phase,
}

impl Default for UploadUi {
    fn default() -> Self {
        Self {
            phase: Phase::DropZone,
        }
    }
}

impl UploadUi {
    /// An upload is running or its result is about to be downloaded.
    pub fn is_busy(&self) -> bool {
        !matches!(self.phase, Phase::DropZone)
    }
}

impl Reducible for UploadUi {
    type Action = PhaseAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let phase = match (action, self.phase.clone()) {
            (PhaseAction::Start(file_name), _) => Phase::Progress {
                file_name,
                percent: 0,
                done: false,
            },
            (PhaseAction::Progress(percent), Phase::Progress { file_name, done, .. }) => {
                Phase::Progress {
                    file_name,
                    percent,
                    done,
                }
            }
            (PhaseAction::Done, Phase::Progress { file_name, .. }) => Phase::Progress {
                file_name,
                percent: 100,
                done: true,
            },
            (PhaseAction::Reset, _) => Phase::DropZone,
            // progress ticks arriving after a reset are stale
            (_, Phase::DropZone) => return self,
        };
        Rc::new(Self { phase })
    }
}

/// The page as seen by the upload flow.
#[derive(Clone)]
struct PageView {
    ui: UseReducerHandle<UploadUi>,
    notices: NoticeContext,
    anchor: NodeRef,
}

impl UploadView for PageView {
    fn show_progress(&self, file_name: &str) {
        self.ui.dispatch(PhaseAction::Start(file_name.to_string()));
    }

    fn set_progress(&self, percent: u8) {
        self.ui.dispatch(PhaseAction::Progress(percent));
    }

    fn show_done(&self, _file_name: &str) {
        self.ui.dispatch(PhaseAction::Done);
    }

    fn save_file(&self, data: Vec<u8>, file_name: &str) {
        download::trigger(&self.anchor, &data, file_name);
        notify(&self.notices, "Download started", Severity::Success);
    }

    fn restore_drop_zone(&self) {
        self.ui.dispatch(PhaseAction::Reset);
    }

    fn notify(&self, message: &str, severity: Severity) {
        notify(&self.notices, message, severity);
    }
}

fn open_file_dialog(input_ref: &NodeRef) {
    match input_ref.cast::<HtmlInputElement>() {
        Some(input) => input.click(),
        None => log::error!("failed to get file input ref"),
    }
}

#[function_component(Upload)]
pub fn upload() -> Html {
    let notices = use_context::<NoticeContext>().expect("notices context is provided by App");
    let ui = use_reducer(UploadUi::default);
    let flow = use_memo(|_| UploadFlow::default(), ());
    let hovering = use_state(|| false);
    let modal_tool = use_state::<Option<String>, _>(|| None);
    let active_tool = use_state(|| DEFAULT_TOOL.to_string());
    let input_ref = use_node_ref();
    let anchor_ref = use_node_ref();
    let requested_tool = use_location()
        .and_then(|location| location.query::<ToolQuery>().ok())
        .and_then(|query| query.tool);

    use_effect_with_deps(
        {
            let modal_tool = modal_tool.clone();
            move |requested_tool: &Option<String>| {
                if let Some(tool) = requested_tool {
                    modal_tool.set(Some(tool.clone()));
                }
                || ()
            }
        },
        requested_tool,
    );

    let start = {
        let view = PageView {
            ui: ui.clone(),
            notices: notices.clone(),
            anchor: anchor_ref.clone(),
        };
        let flow = flow.clone();
        let tool = (*active_tool).clone();
        Callback::from(move |file: Option<BrowserFile>| {
            let view = view.clone();
            let flow = flow.clone();
            let tool = tool.clone();
            spawn_local(async move {
                let ctx = UploadContext {
                    transport: FetchTransport,
                    view,
                    timer: GlooTimer,
                    api_base_url: browser::api_base_url().to_string(),
                };
                if run_upload(&flow, &ctx, file.as_ref(), &tool).await.is_ok() {
                    let done = usage::record_task(&LocalUsageStore::open(), &browser::today());
                    log::info!("{} tasks done today", done);
                }
            });
        })
    };

    let on_file_change = {
        let start = start.clone();
        move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let file = input
                .files()
                .and_then(|files| files.get(0))
                .map(BrowserFile);
            // let the same file be picked again later
            input.set_value("");
            start.emit(file);
        }
    };

    let ondragover = {
        let hovering = hovering.clone();
        move |e: DragEvent| {
            e.prevent_default();
            hovering.set(true);
        }
    };
    let ondragleave = {
        let hovering = hovering.clone();
        move |_: DragEvent| hovering.set(false)
    };
    let ondrop = {
        let hovering = hovering.clone();
        let start = start.clone();
        move |e: DragEvent| {
            e.prevent_default();
            hovering.set(false);
            let file = e
                .data_transfer()
                .and_then(|transfer| transfer.files())
                .and_then(|files| files.get(0))
                .map(BrowserFile);
            start.emit(file);
        }
    };
    let on_browse = {
        let input_ref = input_ref.clone();
        move |_: MouseEvent| open_file_dialog(&input_ref)
    };

    let on_sample = {
        let notices = notices.clone();
        let start = start.clone();
        move |_: MouseEvent| {
            let notices = notices.clone();
            let start = start.clone();
            spawn_local(async move {
                match browser::fetch_file(SAMPLE_FILE_URL).await {
                    Ok(file) => start.emit(Some(file)),
                    Err(error) => {
                        log::error!("{}", error);
                        notify(&notices, "Could not load the sample file", Severity::Error);
                    }
                }
            });
        }
    };

    let on_pick = {
        let modal_tool = modal_tool.clone();
        Callback::from(move |tool: String| modal_tool.set(Some(tool)))
    };
    let on_select = {
        let modal_tool = modal_tool.clone();
        let active_tool = active_tool.clone();
        let input_ref = input_ref.clone();
        Callback::from(move |tool: String| {
            active_tool.set(tool);
            modal_tool.set(None);
            open_file_dialog(&input_ref);
        })
    };
    let on_cancel = {
        let modal_tool = modal_tool.clone();
        Callback::from(move |_: ()| modal_tool.set(None))
    };

    let body = match &ui.phase {
        Phase::DropZone => {
            let zone_class = if *hovering {
                "border-4 border-dashed border-primary rounded-box p-12 w-full max-w-xl text-center cursor-pointer bg-base-100"
            } else {
                "border-4 border-dashed border-gray-400 rounded-box p-12 w-full max-w-xl text-center cursor-pointer"
            };
            html! {
                <div class={zone_class} {ondragover} {ondragleave} {ondrop} onclick={on_browse}>
                    <p class="text-lg">{ "Drop a file here or click to browse" }</p>
                    <p class="text-sm opacity-70">{ tools::display_name(&active_tool) }</p>
                </div>
            }
        }
        Phase::Progress {
            file_name,
            percent,
            done,
        } => {
            let status = if *done {
                "Done! Your download will start shortly.".to_string()
            } else {
                format!("Uploading {file_name}...")
            };
            html! {
                <div class="w-full max-w-xl">
                    <progress class="progress w-full" value={percent.to_string()} max="100" />
                    <div class="w-full mt-4 text-center">{ status }</div>
                </div>
            }
        }
    };

    let modal = if let Some(tool) = &*modal_tool {
        html! { <ToolModal tool={tool.clone()} {on_select} {on_cancel} /> }
    } else {
        html! { <></> }
    };

    html! {
        <NavBar>
            {body}
            <button class="btn btn-outline btn-sm" onclick={on_sample} disabled={ui.is_busy()}>
                { "Try with a sample PDF" }
            </button>
            <ToolGrid tools={tools::search("")} {on_pick} />
            <input type="file" class="hidden" ref={input_ref} onchange={on_file_change} />
            {modal}
            <DownloadAnchor anchor={anchor_ref} />
        </NavBar>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(ui: Rc<UploadUi>, action: PhaseAction) -> Rc<UploadUi> {
        ui.reduce(action)
    }

    #[test]
    fn busy_follows_the_phase() {
        let ui = Rc::new(UploadUi::default());
        assert!(!ui.is_busy());

        let ui = apply(ui, PhaseAction::Start("report.pdf".to_string()));
        assert!(ui.is_busy());
        let ui = apply(ui, PhaseAction::Done);
        assert!(ui.is_busy());

        let ui = apply(ui, PhaseAction::Reset);
        assert!(!ui.is_busy());
    }

    #[test]
    fn stale_progress_after_reset_is_ignored() {
        let ui = apply(
            Rc::new(UploadUi::default()),
            PhaseAction::Start("report.pdf".to_string()),
        );
        let ui = apply(ui, PhaseAction::Reset);

        let ui = apply(ui, PhaseAction::Progress(40));
        assert!(ui.phase == Phase::DropZone);
        assert!(!ui.is_busy());
    }
}
