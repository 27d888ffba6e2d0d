use std::{collections::VecDeque, rc::Rc};

use flipfile_core::{config::NOTIFICATION_TTL, upload::Severity};
use wasm_bindgen_futures::spawn_local;
use yew::{function_component, html, Html, Properties, Reducible, UseReducerHandle};

use crate::browser;

#[derive(Clone, PartialEq)]
pub struct Notice {
    pub id: usize,
    pub message: String,
    pub severity: Severity,
}

pub enum NoticeAction {
    Push { message: String, severity: Severity },
    Expire,
}

#[derive(Default, PartialEq)]
pub struct Notices {
    next_id: usize,
    pub shown: VecDeque<Notice>,
}

impl Reducible for Notices {
    type Action = NoticeAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut shown = self.shown.clone();
        let mut next_id = self.next_id;
        match action {
            NoticeAction::Push { message, severity } => {
                shown.push_back(Notice {
                    id: next_id,
                    message,
                    severity,
                });
                next_id += 1;
            }
            // every notice lives for the same time, so the oldest expires first
            NoticeAction::Expire => {
                shown.pop_front();
            }
        }
        Rc::new(Self { next_id, shown })
    }
}

pub type NoticeContext = UseReducerHandle<Notices>;

/// Shows `message` and schedules its removal.
pub fn notify(notices: &NoticeContext, message: &str, severity: Severity) {
    notices.dispatch(NoticeAction::Push {
        message: message.to_string(),
        severity,
    });
    let notices = notices.clone();
    spawn_local(async move {
        browser::sleep(NOTIFICATION_TTL).await;
        notices.dispatch(NoticeAction::Expire);
    });
}

fn alert_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "alert alert-info",
        Severity::Success => "alert alert-success",
        Severity::Warning => "alert alert-warning",
        Severity::Error => "alert alert-error",
    }
}

#[derive(Properties, PartialEq)]
pub struct NotificationsProps {
    pub notices: NoticeContext,
}

#[function_component(Notifications)]
pub fn notifications(props: &NotificationsProps) -> Html {
    html! {
        <div class="toast toast-top toast-end z-50">
            { for props.notices.shown.iter().map(|notice| html! {
                <div key={notice.id} class={alert_class(notice.severity)} data-severity={notice.severity.as_str()}>
                    <span>{ &notice.message }</span>
                </div>
            }) }
        </div>
    }
}
