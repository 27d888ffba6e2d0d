use flipfile_core::{
    config::DAILY_TASK_LIMIT,
    upload::Severity,
    usage::{self, Visit},
};
use yew::{
    function_component, html, use_effect_with_deps, use_reducer, ContextProvider, Html,
};
use yew_router::{BrowserRouter, Switch};

use crate::{
    browser::{self, LocalUsageStore},
    notification::{notify, NoticeContext, Notices, Notifications},
    route::{switch, Route},
};

#[function_component(App)]
pub fn app() -> Html {
    let notices = use_reducer(Notices::default);

    use_effect_with_deps(
        {
            let notices = notices.clone();
            move |_| {
                let visit = usage::check_visit(&LocalUsageStore::open(), &browser::today());
                if let Visit::SameDay { tasks_done } = visit {
                    log::info!("{} tasks done earlier today", tasks_done);
                }
                if visit.limit_reached() {
                    notify(
                        &notices,
                        &format!(
                            "You have used your {DAILY_TASK_LIMIT} free tasks for today"
                        ),
                        Severity::Warning,
                    );
                }
                || ()
            }
        },
        (),
    );

    html! {
        <ContextProvider<NoticeContext> context={notices.clone()}>
            <BrowserRouter>
                <Switch<Route> render={switch} />
            </BrowserRouter>
            <Notifications {notices} />
        </ContextProvider<NoticeContext>>
    }
}
