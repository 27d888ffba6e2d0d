//! The upload lifecycle, independent of the browser.
//!
//! `run_upload` drives one file through validation, the multipart request,
//! the progress animation and the download, talking to the page only through
//! the adapters in [`UploadContext`].

use std::{cell::RefCell, time::Duration};

use bytesize::ByteSize;
use futures_util::{
    future::{self, Either},
    pin_mut,
};
use url::Url;

use crate::{
    config::{DOWNLOAD_DELAY, MAX_FILE_SIZE, PROGRESS_CAP, PROGRESS_STEP, PROGRESS_TICK},
    types::UploadResp,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("no file selected")]
    NoFile,
    #[error("file is {size} bytes, limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },
    #[error("an upload is already in progress")]
    Busy,
    #[error("request failed: {0}")]
    Network(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("invalid server response: {0}")]
    InvalidResponse(String),
}

impl UploadError {
    /// Text shown to the user in the error notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoFile => "Please select a file".to_string(),
            Self::TooLarge { max, .. } => format!(
                "File too large. Max {}",
                ByteSize(*max).to_string_as(true)
            ),
            Self::Busy => "Please wait for the current upload to finish".to_string(),
            Self::Network(_) | Self::Status(_) | Self::InvalidResponse(_) => {
                "Upload failed. Please try again.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

pub trait FileLike {
    fn name(&self) -> String;
    fn size(&self) -> u64;
}

#[allow(async_fn_in_trait)]
pub trait Transport {
    type File: FileLike;

    /// Posts `file` and `tool` as multipart form fields to `endpoint`.
    async fn upload(
        &self,
        endpoint: &str,
        file: &Self::File,
        tool: &str,
    ) -> Result<UploadResp, UploadError>;

    /// Fetches the processed file so it can be saved under a name of our choosing.
    async fn download(&self, url: &str) -> Result<Vec<u8>, UploadError>;
}

#[allow(async_fn_in_trait)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

pub trait UploadView {
    /// Swaps the drop zone for the progress indicator.
    fn show_progress(&self, file_name: &str);
    fn set_progress(&self, percent: u8);
    fn show_done(&self, file_name: &str);
    /// Hands the downloaded bytes to the user as `file_name`.
    fn save_file(&self, data: Vec<u8>, file_name: &str);
    fn restore_drop_zone(&self);
    fn notify(&self, message: &str, severity: Severity);
}

pub struct UploadContext<T, V, C> {
    pub transport: T,
    pub view: V,
    pub timer: C,
    pub api_base_url: String,
}

impl<T, V, C> UploadContext<T, V, C> {
    pub fn endpoint(&self) -> String {
        crate::config::upload_endpoint(&self.api_base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading { file_name: String },
    Succeeded { file_name: String, download_url: String },
    Failed(UploadError),
}

/// Holds the lifecycle state and enforces one upload at a time.
#[derive(Debug)]
pub struct UploadFlow {
    state: RefCell<UploadState>,
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self {
            state: RefCell::new(UploadState::Idle),
        }
    }
}

impl UploadFlow {
    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        !matches!(*self.state.borrow(), UploadState::Idle)
    }

    pub fn begin(&self, file_name: &str) -> Result<(), UploadError> {
        if self.is_busy() {
            return Err(UploadError::Busy);
        }
        self.set(UploadState::Uploading {
            file_name: file_name.to_string(),
        });
        Ok(())
    }

    fn set(&self, state: UploadState) {
        *self.state.borrow_mut() = state;
    }

    fn reset(&self) {
        self.set(UploadState::Idle);
    }
}

pub fn validate<F: FileLike>(file: Option<&F>) -> Result<&F, UploadError> {
    let file = file.ok_or(UploadError::NoFile)?;
    let size = file.size();
    if size >= MAX_FILE_SIZE {
        return Err(UploadError::TooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }
    Ok(file)
}

/// Resolves the server's (usually relative) download link against the API.
pub fn resolve_download_url(api_base_url: &str, download_url: &str) -> Result<String, UploadError> {
    let base = Url::parse(api_base_url)
        .map_err(|error| UploadError::InvalidResponse(format!("bad API base url: {error}")))?;
    base.join(download_url)
        .map(String::from)
        .map_err(|error| UploadError::InvalidResponse(format!("bad download url: {error}")))
}

/// Cosmetic progress: climbs to the cap on a fixed timer and stays there.
async fn animate_progress(view: &impl UploadView, timer: &impl Timer) {
    let mut percent = 0u8;
    while percent < PROGRESS_CAP {
        timer.sleep(PROGRESS_TICK).await;
        percent = percent.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
        view.set_progress(percent);
    }
    future::pending::<()>().await;
}

pub async fn run_upload<T, V, C>(
    flow: &UploadFlow,
    ctx: &UploadContext<T, V, C>,
    file: Option<&T::File>,
    tool: &str,
) -> Result<UploadResp, UploadError>
where
    T: Transport,
    V: UploadView,
    C: Timer,
{
    let file = match validate(file).and_then(|file| flow.begin(&file.name()).map(|_| file)) {
        Ok(file) => file,
        Err(error) => {
            ctx.view.notify(&error.user_message(), Severity::Error);
            return Err(error);
        }
    };
    let file_name = file.name();

    ctx.view.show_progress(&file_name);
    ctx.view.set_progress(0);

    let endpoint = ctx.endpoint();
    let request = ctx.transport.upload(&endpoint, file, tool);
    let ticker = animate_progress(&ctx.view, &ctx.timer);
    pin_mut!(request, ticker);
    let result = match future::select(request, ticker).await {
        Either::Left((result, _)) => result,
        Either::Right(((), request)) => request.await,
    };

    let result = result.and_then(|resp| {
        let download_url = resolve_download_url(&ctx.api_base_url, &resp.download_url)?;
        Ok((resp, download_url))
    });

    let outcome = match result {
        Ok((resp, download_url)) => {
            ctx.view.set_progress(100);
            ctx.view.show_done(&file_name);
            flow.set(UploadState::Succeeded {
                file_name: file_name.clone(),
                download_url: download_url.clone(),
            });

            ctx.timer.sleep(DOWNLOAD_DELAY).await;
            ctx.transport
                .download(&download_url)
                .await
                .map(|data| (resp, data))
        }
        Err(error) => Err(error),
    };

    match outcome {
        Ok((resp, data)) => {
            ctx.view.save_file(data, &file_name);
            ctx.view.restore_drop_zone();
            flow.reset();
            Ok(resp)
        }
        Err(error) => {
            log::error!("upload of {} failed: {}", file_name, error);
            flow.set(UploadState::Failed(error.clone()));
            ctx.view.restore_drop_zone();
            ctx.view.notify(&error.user_message(), Severity::Error);
            flow.reset();
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    struct FakeFile {
        name: &'static str,
        size: u64,
    }

    impl FileLike for FakeFile {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn size(&self) -> u64 {
            self.size
        }
    }

    struct FakeTransport {
        calls: RefCell<Vec<(String, String, String)>>,
        answer: Result<UploadResp, UploadError>,
        yields: usize,
        downloads: RefCell<Vec<String>>,
        fetched: Result<Vec<u8>, UploadError>,
    }

    impl FakeTransport {
        fn answering(answer: Result<UploadResp, UploadError>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                answer,
                yields: 0,
                downloads: RefCell::new(Vec::new()),
                fetched: Ok(b"%PDF-1.4".to_vec()),
            }
        }
    }

    impl Transport for FakeTransport {
        type File = FakeFile;

        async fn upload(
            &self,
            endpoint: &str,
            file: &FakeFile,
            tool: &str,
        ) -> Result<UploadResp, UploadError> {
            self.calls
                .borrow_mut()
                .push((endpoint.to_string(), file.name(), tool.to_string()));
            for _ in 0..self.yields {
                tokio::task::yield_now().await;
            }
            self.answer.clone()
        }

        async fn download(&self, url: &str) -> Result<Vec<u8>, UploadError> {
            self.downloads.borrow_mut().push(url.to_string());
            self.fetched.clone()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Progress(u8),
        ShowProgress(String),
        Done(String),
        Save(Vec<u8>, String),
        Restore,
        Notify(String, Severity),
    }

    #[derive(Default)]
    struct RecordingView(RefCell<Vec<Event>>);

    impl RecordingView {
        fn events(&self) -> Vec<Event> {
            self.0.borrow().clone()
        }

        fn progress(&self) -> Vec<u8> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    Event::Progress(percent) => Some(percent),
                    _ => None,
                })
                .collect()
        }
    }

    impl UploadView for RecordingView {
        fn show_progress(&self, file_name: &str) {
            self.0.borrow_mut().push(Event::ShowProgress(file_name.to_string()));
        }

        fn set_progress(&self, percent: u8) {
            self.0.borrow_mut().push(Event::Progress(percent));
        }

        fn show_done(&self, file_name: &str) {
            self.0.borrow_mut().push(Event::Done(file_name.to_string()));
        }

        fn save_file(&self, data: Vec<u8>, file_name: &str) {
            self.0
                .borrow_mut()
                .push(Event::Save(data, file_name.to_string()));
        }

        fn restore_drop_zone(&self) {
            self.0.borrow_mut().push(Event::Restore);
        }

        fn notify(&self, message: &str, severity: Severity) {
            self.0
                .borrow_mut()
                .push(Event::Notify(message.to_string(), severity));
        }
    }

    #[derive(Default)]
    struct InstantTimer(Cell<usize>);

    impl Timer for InstantTimer {
        async fn sleep(&self, _duration: Duration) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn ok_resp() -> Result<UploadResp, UploadError> {
        Ok(UploadResp::success(
            "abc".to_string(),
            "report.pdf".to_string(),
            "abc_processed.pdf".to_string(),
            1024,
        ))
    }

    fn context(transport: FakeTransport) -> UploadContext<FakeTransport, RecordingView, InstantTimer> {
        UploadContext {
            transport,
            view: RecordingView::default(),
            timer: InstantTimer::default(),
            api_base_url: "http://localhost:8000".to_string(),
        }
    }

    fn report() -> FakeFile {
        FakeFile {
            name: "report.pdf",
            size: 1024,
        }
    }

    #[tokio::test]
    async fn small_file_is_posted_once() {
        let ctx = context(FakeTransport::answering(ok_resp()));
        let flow = UploadFlow::default();

        run_upload(&flow, &ctx, Some(&report()), "compress")
            .await
            .unwrap();

        let calls = ctx.transport.calls.borrow();
        assert_eq!(
            *calls,
            vec![(
                "http://localhost:8000/upload".to_string(),
                "report.pdf".to_string(),
                "compress".to_string()
            )]
        );
        assert_eq!(flow.state(), UploadState::Idle);
    }

    #[tokio::test]
    async fn success_downloads_with_original_name() {
        let ctx = context(FakeTransport::answering(ok_resp()));
        let flow = UploadFlow::default();

        run_upload(&flow, &ctx, Some(&report()), "split")
            .await
            .unwrap();

        let events = ctx.view.events();
        assert_eq!(events.first(), Some(&Event::ShowProgress("report.pdf".to_string())));
        assert!(events.contains(&Event::Save(
            b"%PDF-1.4".to_vec(),
            "report.pdf".to_string()
        )));
        assert_eq!(
            *ctx.transport.downloads.borrow(),
            vec!["http://localhost:8000/download/abc_processed.pdf".to_string()]
        );
        assert_eq!(events.last(), Some(&Event::Restore));
        assert_eq!(ctx.view.progress().last(), Some(&100));
        assert_eq!(ctx.transport.calls.borrow()[0].2, "split");
    }

    #[tokio::test]
    async fn oversized_file_never_hits_the_network() {
        let ctx = context(FakeTransport::answering(ok_resp()));
        let flow = UploadFlow::default();
        let big = FakeFile {
            name: "big.pdf",
            size: MAX_FILE_SIZE,
        };

        let error = run_upload(&flow, &ctx, Some(&big), "compress")
            .await
            .unwrap_err();

        assert_eq!(
            error,
            UploadError::TooLarge {
                size: MAX_FILE_SIZE,
                max: MAX_FILE_SIZE
            }
        );
        assert!(ctx.transport.calls.borrow().is_empty());
        assert!(matches!(
            ctx.view.events().as_slice(),
            [Event::Notify(_, Severity::Error)]
        ));
        assert_eq!(flow.state(), UploadState::Idle);
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let ctx = context(FakeTransport::answering(ok_resp()));
        let flow = UploadFlow::default();

        let error = run_upload(&flow, &ctx, None, "compress").await.unwrap_err();

        assert_eq!(error, UploadError::NoFile);
        assert!(ctx.transport.calls.borrow().is_empty());
        assert_eq!(
            ctx.view.events(),
            vec![Event::Notify("Please select a file".to_string(), Severity::Error)]
        );
    }

    #[tokio::test]
    async fn error_status_restores_drop_zone_without_download() {
        let ctx = context(FakeTransport::answering(Err(UploadError::Status(500))));
        let flow = UploadFlow::default();

        let error = run_upload(&flow, &ctx, Some(&report()), "compress")
            .await
            .unwrap_err();

        assert_eq!(error, UploadError::Status(500));
        let events = ctx.view.events();
        assert!(!events.iter().any(|event| matches!(event, Event::Save(..))));
        assert!(ctx.transport.downloads.borrow().is_empty());
        assert!(events.contains(&Event::Restore));
        assert!(matches!(events.last(), Some(Event::Notify(_, Severity::Error))));
        assert_eq!(flow.state(), UploadState::Idle);
    }

    #[tokio::test]
    async fn saved_name_ignores_server_file_name() {
        let mut transport = FakeTransport::answering(Ok(UploadResp::success(
            "f00d".to_string(),
            "Quarterly Report.pdf".to_string(),
            "f00d_processed.pdf".to_string(),
            2048,
        )));
        transport.fetched = Ok(vec![1, 2, 3]);
        let mut ctx = context(transport);
        ctx.api_base_url = "https://api.flipfile.online".to_string();
        let flow = UploadFlow::default();
        let file = FakeFile {
            name: "Quarterly Report.pdf",
            size: 2048,
        };

        run_upload(&flow, &ctx, Some(&file), "compress")
            .await
            .unwrap();

        assert_eq!(
            *ctx.transport.downloads.borrow(),
            vec!["https://api.flipfile.online/download/f00d_processed.pdf".to_string()]
        );
        let saved = ctx
            .view
            .events()
            .into_iter()
            .find_map(|event| match event {
                Event::Save(data, name) => Some((data, name)),
                _ => None,
            });
        assert_eq!(saved, Some((vec![1, 2, 3], "Quarterly Report.pdf".to_string())));
    }

    #[tokio::test]
    async fn failed_download_is_reported_without_saving() {
        let mut transport = FakeTransport::answering(ok_resp());
        transport.fetched = Err(UploadError::Status(410));
        let ctx = context(transport);
        let flow = UploadFlow::default();

        let error = run_upload(&flow, &ctx, Some(&report()), "compress")
            .await
            .unwrap_err();

        assert_eq!(error, UploadError::Status(410));
        let events = ctx.view.events();
        assert!(events.contains(&Event::Done("report.pdf".to_string())));
        assert!(!events.iter().any(|event| matches!(event, Event::Save(..))));
        assert!(events.contains(&Event::Restore));
        assert!(matches!(events.last(), Some(Event::Notify(_, Severity::Error))));
        assert_eq!(flow.state(), UploadState::Idle);
    }

    #[tokio::test]
    async fn second_upload_while_busy_is_refused() {
        let ctx = context(FakeTransport::answering(ok_resp()));
        let flow = UploadFlow::default();
        flow.begin("first.pdf").unwrap();

        let error = run_upload(&flow, &ctx, Some(&report()), "compress")
            .await
            .unwrap_err();

        assert_eq!(error, UploadError::Busy);
        assert!(ctx.transport.calls.borrow().is_empty());
        assert_eq!(
            flow.state(),
            UploadState::Uploading {
                file_name: "first.pdf".to_string()
            }
        );
    }

    #[tokio::test]
    async fn progress_is_capped_until_request_settles() {
        let mut transport = FakeTransport::answering(ok_resp());
        transport.yields = 3;
        let ctx = context(transport);
        let flow = UploadFlow::default();

        run_upload(&flow, &ctx, Some(&report()), "compress")
            .await
            .unwrap();

        let progress = ctx.view.progress();
        let (last, before) = progress.split_last().unwrap();
        assert_eq!(*last, 100);
        assert_eq!(before.iter().max(), Some(&PROGRESS_CAP));
        assert!(before.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn relative_and_absolute_download_urls_resolve() {
        assert_eq!(
            resolve_download_url("https://api.flipfile.online", "/download/a.pdf").unwrap(),
            "https://api.flipfile.online/download/a.pdf"
        );
        assert_eq!(
            resolve_download_url("http://localhost:8000", "https://cdn.example.com/a.pdf")
                .unwrap(),
            "https://cdn.example.com/a.pdf"
        );
        assert!(resolve_download_url("not a url", "/download/a.pdf").is_err());
    }

    #[test]
    fn just_under_the_limit_is_accepted() {
        let file = FakeFile {
            name: "edge.pdf",
            size: MAX_FILE_SIZE - 1,
        };
        assert!(validate(Some(&file)).is_ok());
    }
}
