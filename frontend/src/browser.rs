//! Browser-backed implementations of the upload flow's adapters.

use std::time::Duration;

use flipfile_core::{
    config,
    types::UploadResp,
    upload::{FileLike, Timer, Transport, UploadError},
    usage::UsageStore,
};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Date, Uint8Array};
use wasm_bindgen::JsValue;
use web_sys::{File, FormData, Storage};

#[derive(Clone, PartialEq)]
pub struct BrowserFile(pub File);

impl FileLike for BrowserFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn size(&self) -> u64 {
        self.0.size() as u64
    }
}

pub struct FetchTransport;

impl Transport for FetchTransport {
    type File = BrowserFile;

    async fn upload(
        &self,
        endpoint: &str,
        file: &BrowserFile,
        tool: &str,
    ) -> Result<UploadResp, UploadError> {
        let form = build_form(file, tool).map_err(|error| {
            UploadError::Network(format!("failed to build form data: {:?}", error))
        })?;

        let resp = Request::post(endpoint)
            .body(form)
            .send()
            .await
            .map_err(|error| UploadError::Network(error.to_string()))?;
        if !resp.ok() {
            return Err(UploadError::Status(resp.status()));
        }
        resp.json::<UploadResp>()
            .await
            .map_err(|error| UploadError::InvalidResponse(error.to_string()))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, UploadError> {
        let resp = Request::get(url)
            .send()
            .await
            .map_err(|error| UploadError::Network(error.to_string()))?;
        if !resp.ok() {
            return Err(UploadError::Status(resp.status()));
        }
        resp.binary()
            .await
            .map_err(|error| UploadError::Network(error.to_string()))
    }
}

fn build_form(file: &BrowserFile, tool: &str) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    form.append_with_blob_and_filename("file", &file.0, &file.0.name())?;
    form.append_with_str("tool", tool)?;
    Ok(form)
}

pub struct GlooTimer;

impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        TimeoutFuture::new(duration.as_millis() as u32).await;
    }
}

pub async fn sleep(duration: Duration) {
    GlooTimer.sleep(duration).await
}

/// `window.localStorage`; reads and writes are dropped when storage is
/// unavailable (private mode, disabled cookies).
pub struct LocalUsageStore(Option<Storage>);

impl LocalUsageStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("local storage is unavailable, usage counter disabled");
        }
        Self(storage)
    }
}

impl UsageStore for LocalUsageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.0 {
            if let Err(error) = storage.set_item(key, value) {
                log::error!("failed to write {} to local storage: {:?}", key, error);
            }
        }
    }
}

/// Today's calendar date as the browser formats it for the user's locale.
pub fn today() -> String {
    Date::new_0()
        .to_locale_date_string("default", &JsValue::UNDEFINED)
        .into()
}

pub fn api_base_url() -> &'static str {
    let hostname = web_sys::window()
        .and_then(|window| window.location().hostname().ok())
        .unwrap_or_default();
    config::api_base_url(&hostname)
}

pub fn redirect(location: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(error) = window.location().set_href(location) {
        log::error!("failed to redirect to {}: {:?}", location, error);
    }
}

/// Downloads `url` into memory and wraps it as a `File` named after the
/// last path segment.
pub async fn fetch_file(url: &str) -> Result<BrowserFile, String> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|error| format!("failed to fetch {url}: {error}"))?;
    if !resp.ok() {
        return Err(format!("failed to fetch {url}. status code: {}", resp.status()));
    }
    let body = resp
        .binary()
        .await
        .map_err(|error| format!("failed to read {url}: {error}"))?;

    let name = url
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("sample.pdf");
    let parts = Array::new();
    parts.push(&Uint8Array::from(body.as_slice()));
    File::new_with_u8_array_sequence(&parts, name)
        .map(BrowserFile)
        .map_err(|error| format!("failed to make {name} into a file: {:?}", error))
}
