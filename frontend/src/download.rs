use js_sys::{Array, Uint8Array};
use web_sys::{Blob, HtmlAnchorElement, Url};
use yew::{function_component, html, Html, NodeRef, Properties};

#[derive(Properties, PartialEq)]
pub struct DownloadAnchorProps {
    pub anchor: NodeRef,
}

/// Hidden `<a>` the upload flow clicks to hand the result to the browser.
#[function_component(DownloadAnchor)]
pub fn download_anchor(props: &DownloadAnchorProps) -> Html {
    html! {
        <a class="hidden" ref={props.anchor.clone()}></a>
    }
}

/// Saves `data` as `file_name` through an object url, so the name holds
/// even when the API lives on another origin.
pub fn trigger(anchor: &NodeRef, data: &[u8], file_name: &str) {
    let a = match anchor.cast::<HtmlAnchorElement>() {
        Some(a) => a,
        None => {
            log::error!("failed to get download anchor");
            return;
        }
    };

    let blob_parts = Array::new();
    blob_parts.push(&Uint8Array::from(data));
    let blob = match Blob::new_with_u8_array_sequence(&blob_parts) {
        Ok(blob) => blob,
        Err(err) => {
            log::error!("failed to make data into blob: {:?}", err);
            return;
        }
    };
    let obj_url = match Url::create_object_url_with_blob(&blob) {
        Ok(u) => u,
        Err(err) => {
            log::error!("failed to make blob into object url: {:?}", err);
            return;
        }
    };

    a.set_href(&obj_url);
    a.set_download(file_name);
    a.click();

    // release the blob once the click has been dispatched
    if let Err(e) = Url::revoke_object_url(&obj_url) {
        log::error!("failed to revoke object url: {:?}", e);
    }
}
