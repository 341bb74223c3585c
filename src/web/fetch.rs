use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, window};

/// Single GET of a static text resource. No retry, no timeout.
pub(crate) async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let opts = RequestInit::new();
    opts.set_method("GET");
    let request = Request::new_with_str_and_init(url, &opts)?;

    let resp: Response = JsFuture::from(win.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("{} returned HTTP {}", url, resp.status())));
    }
    JsFuture::from(resp.text()?)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}
