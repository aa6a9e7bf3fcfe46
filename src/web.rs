//! Browser host: reduced-motion query, canvas mount, visibility listener and boot.

use std::sync::mpsc::{self, Sender};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement, Window};

use crate::app::BackgroundApp;
use crate::background::Background;
use crate::config::BackgroundConfig;
use crate::error::{BackgroundError, BackgroundResult};
use crate::platform::{Host, HostEvent};
use crate::scene::SurfaceStyle;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

fn js_error(err: JsValue) -> BackgroundError {
    BackgroundError::renderer(format!("{err:?}"))
}

pub struct WebHost {
    window: Window,
    document: Document,
    canvas: Option<HtmlCanvasElement>,
}

impl WebHost {
    pub fn new() -> BackgroundResult<Self> {
        let window = web_sys::window().ok_or(BackgroundError::MissingAnchor)?;
        let document = window.document().ok_or(BackgroundError::MissingAnchor)?;
        Ok(Self {
            window,
            document,
            canvas: None,
        })
    }

    /// The mounted canvas, if any
    pub fn canvas(&self) -> Option<&HtmlCanvasElement> {
        self.canvas.as_ref()
    }

    pub fn unmount(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            canvas.remove();
        }
    }
}

impl Host for WebHost {
    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }

    fn viewport_size(&self) -> (u32, u32) {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0) as u32
        };
        (
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn mount_surface(&mut self, style: &SurfaceStyle) -> BackgroundResult<()> {
        let body = self.document.body().ok_or(BackgroundError::MissingAnchor)?;

        let canvas = self
            .document
            .create_element("canvas")
            .map_err(js_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BackgroundError::renderer("created element is not a canvas"))?;
        canvas.set_id(&style.element_id);
        if style.aria_hidden {
            canvas.set_attribute("aria-hidden", "true").map_err(js_error)?;
        }
        canvas.style().set_css_text(&style.css);

        // 放在 body 最前面，位于所有内容之后
        body.insert_before(&canvas, body.first_child().as_ref())
            .map_err(js_error)?;

        log::debug!("mounted #{}", style.element_id);
        self.canvas = Some(canvas);
        Ok(())
    }
}

/// Forward `visibilitychange` to the app for the lifetime of the page
fn listen_visibility(
    document: &Document,
    ctx: egui::Context,
    events: Sender<HostEvent>,
) -> BackgroundResult<()> {
    let source = document.clone();
    let listener = Closure::<dyn FnMut()>::new(move || {
        let hidden = source.hidden();
        if events.send(HostEvent::VisibilityChanged { hidden }).is_ok() && !hidden {
            // a hidden page gets no frames, so wake the app to drain the event
            ctx.request_repaint();
        }
    });
    document
        .add_event_listener_with_callback("visibilitychange", listener.as_ref().unchecked_ref())
        .map_err(js_error)?;
    listener.forget();
    Ok(())
}

/// Boot the background into the current page.
///
/// Never fails loudly: any error is logged and the page stays as it was.
pub async fn start(config: BackgroundConfig) {
    if let Err(err) = boot(config).await {
        log::warn!("terrain background not started: {err}");
    }
}

async fn boot(config: BackgroundConfig) -> BackgroundResult<()> {
    let mut host = WebHost::new()?;
    let Some(background) = Background::boot(&mut host, config)? else {
        return Ok(());
    };
    let canvas = host.canvas().cloned().ok_or(BackgroundError::MissingAnchor)?;

    let (sender, events) = mpsc::channel();
    let document = host.document.clone();
    let result = eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |cc| {
                listen_visibility(&document, cc.egui_ctx.clone(), sender)?;
                Ok(Box::new(BackgroundApp::new(cc, background, events)?))
            }),
        )
        .await;

    if let Err(err) = result {
        host.unmount();
        return Err(js_error(err));
    }
    log::info!("terrain background running");
    Ok(())
}
