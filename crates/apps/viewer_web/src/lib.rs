use std::cell::RefCell;
use std::rc::Rc;

use console_error_panic_hook::set_once;
use globe::builder::Viewport;
use gpu::GraphicsBackend;
use globe::{ConfigWarning, Globe, GlobeConfig, GlobeError, load_boundaries};
use runtime::event_bus::Severity;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, EventTarget, HtmlElement, MouseEvent, Window};

mod fetch;
mod shading;
mod wgpu;
use fetch::HttpFetcher;
use wgpu::WgpuBackend;

const FALLBACK_SIZE: u32 = 600;
const FALLBACK_TEXT: &str = "3D globe unavailable: graphics could not be initialized. \
Try another browser or enable hardware acceleration.";

type Listener = (EventTarget, &'static str, Closure<dyn FnMut(web_sys::Event)>);
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Host {
    globe: Option<Globe<WgpuBackend>>,
    container: HtmlElement,
    overlay: Option<Element>,
    frame_id: Option<i32>,
    listeners: Vec<Listener>,
    destroyed: bool,
}

impl Host {
    fn tick(&mut self, now_s: f64) -> bool {
        let Some(globe) = self.globe.as_mut() else {
            return false;
        };
        let running = globe.tick(now_s);
        forward_events(globe);
        running
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Sends lifecycle events to the browser console.
fn forward_events(globe: &mut Globe<WgpuBackend>) {
    for event in globe.drain_events() {
        let line = JsValue::from_str(&format!("globe {event}"));
        match event.severity {
            Severity::Warn => web_sys::console::warn_1(&line),
            Severity::Info => web_sys::console::log_1(&line),
        }
    }
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (key, value) in styles {
        style.set_property(key, value)?;
    }
    Ok(())
}

/// Container size in CSS pixels; 600×600 when it has not been laid out.
fn measure(container: &HtmlElement) -> (u32, u32) {
    let rect = container.get_bounding_client_rect();
    let (w, h) = (rect.width().round() as u32, rect.height().round() as u32);
    if w == 0 || h == 0 {
        (FALLBACK_SIZE, FALLBACK_SIZE)
    } else {
        (w, h)
    }
}

fn show_fallback(document: &Document, container: &HtmlElement) -> Result<Element, JsValue> {
    let overlay = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    set_styles(
        &overlay,
        &[
            ("position", "absolute"),
            ("inset", "0"),
            ("display", "flex"),
            ("align-items", "center"),
            ("justify-content", "center"),
            ("padding", "1rem"),
            ("text-align", "center"),
            ("color", "#88ffbb"),
            ("font", "14px sans-serif"),
        ],
    )?;
    overlay.set_text_content(Some(FALLBACK_TEXT));
    container.append_child(&overlay)?;
    Ok(overlay.into())
}

fn listen(
    host: &mut Host,
    target: EventTarget,
    kind: &'static str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    host.listeners.push((target, kind, closure));
    Ok(())
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window()?.request_animation_frame(callback.as_ref().unchecked_ref())
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

fn install_listeners(host: &Rc<RefCell<Host>>, window: &Window) -> Result<(), JsValue> {
    let mut h = host.borrow_mut();
    let container: EventTarget = h.container.clone().into();

    let weak = Rc::downgrade(host);
    listen(&mut h, container.clone(), "mousemove", move |event| {
        let (Some(host), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
            return;
        };
        let mut host = host.borrow_mut();
        let rect = host.container.get_bounding_client_rect();
        if let Some(globe) = host.globe.as_mut() {
            globe.on_pointer_move(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
                [rect.left(), rect.top(), rect.width(), rect.height()],
            );
        }
    })?;

    let weak = Rc::downgrade(host);
    listen(&mut h, container, "mousedown", move |event| {
        let (Some(host), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
            return;
        };
        if let Some(globe) = host.borrow_mut().globe.as_mut() {
            globe.on_pointer_down(f64::from(event.client_x()), f64::from(event.client_y()));
        }
    })?;

    // Releases outside the container still end the drag.
    let weak = Rc::downgrade(host);
    listen(&mut h, window.clone().into(), "mouseup", move |_| {
        let Some(host) = weak.upgrade() else {
            return;
        };
        if let Some(globe) = host.borrow_mut().globe.as_mut() {
            globe.on_pointer_up();
        }
    })?;

    let weak = Rc::downgrade(host);
    listen(&mut h, window.clone().into(), "resize", move |_| {
        let Some(host) = weak.upgrade() else {
            return;
        };
        let mut host = host.borrow_mut();
        let (width, height) = measure(&host.container);
        if let Some(globe) = host.globe.as_mut() {
            globe.on_resize(width, height);
        }
    })
}

fn start_frames(host: &Rc<RefCell<Host>>, frame: &FrameCallback) -> Result<(), JsValue> {
    let weak_host = Rc::downgrade(host);
    let weak_frame = Rc::downgrade(frame);
    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
        let Some(host) = weak_host.upgrade() else {
            return;
        };
        if !host.borrow_mut().tick(now_ms / 1000.0) {
            return;
        }
        let Some(frame) = weak_frame.upgrade() else {
            return;
        };
        if let Some(callback) = frame.borrow().as_ref() {
            match request_frame(callback) {
                Ok(id) => host.borrow_mut().frame_id = Some(id),
                Err(e) => log(&format!("animation frame request failed: {e:?}")),
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(callback) = frame.borrow().as_ref() {
        host.borrow_mut().frame_id = Some(request_frame(callback)?);
    }
    Ok(())
}

/// Acquires the graphics backend, builds the globe and starts it. Without a
/// backend the container gets the fallback message instead.
async fn mount(
    host: Rc<RefCell<Host>>,
    frame: FrameCallback,
    config: GlobeConfig,
    warnings: Vec<ConfigWarning>,
    viewport: Viewport,
) -> Result<(), JsValue> {
    let window = window()?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))?;
    let container = host.borrow().container.clone();
    let sources = config.data_sources.clone();

    let backend = WgpuBackend::attach(&document, &container).await;
    if host.borrow().destroyed {
        if let Ok(mut backend) = backend {
            backend.detach();
        }
        return Ok(());
    }

    let globe = backend
        .map_err(GlobeError::from)
        .and_then(|backend| Globe::create(backend, config, viewport));
    let mut globe = match globe {
        Ok(globe) => globe.with_config_warnings(&warnings),
        Err(e) => {
            for warning in &warnings {
                warn(&format!("globe config.invalid: {warning}"));
            }
            warn(&e.to_string());
            host.borrow_mut().overlay = Some(show_fallback(&document, &container)?);
            return Ok(());
        }
    };
    forward_events(&mut globe);
    host.borrow_mut().globe = Some(globe);

    install_listeners(&host, &window)?;
    start_frames(&host, &frame)?;

    let content = load_boundaries(&HttpFetcher, &sources).await;
    let mut host = host.borrow_mut();
    if let Some(globe) = host.globe.as_mut() {
        globe.apply_geo_content(content);
        forward_events(globe);
    }
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// The globe mounted into one container element.
#[wasm_bindgen]
pub struct GlobeWidget {
    host: Rc<RefCell<Host>>,
    frame: FrameCallback,
}

#[wasm_bindgen]
impl GlobeWidget {
    /// Mounts a globe into `container`. `options_json` is a JSON object with
    /// camelCase keys; omitted or unusable keys take their defaults and are
    /// reported on the console.
    ///
    /// The graphics device is acquired asynchronously. When it is
    /// unavailable the container shows a short message instead and the
    /// widget only supports `destroy`.
    pub fn create(container: HtmlElement, options_json: Option<String>) -> Result<GlobeWidget, JsValue> {
        let parsed = GlobeConfig::parse(options_json.as_deref().unwrap_or(""));
        let config = parsed.config;
        let window = window()?;

        set_styles(
            &container,
            &[
                ("position", "relative"),
                ("overflow", "hidden"),
                ("min-height", "480px"),
                ("width", config.width.as_str()),
                ("height", config.height.as_str()),
            ],
        )?;
        let (width, height) = measure(&container);
        let viewport = Viewport::new(width, height, window.device_pixel_ratio());

        let host = Rc::new(RefCell::new(Host {
            globe: None,
            container,
            overlay: None,
            frame_id: None,
            listeners: Vec::new(),
            destroyed: false,
        }));
        let frame: FrameCallback = Rc::new(RefCell::new(None));

        let (mount_host, mount_frame) = (host.clone(), frame.clone());
        spawn_local(async move {
            if let Err(e) = mount(mount_host, mount_frame, config, parsed.warnings, viewport).await {
                warn(&format!("globe mount failed: {e:?}"));
            }
        });

        Ok(GlobeWidget { host, frame })
    }

    pub fn is_running(&self) -> bool {
        self.host
            .borrow()
            .globe
            .as_ref()
            .is_some_and(|g| g.is_running())
    }

    /// Stops the animation, detaches listeners and removes everything the
    /// widget added to the page. Safe to call more than once, including
    /// before the graphics device is ready.
    pub fn destroy(&mut self) {
        let mut host = self.host.borrow_mut();
        host.destroyed = true;
        if let Some(id) = host.frame_id.take() {
            let cancelled = window().and_then(|w| w.cancel_animation_frame(id));
            if let Err(e) = cancelled {
                log(&format!("cancel animation frame failed: {e:?}"));
            }
        }
        for (target, kind, closure) in host.listeners.drain(..) {
            if let Err(e) = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
                log(&format!("removing {kind} listener failed: {e:?}"));
            }
        }
        if let Some(globe) = host.globe.as_mut() {
            globe.destroy();
            forward_events(globe);
        }
        if let Some(overlay) = host.overlay.take() {
            overlay.remove();
        }
        drop(host);
        self.frame.borrow_mut().take();
    }
}
