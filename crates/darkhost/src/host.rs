//! The browser window host.
//!
//! The tao event loop owns every window and webview on the main thread. The
//! control server runs on a background thread with a single-threaded tokio
//! runtime and reaches the main window through a [`ProxyWindow`], which turns
//! surface calls into [`HostEvent`]s posted to the loop.
//!
//! Window behaviour
//! - The first window is the hosted window; it is set into the shared
//!   `HostContext` and cleared from it when it closes.
//! - Control+N released inside a page opens another window on the game's
//!   start page. Those windows are not controlled by the socket.
//! - New-window requests (`target=_blank`, `window.open`) load in the window
//!   that made them.
//! - The window title is fixed; page titles never replace it.
//! - Closing the last window ends the loop and stops the control server.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use darkhost_server::{ControlServer, HostContext, HostWindow, default_socket_path};
use parking_lot::Mutex;
use relaykey::{Error as RelayError, InputEvent, RelayKey, Surface};
use tao::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget},
    window::{Theme, Window, WindowBuilder, WindowId},
};
use tracing::{debug, error, info, trace, warn};
use wry::{
    WebView, WebViewBuilder,
    http::{HeaderMap, HeaderValue, Request, header::COOKIE},
};

use crate::{
    Error, Result, script,
    settings::{Destination, LaunchSettings, USER_AGENT, WINDOW_SIZE},
};

/// Requests handled on the main thread.
#[derive(Debug)]
pub enum HostEvent {
    /// Focus the hosted window and its webview.
    Focus,
    /// Deliver an input event to the hosted page.
    Input(InputEvent),
    /// Reload the hosted page.
    Reload,
    /// Load `url` in `window` instead of opening a new one.
    Navigate {
        /// Window that asked for a new window.
        window: WindowId,
        /// Requested URL.
        url: String,
    },
    /// Open an additional window on the start page.
    OpenWindow,
}

/// The hosted window as seen from the control server thread.
pub struct ProxyWindow {
    proxy: Mutex<EventLoopProxy<HostEvent>>,
    focused: Arc<AtomicBool>,
}

impl ProxyWindow {
    /// Bridge to the loop behind `proxy`; `focused` mirrors the window's
    /// focus state.
    pub fn new(proxy: EventLoopProxy<HostEvent>, focused: Arc<AtomicBool>) -> Self {
        Self {
            proxy: Mutex::new(proxy),
            focused,
        }
    }

    fn post(&self, event: HostEvent) -> relaykey::Result<()> {
        self.proxy
            .lock()
            .send_event(event)
            .map_err(|_| RelayError::SurfaceGone)
    }
}

impl Surface for ProxyWindow {
    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn focus(&self) -> relaykey::Result<()> {
        self.post(HostEvent::Focus)?;
        // The loop applies focus before any input posted after this call.
        self.focused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn send_input_event(&self, event: InputEvent) -> relaykey::Result<()> {
        self.post(HostEvent::Input(event))
    }
}

impl HostWindow for ProxyWindow {
    fn surface(&self) -> &dyn Surface {
        self
    }

    fn reload(&self) -> relaykey::Result<()> {
        self.post(HostEvent::Reload)
    }
}

/// A native window with its webview. The webview is dropped first.
struct Hosted {
    webview: WebView,
    window: Window,
}

/// Main-thread state.
struct Host {
    windows: HashMap<WindowId, Hosted>,
    /// The socket-controlled window, while it is open.
    main: Option<WindowId>,
    focused: Arc<AtomicBool>,
    ctx: HostContext,
    proxy: EventLoopProxy<HostEvent>,
    /// Page loaded by windows opened with Control+N.
    extra_destination: Destination,
}

impl Host {
    fn main_window(&self) -> Option<&Hosted> {
        self.main.and_then(|id| self.windows.get(&id))
    }

    fn eval_main(&self, js: &str) {
        match self.main_window() {
            Some(h) => {
                if let Err(e) = h.webview.evaluate_script(js) {
                    warn!("Script evaluation failed: {}", e);
                }
            }
            None => trace!("no main window; dropping script"),
        }
    }

    fn on_user_event(&mut self, event: HostEvent, target: &EventLoopWindowTarget<HostEvent>) {
        match event {
            HostEvent::Focus => {
                if let Some(h) = self.main_window() {
                    h.window.set_focus();
                    if let Err(e) = h.webview.focus() {
                        warn!("Webview focus failed: {}", e);
                    }
                }
            }
            HostEvent::Input(ev) => {
                trace!(%ev, "input_event");
                self.eval_main(&script::input_event(&ev));
            }
            HostEvent::Reload => {
                info!("Reloading hosted page");
                self.eval_main(script::reload());
            }
            HostEvent::Navigate { window, url } => match self.windows.get(&window) {
                Some(h) => {
                    debug!(%url, "new_window_redirected");
                    if let Err(e) = h.webview.evaluate_script(&script::navigate(&url)) {
                        warn!("Navigation failed: {}", e);
                    }
                }
                None => trace!(%url, "navigation for closed window"),
            },
            HostEvent::OpenWindow => {
                match open_window(target, &self.proxy, &self.extra_destination) {
                    Ok(h) => {
                        info!("Opened additional window");
                        self.windows.insert(h.window.id(), h);
                    }
                    Err(e) => error!("Failed to open window: {}", e),
                }
            }
        }
    }

    fn on_focus(&self, id: WindowId, focused: bool) {
        if self.main == Some(id) {
            self.focused.store(focused, Ordering::SeqCst);
        }
    }

    /// Returns true once no windows remain.
    fn on_close(&mut self, id: WindowId) -> bool {
        self.windows.remove(&id);
        if self.main == Some(id) {
            self.main = None;
            self.focused.store(false, Ordering::SeqCst);
            self.ctx.clear_window();
            info!("Hosted window closed");
        }
        self.windows.is_empty()
    }
}

/// Create a window with a webview showing `dest`.
fn open_window(
    target: &EventLoopWindowTarget<HostEvent>,
    proxy: &EventLoopProxy<HostEvent>,
    dest: &Destination,
) -> Result<Hosted> {
    let (w, h) = WINDOW_SIZE;
    let window = WindowBuilder::new()
        .with_title(LaunchSettings::title())
        .with_inner_size(LogicalSize::new(w, h))
        .with_theme(Some(Theme::Dark))
        .build(target)?;
    let id = window.id();

    let nav_proxy = proxy.clone();
    let ipc_proxy = proxy.clone();
    let init = script::init(dest.session.as_ref());
    let builder = WebViewBuilder::new()
        .with_user_agent(USER_AGENT)
        .with_initialization_script(&init)
        .with_new_window_req_handler(move |url| {
            let _ = nav_proxy.send_event(HostEvent::Navigate { window: id, url });
            false
        })
        .with_ipc_handler(move |req: Request<String>| {
            if req.body() == script::NEW_WINDOW_MSG {
                let _ = ipc_proxy.send_event(HostEvent::OpenWindow);
            }
        });
    let builder = match &dest.session {
        Some(s) => {
            let cookie = HeaderValue::from_str(&s.cookie())
                .map_err(|e| Error::Other(format!("Invalid session cookie: {e}")))?;
            let mut headers = HeaderMap::new();
            headers.insert(COOKIE, cookie);
            builder.with_url_and_headers(&dest.url, headers)
        }
        None => builder.with_url(&dest.url),
    };

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix as _;
        use wry::WebViewBuilderExtUnix as _;
        let vbox = window
            .default_vbox()
            .ok_or_else(|| Error::Other("Window has no GTK container".into()))?;
        builder.build_gtk(vbox)?
    };
    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window)?;

    debug!(url = %dest.url, "window_opened");
    Ok(Hosted { webview, window })
}

/// Bind the control socket on the calling thread, then serve it on its own
/// thread with a single-threaded runtime until the server shuts down.
///
/// Bind failures are returned so the host never runs without its socket.
fn start_control_server(server: ControlServer) -> Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let bound = {
        let _guard = runtime.enter();
        server.bind()?
    };
    Ok(thread::spawn(move || {
        runtime.block_on(async {
            if let Err(e) = bound.serve().await {
                error!("Control server error: {}", e);
            }
        });
        debug!("Control server thread ending");
    }))
}

/// Open the hosted window and serve the control socket until every window
/// is closed. Only returns on startup failure.
pub fn run(settings: LaunchSettings) -> Result<()> {
    let event_loop = EventLoopBuilder::<HostEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();
    let ctx = HostContext::new();
    let focused = Arc::new(AtomicBool::new(false));

    let socket_path = settings
        .socket_path
        .clone()
        .unwrap_or_else(|| default_socket_path().to_string());
    info!("Starting host; control socket {}", socket_path);
    let server = ControlServer::new(socket_path, ctx.clone())
        .with_relay(RelayKey::new().with_type_delay(settings.type_delay));
    let shutdown = server.shutdown_token();
    let server_thread = start_control_server(server)?;

    let main = match open_window(&event_loop, &proxy, &settings.destination) {
        Ok(main) => main,
        Err(e) => {
            shutdown.cancel();
            let _ = server_thread.join();
            return Err(e);
        }
    };
    let main_id = main.window.id();
    ctx.set_window(Arc::new(ProxyWindow::new(proxy.clone(), focused.clone())));

    let mut host = Host {
        windows: HashMap::from([(main_id, main)]),
        main: Some(main_id),
        focused,
        ctx,
        proxy,
        extra_destination: settings.extra_destination,
    };
    let mut server_thread = Some(server_thread);

    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::UserEvent(ev) => host.on_user_event(ev, target),
            Event::WindowEvent {
                window_id,
                event: WindowEvent::Focused(f),
                ..
            } => host.on_focus(window_id, f),
            Event::WindowEvent {
                window_id,
                event: WindowEvent::CloseRequested,
                ..
            } => {
                if host.on_close(window_id) {
                    info!("All windows closed, exiting");
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::LoopDestroyed => {
                shutdown.cancel();
                if let Some(h) = server_thread.take()
                    && h.join().is_err()
                {
                    error!("Control server thread panicked");
                }
                info!("Shutdown complete");
            }
            _ => {}
        }
    })
}
