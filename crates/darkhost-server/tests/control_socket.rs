use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use darkhost_server::{Command, ControlClient, ControlServer, HostContext, HostWindow};
use keycode::{KeyCode, ResolvedKey};
use relaykey::{InputEvent, RecordingSurface, RelayKey, Surface};
use tokio::{
    io::AsyncReadExt as _,
    time::{Instant, sleep, timeout},
};

#[derive(Default)]
struct TestWindow {
    surface: RecordingSurface,
    reloads: AtomicUsize,
}

impl HostWindow for TestWindow {
    fn surface(&self) -> &dyn Surface {
        &self.surface
    }
    fn reload(&self) -> relaykey::Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn socket_path(name: &str) -> String {
    let mut p: PathBuf = std::env::temp_dir();
    p.push(format!("darkhost-it-{}", std::process::id()));
    p.push(format!("{name}.sock"));
    p.to_string_lossy().to_string()
}

/// Start a server on `name` and return its context and shutdown token.
fn start(name: &str) -> (String, HostContext, tokio_util::sync::CancellationToken) {
    let path = socket_path(name);
    let ctx = HostContext::new();
    let server = ControlServer::new(&path, ctx.clone())
        .with_relay(RelayKey::new().with_type_delay(Duration::from_millis(1)));
    let token = server.shutdown_token();
    let bound = server.bind().expect("bind control socket");
    tokio::spawn(bound.serve());
    (path, ctx, token)
}

async fn wait_until(timeout_ms: u64, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if pred() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(2)).await;
    }
}

#[tokio::test(flavor = "current_thread")]
async fn key_click_over_socket() {
    let (path, ctx, token) = start("click");
    let win = Arc::new(TestWindow::default());
    ctx.set_window(win.clone());

    let mut client = ControlClient::connect(&path).await.unwrap();
    client.send(&Command::KeyClick(KeyCode(13))).await.unwrap();

    assert!(wait_until(1000, || win.surface.events().len() == 2).await);
    assert_eq!(
        win.surface.events(),
        vec![
            InputEvent::KeyDown {
                key: ResolvedKey::Named("Enter")
            },
            InputEvent::KeyUp {
                key: ResolvedKey::Named("Enter")
            },
        ]
    );
    token.cancel();
}

#[tokio::test(flavor = "current_thread")]
async fn bare_messages_and_lines_both_work() {
    let (path, ctx, token) = start("framing");
    let win = Arc::new(TestWindow::default());
    ctx.set_window(win.clone());

    // The bot client writes one command per write, no terminator.
    let mut client = ControlClient::connect(&path).await.unwrap();
    client.send_raw("refresh").await.unwrap();
    assert!(wait_until(1000, || win.reloads.load(Ordering::SeqCst) == 1).await);

    client
        .send_raw("keyDown|37\nbogus|1\ntext|hi\n")
        .await
        .unwrap();
    assert!(wait_until(1000, || win.surface.events().len() == 3).await);
    assert_eq!(
        win.surface.events(),
        vec![
            InputEvent::KeyDown {
                key: ResolvedKey::Named("ArrowLeft")
            },
            InputEvent::Char { ch: 'h' },
            InputEvent::Char { ch: 'i' },
        ]
    );
    token.cancel();
}

#[tokio::test(flavor = "current_thread")]
async fn line_straddling_read_buffer_is_reassembled() {
    let (path, ctx, token) = start("straddle");
    let win = Arc::new(TestWindow::default());
    ctx.set_window(win.clone());

    // Puts the command across the first 4096-byte read.
    let mut msg = "\n".repeat(4087);
    msg.push_str("keyDown|13\n");
    let mut client = ControlClient::connect(&path).await.unwrap();
    client.send_raw(&msg).await.unwrap();

    assert!(wait_until(1000, || !win.surface.events().is_empty()).await);
    sleep(Duration::from_millis(20)).await;
    assert_eq!(
        win.surface.events(),
        vec![InputEvent::KeyDown {
            key: ResolvedKey::Named("Enter")
        }]
    );
    token.cancel();
}

#[tokio::test(flavor = "current_thread")]
async fn client_that_never_reads_is_still_served() {
    let (path, ctx, token) = start("noread");
    let win = Arc::new(TestWindow::default());
    ctx.set_window(win.clone());

    // Far more loopback than the socket buffers hold.
    const COUNT: usize = 30_000;
    let mut client = ControlClient::connect(&path).await.unwrap();
    client.send_raw(&"keyUp|65\n".repeat(COUNT)).await.unwrap();

    assert!(
        wait_until(10_000, || win.surface.events().len() == COUNT).await,
        "handled {} of {COUNT}",
        win.surface.events().len()
    );
    token.cancel();
}

#[tokio::test(flavor = "current_thread")]
async fn echoes_what_it_receives() {
    let (path, _ctx, token) = start("echo");
    let mut client = ControlClient::connect(&path).await.unwrap();
    client.send_raw("keyUp|65").await.unwrap();

    let mut buf = [0u8; 64];
    let mut got = Vec::new();
    while got.len() < "keyUp|65".len() {
        let n = timeout(Duration::from_secs(1), client.stream_mut().read(&mut buf))
            .await
            .expect("echo within timeout")
            .unwrap();
        assert!(n > 0);
        got.extend_from_slice(&buf[..n]);
    }
    assert_eq!(got, b"keyUp|65");
    token.cancel();
}

#[tokio::test(flavor = "current_thread")]
async fn no_window_is_a_silent_no_op() {
    let (path, ctx, token) = start("nowindow");
    let mut client = ControlClient::connect(&path).await.unwrap();
    for msg in ["refresh", "keyClick|13", "text|abc"] {
        client.send_raw(&format!("{msg}\n")).await.unwrap();
    }
    sleep(Duration::from_millis(20)).await;

    // Setting a window afterwards does not replay anything.
    let win = Arc::new(TestWindow::default());
    ctx.set_window(win.clone());
    sleep(Duration::from_millis(20)).await;
    assert!(win.surface.events().is_empty());
    assert_eq!(win.reloads.load(Ordering::SeqCst), 0);

    // The connection is still usable.
    client.send(&Command::KeyUp(KeyCode(65))).await.unwrap();
    assert!(wait_until(1000, || win.surface.events().len() == 1).await);
    token.cancel();
}

#[tokio::test(flavor = "current_thread")]
async fn shutdown_removes_socket() {
    let (path, _ctx, token) = start("shutdown");
    assert!(std::path::Path::new(&path).exists());
    token.cancel();
    assert!(wait_until(1000, || !std::path::Path::new(&path).exists()).await);
    assert!(ControlClient::connect(&path).await.is_err());
}
