//! Socket-level tests for the HTTP writer.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use crate::config::Replacer;
use crate::test_utils::mock_endpoint::{
    local_listener, refused_addr, spawn_mock_server, spawn_silent_server,
};
use crate::writer::{TransportError, WriterChannel, WriterOpener};

use super::{CancelToken, HttpChannel, HttpWriter, HttpWriterConfig, SendOptions};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

#[fixture]
fn tcp_listener() -> TcpListener {
    local_listener()
}

fn writer_for(addr: SocketAddr, key: Option<&str>, value: Option<&str>) -> Arc<HttpWriter> {
    let config = HttpWriterConfig {
        endpoint: format!("http://{addr}/log"),
        key: key.map(str::to_owned),
        value: value.map(str::to_owned),
        connect_timeout_ms: Some(2_000),
        request_timeout_ms: Some(5_000),
        ..Default::default()
    };
    Arc::new(config.provision(&Replacer::isolated()).expect("provision"))
}

fn channel_for(addr: SocketAddr) -> HttpChannel {
    writer_for(addr, None, None).open_channel().expect("open channel")
}

#[rstest]
fn posts_fifth_field_as_json(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let channel = channel_for(addr);
    let line = b"1700000000.1\tinfo\thttp.log.access\taccess\t{\"status\":200}\n";

    let report = channel.send(line);

    assert!(report.is_ok(), "{report:?}");
    assert_eq!(report.written, line.len());
    let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/log");
    assert_eq!(captured.body, br#"{"status":200}"#);
    assert_eq!(captured.header("content-type"), Some("application/json"));
}

#[rstest]
fn posts_unstructured_line_verbatim(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![204]);
    let channel = channel_for(addr);

    let report = channel.send(b"a\tb\tc free text\n");

    assert!(report.is_ok());
    let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(captured.body, b"a\tb\tc free text");
}

#[rstest]
fn empty_line_posts_empty_body(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let channel = channel_for(addr);

    let report = channel.send(b"");

    assert!(report.is_ok());
    assert_eq!(report.written, 0);
    let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
    assert!(captured.body.is_empty());
}

#[rstest]
fn attaches_configured_header(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let channel = writer_for(addr, Some("X-Auth"), Some("secret123"))
        .open_channel()
        .expect("open channel");

    let report = channel.send(b"payload\n");

    assert!(report.is_ok());
    let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(captured.header("x-auth"), Some("secret123"));
    assert_eq!(captured.header_values("content-type"), ["application/json"]);
}

/// Headers ureq adds to every `send_bytes` request on its own.
const CLIENT_HEADERS: [&str; 5] = [
    "accept",
    "accept-encoding",
    "content-length",
    "host",
    "user-agent",
];

#[rstest]
#[case::no_key(None)]
#[case::empty_key(Some(""))]
fn only_content_type_is_added_without_key(tcp_listener: TcpListener, #[case] key: Option<&str>) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let channel = writer_for(addr, key, Some("ignored"))
        .open_channel()
        .expect("open channel");
    assert_eq!(channel.header_key(), None);

    let report = channel.send(b"payload\n");

    assert!(report.is_ok(), "{report:?}");
    let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
    let mut added: Vec<&str> = captured
        .headers
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| !CLIENT_HEADERS.contains(name))
        .collect();
    added.sort_unstable();
    assert_eq!(added, ["content-type"]);
    assert_eq!(captured.header_values("content-type"), ["application/json"]);
}

#[rstest]
fn content_type_key_replaces_default(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let channel = writer_for(addr, Some("Content-Type"), Some("text/plain"))
        .open_channel()
        .expect("open channel");
    assert_eq!(channel.header_key(), Some("Content-Type"));

    let report = channel.send(b"plain words\n");

    assert!(report.is_ok(), "{report:?}");
    let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(captured.header_values("content-type"), ["text/plain"]);
}

#[rstest]
fn channel_reports_resolved_endpoint(tcp_listener: TcpListener) {
    let addr = tcp_listener.local_addr().expect("listener has address");
    let writer = writer_for(addr, None, None);
    let channel = writer.open_channel().expect("open channel");

    assert_eq!(channel.endpoint(), format!("http://{addr}/log"));
    assert_eq!(channel.endpoint(), writer.endpoint());
}

#[rstest]
fn not_found_is_rejected_but_reports_full_length(tcp_listener: TcpListener) {
    let (addr, _rx) = spawn_mock_server(tcp_listener, vec![404]);
    let channel = channel_for(addr);
    let line = b"ts\tinfo\tlogger\ttype\t{\"a\":1}\n";

    let report = channel.send(line);

    assert_eq!(report.written, line.len());
    assert!(report.transport_error().is_none());
    let rejection = report.rejection().expect("404 must be recorded");
    assert_eq!(rejection.status, 404);
    assert!(rejection.dump.contains("404 Not Found"), "{}", rejection.dump);
    assert!(
        rejection.dump.to_ascii_lowercase().contains("x-mock: yes"),
        "{}",
        rejection.dump
    );
    assert!(rejection.dump.contains("endpoint says 404"), "{}", rejection.dump);
}

#[rstest]
#[case(500)]
#[case(503)]
#[case(400)]
fn other_failure_statuses_are_rejections(tcp_listener: TcpListener, #[case] status: u16) {
    let (addr, _rx) = spawn_mock_server(tcp_listener, vec![status]);
    let channel = channel_for(addr);

    let report = channel.send(b"line\n");

    assert_eq!(report.written, 5);
    assert_eq!(report.rejection().map(|r| r.status), Some(status));
}

#[rstest]
fn connection_refused_is_a_transport_error() {
    let channel = channel_for(refused_addr());

    let report = channel.send(b"line\n");

    assert_eq!(report.written, 0);
    assert!(
        matches!(report.transport_error(), Some(TransportError::Network { .. })),
        "{report:?}"
    );
}

#[rstest]
fn invalid_header_is_a_transport_error(tcp_listener: TcpListener) {
    let addr = tcp_listener.local_addr().expect("listener has address");
    let channel = writer_for(addr, Some("X Bad"), Some("v"))
        .open_channel()
        .expect("open channel");

    let report = channel.send(b"line\n");

    assert_eq!(report.written, 0);
    assert!(matches!(
        report.transport_error(),
        Some(TransportError::InvalidHeader { name, .. }) if name == "X Bad"
    ));
}

#[rstest]
fn hung_endpoint_hits_the_deadline(tcp_listener: TcpListener) {
    let addr = spawn_silent_server(tcp_listener, Duration::from_secs(3));
    let channel = channel_for(addr);
    let started = Instant::now();

    let report = channel.send_with(
        b"line\n",
        &SendOptions::new().with_timeout(Duration::from_millis(200)),
    );

    assert_eq!(report.written, 0);
    assert!(
        matches!(
            report.transport_error(),
            Some(TransportError::DeadlineExceeded { .. })
        ),
        "{report:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[rstest]
fn expired_deadline_skips_the_request(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let channel = channel_for(addr);
    let past = Instant::now()
        .checked_sub(Duration::from_millis(1))
        .unwrap_or_else(Instant::now);

    let report = channel.send_with(b"line\n", &SendOptions::new().with_deadline(past));

    assert!(matches!(
        report.transport_error(),
        Some(TransportError::DeadlineExceeded { .. })
    ));
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[rstest]
fn cancelled_send_is_not_dispatched(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let channel = channel_for(addr);
    let token = CancelToken::new();
    token.cancel();

    let report = channel.send_with(b"line\n", &SendOptions::new().with_cancel(token));

    assert_eq!(report.written, 0);
    assert!(matches!(
        report.transport_error(),
        Some(TransportError::Canceled { .. })
    ));
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[rstest]
fn concurrent_sends_keep_bodies_independent(tcp_listener: TcpListener) {
    const SENDERS: usize = 8;
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200; SENDERS]);
    let channel = Arc::new(channel_for(addr));

    let handles: Vec<_> = (0..SENDERS)
        .map(|i| {
            let channel = Arc::clone(&channel);
            thread::spawn(move || {
                let line = format!("ts\tinfo\tworker\tapp\t{{\"worker\":{i}}}\n");
                channel.send(line.as_bytes())
            })
        })
        .collect();
    for handle in handles {
        let report = handle.join().expect("sender thread");
        assert!(report.is_ok(), "{report:?}");
    }

    let mut bodies: Vec<String> = (0..SENDERS)
        .map(|_| {
            let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
            String::from_utf8(captured.body).expect("utf-8 body")
        })
        .collect();
    bodies.sort();
    let mut expected: Vec<String> = (0..SENDERS).map(|i| format!("{{\"worker\":{i}}}")).collect();
    expected.sort();
    assert_eq!(bodies, expected);
}

#[rstest]
fn opener_trait_produces_working_channel(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![200]);
    let opener: Arc<dyn WriterOpener> = writer_for(addr, None, None);

    let channel = opener.open_writer().expect("open writer");
    let report = channel.send(b"via trait\n");

    assert!(report.is_ok());
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).expect("request").body, b"via trait");
    assert_eq!(channel.close(), Ok(()));
}
