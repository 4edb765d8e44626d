//! Public API tests for the HTTP writer front-ends.

use std::sync::Arc;
use std::time::Duration;

use http_log_writer::test_utils::mock_endpoint::{local_listener, spawn_mock_server};
use http_log_writer::{
    HttpWriter, HttpWriterBuilder, HttpWriterConfig, Replacer, SendOptions, WriterBuilderTrait,
    WriterChannel, WriterOpener,
};
use rstest::rstest;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

#[rstest]
fn json_configuration_round_trips_through_provisioning() {
    let config = HttpWriterConfig::from_json(
        r#"{"url":"http://{env.SINK}/v1/logs","key":"Authorization","value":"Bearer t0k3n","period":30}"#,
    )
    .expect("json");
    let writer = config
        .provision(&Replacer::isolated().with_value("env.SINK", "collector:4318"))
        .expect("provision");

    let json = serde_json::to_value(&writer).expect("serialise");

    assert_eq!(json["url"], "http://collector:4318/v1/logs");
    assert_eq!(json["key"], "Authorization");
    assert_eq!(json["value"], "Bearer t0k3n");
    assert_eq!(json["period"], 30);
    assert!(json.get("count").is_none());
}

#[rstest]
fn builder_writer_posts_with_header() {
    let (addr, rx) = spawn_mock_server(local_listener(), vec![202]);
    let writer: Arc<HttpWriter> = Arc::new(
        HttpWriterBuilder::new()
            .with_endpoint(format!("http://{addr}/bulk"))
            .with_header("X-Tenant", "acme")
            .with_request_timeout_ms(2_000)
            .build(&Replacer::isolated())
            .expect("build"),
    );
    let channel = writer.open_channel().expect("open");

    let report = channel.send_with(
        b"1.0\twarn\tsvc\tjson\t{\"msg\":\"slow\"}\n",
        &SendOptions::new().with_timeout(Duration::from_secs(2)),
    );

    assert!(report.is_ok(), "{report:?}");
    let captured = rx.recv_timeout(RECV_TIMEOUT).expect("request");
    assert_eq!(captured.path, "/bulk");
    assert_eq!(captured.header("x-tenant"), Some("acme"));
    assert_eq!(captured.body, br#"{"msg":"slow"}"#);
}

#[rstest]
fn builder_trait_object_opens_channels() {
    let (addr, rx) = spawn_mock_server(local_listener(), vec![200, 200]);
    let builder: Box<dyn WriterBuilderTrait> =
        Box::new(HttpWriterBuilder::new().with_endpoint(format!("http://{addr}/")));
    let opener = builder.build_opener(&Replacer::isolated()).expect("build");

    let first = Arc::clone(&opener).open_writer().expect("open");
    let second = Arc::clone(&opener).open_writer().expect("open");

    assert!(first.send(b"one\n").is_ok());
    assert!(second.send(b"two\n").is_ok());
    let mut bodies = vec![
        rx.recv_timeout(RECV_TIMEOUT).expect("request").body,
        rx.recv_timeout(RECV_TIMEOUT).expect("request").body,
    ];
    bodies.sort();
    assert_eq!(bodies, [b"one".to_vec(), b"two".to_vec()]);
}
