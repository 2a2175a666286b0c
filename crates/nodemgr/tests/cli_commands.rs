#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};

use nodemgr::frame::{FrameReader, FrameWriter};
use nodemgr::transport::{Endpoint, Listener};
use serde_json::{json, Value};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/nmcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// A fake management endpoint answering one connection from a script.
/// `None` entries read the request and never answer it.
struct FakeService {
    dir: PathBuf,
    endpoint: Endpoint,
    handle: JoinHandle<Vec<Value>>,
}

impl FakeService {
    fn start(tag: &str, script: Vec<Option<&'static str>>) -> Self {
        let dir = unique_temp_dir(tag);
        let endpoint = Endpoint::unix(dir.join("service.sock"));
        let listener = Listener::bind(&endpoint).expect("fake service should bind");

        let handle = thread::spawn(move || {
            let stream = listener.accept().expect("fake service should accept");
            let mut reader = FrameReader::new(stream.try_clone().expect("stream should clone"));
            let mut writer = FrameWriter::new(stream);
            let mut script = script.into_iter();
            let mut seen = Vec::new();
            // Runs until the client hangs up.
            while let Ok(request) = reader.read_frame() {
                seen.push(serde_json::from_slice(&request).expect("request should be json"));
                if let Some(Some(reply)) = script.next() {
                    writer.send(reply.as_bytes()).expect("reply should send");
                }
            }
            seen
        });

        Self {
            dir,
            endpoint,
            handle,
        }
    }

    fn finish(self) -> Vec<Value> {
        let seen = self.handle.join().expect("fake service should finish");
        let _ = std::fs::remove_dir_all(&self.dir);
        seen
    }
}

/// A fake NodeManager REP socket on an ephemeral loopback port, answering
/// from a script. A `None` entry reads the request and stops serving.
struct FakeZmqService {
    endpoint: Endpoint,
    handle: JoinHandle<Vec<Value>>,
}

impl FakeZmqService {
    fn start(script: Vec<Option<&'static str>>) -> Self {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::REP).expect("rep socket");
        socket.set_linger(0).expect("linger");
        socket.set_rcvtimeo(5_000).expect("receive timeout");
        socket.bind("tcp://127.0.0.1:*").expect("fake service should bind");
        let endpoint = socket
            .get_last_endpoint()
            .expect("last endpoint")
            .expect("endpoint should be utf-8")
            .parse()
            .expect("bound endpoint should parse");

        let handle = thread::spawn(move || {
            let _context = context;
            let mut seen = Vec::new();
            for step in script {
                let Ok(request) = socket.recv_bytes(0) else {
                    break;
                };
                seen.push(serde_json::from_slice(&request).expect("request should be json"));
                match step {
                    Some(reply) => socket.send(reply.as_bytes(), 0).expect("reply should send"),
                    None => break,
                }
            }
            seen
        });

        Self { endpoint, handle }
    }

    fn finish(self) -> Vec<Value> {
        self.handle.join().expect("fake service should finish")
    }
}

fn nodemgr(endpoint: &Endpoint, args: &[&str]) -> Output {
    nodemgr_over("framed", endpoint, args)
}

fn nodemgr_over(transport: &str, endpoint: &Endpoint, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nodemgr"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("--transport")
        .arg(transport)
        .arg("--endpoint")
        .arg(endpoint.to_string())
        .args(args)
        .env_remove("NODEMGR_ENDPOINT")
        .env_remove("NODEMGR_TIMEOUT")
        .env_remove("NODEMGR_TRANSPORT")
        .stdin(Stdio::null())
        .output()
        .expect("nodemgr should run")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn config_read_prints_reply() {
    let service = FakeService::start(
        "read",
        vec![Some(r#"{"code":200,"data":{"value":"3"},"dirty":0}"#)],
    );

    let output = nodemgr(
        &service.endpoint,
        &["config", "openbts", "read", "Control.NumSQLTries"],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_json(&output),
        json!({
            "service": "openbts",
            "command": "config",
            "code": 200,
            "dirty": false,
            "data": {"value": "3"}
        })
    );
    assert_eq!(
        service.finish(),
        vec![json!({
            "command": "config",
            "action": "read",
            "key": "Control.NumSQLTries",
            "value": ""
        })]
    );
}

#[test]
fn config_update_with_yes_reports_dirty() {
    let service = FakeService::start("update", vec![Some(r#"{"code":204,"dirty":"1"}"#)]);

    let output = nodemgr(
        &service.endpoint,
        &["config", "openbts", "update", "GSM.Radio.C0", "51", "--yes"],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let reply = stdout_json(&output);
    assert_eq!(reply["code"], 204);
    assert_eq!(reply["dirty"], true);
    assert!(reply.get("data").is_none());

    let seen = service.finish();
    assert_eq!(seen[0]["action"], "update");
    assert_eq!(seen[0]["value"], "51");
}

#[test]
fn config_update_without_yes_is_refused_before_connecting() {
    let dir = unique_temp_dir("refuse");
    let endpoint = Endpoint::unix(dir.join("absent.sock"));

    let output = nodemgr(&endpoint, &["config", "openbts", "update", "GSM.Radio.C0", "51"]);

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--yes"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_key_exits_data_invalid() {
    let service = FakeService::start("404", vec![Some(r#"{"code":404}"#)]);

    let output = nodemgr(&service.endpoint, &["config", "smqueue", "read", "No.Such.Key"]);

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown key"));
    assert!(output.stdout.is_empty());
    service.finish();
}

#[test]
fn config_create_and_delete_fail_before_connecting() {
    let dir = unique_temp_dir("unsupported");
    let endpoint = Endpoint::unix(dir.join("absent.sock"));

    for args in [
        &["config", "openbts", "create", "New.Key", "1"][..],
        &["config", "smqueue", "delete", "Old.Key"][..],
    ] {
        let output = nodemgr(&endpoint, args);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(output.status.code(), Some(64), "{args:?}: {stderr}");
        assert!(stderr.contains("not supported"), "{args:?}: {stderr}");
        assert!(!stderr.contains("connect"), "{args:?}: {stderr}");
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn silent_service_times_out_with_124() {
    let service = FakeService::start("silent", vec![None]);

    let output = nodemgr(
        &service.endpoint,
        &["--timeout", "200ms", "version", "openbts"],
    );

    assert_eq!(output.status.code(), Some(124));
    assert_eq!(service.finish().len(), 1);
}

#[test]
fn missing_endpoint_is_transport_error() {
    let dir = unique_temp_dir("missing");
    let endpoint = Endpoint::unix(dir.join("absent.sock"));

    let output = nodemgr(&endpoint, &["version", "sipauthserve"]);

    assert_eq!(output.status.code(), Some(3));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn monitor_against_openbts() {
    let service = FakeService::start(
        "monitor",
        vec![Some(r#"{"code":200,"data":{"noiseRSSI":-67,"msgqueue":3}}"#)],
    );

    let output = nodemgr(&service.endpoint, &["monitor"]);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["data"]["noiseRSSI"], -67);
    assert_eq!(service.finish()[0]["command"], "monitor");
}

#[test]
fn subscriber_create_and_delete() {
    let service = FakeService::start("sub-create", vec![Some(r#"{"code":204}"#)]);
    let output = nodemgr(
        &service.endpoint,
        &["subscribers", "create", "ada", "001010000000001", "5550001", "--yes"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        service.finish(),
        vec![json!({
            "command": "subscribers",
            "action": "create",
            "fields": {"name": "ada", "imsi": "001010000000001", "msisdn": "5550001", "ki": ""}
        })]
    );

    let service = FakeService::start("sub-delete", vec![Some(r#"{"code":200}"#)]);
    let output = nodemgr(
        &service.endpoint,
        &["subscribers", "delete", "--msisdn", "5550001", "--yes"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        service.finish(),
        vec![json!({"command": "subscribers", "action": "delete", "match": {"msisdn": "5550001"}})]
    );
}

#[test]
fn raw_format_prints_bare_data() {
    let service = FakeService::start(
        "raw",
        vec![Some(r#"{"code":200,"data":"release 4.0.0.8025"}"#)],
    );

    let output = Command::new(env!("CARGO_BIN_EXE_nodemgr"))
        .args(["--log-level", "error", "--format", "raw", "--transport", "framed"])
        .arg("--endpoint")
        .arg(service.endpoint.to_string())
        .args(["version", "smqueue"])
        .output()
        .expect("nodemgr should run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "release 4.0.0.8025\n");
    service.finish();
}

#[test]
fn zmq_is_the_default_transport() {
    let service = FakeZmqService::start(vec![Some(r#"{"code":200,"data":{"value":"3"},"dirty":0}"#)]);

    let output = Command::new(env!("CARGO_BIN_EXE_nodemgr"))
        .args(["--log-level", "error", "--format", "json", "--endpoint"])
        .arg(service.endpoint.to_string())
        .args(["config", "openbts", "read", "Control.NumSQLTries"])
        .env_remove("NODEMGR_TRANSPORT")
        .stdin(Stdio::null())
        .output()
        .expect("nodemgr should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["data"]["value"], "3");
    assert_eq!(
        service.finish(),
        vec![json!({
            "command": "config",
            "action": "read",
            "key": "Control.NumSQLTries",
            "value": ""
        })]
    );
}

#[test]
fn zmq_update_reports_dirty() {
    let service = FakeZmqService::start(vec![Some(r#"{"code":204,"dirty":1}"#)]);

    let output = nodemgr_over(
        "zmq",
        &service.endpoint,
        &["config", "sipauthserve", "update", "Log.Level", "INFO", "--yes"],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["dirty"], true);
    assert_eq!(service.finish()[0]["value"], "INFO");
}

#[test]
fn zmq_silent_service_times_out_with_124() {
    let service = FakeZmqService::start(vec![None]);

    let started = std::time::Instant::now();
    let output = nodemgr_over(
        "zmq",
        &service.endpoint,
        &["--timeout", "200ms", "version", "openbts"],
    );

    assert_eq!(output.status.code(), Some(124));
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert_eq!(service.finish().len(), 1);
}
