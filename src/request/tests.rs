//! Request builder tests.

use super::*;
use crate::config::{AdditionalLabel, LabelProcessor, ProbeConfig, ResolveFirst};
use crate::error_handling::{FailureKind, ResolveError};
use crate::resolver::{Resolve, ResolveRequest, Resolving, StaticResolver};
use crate::target::{IpVersion, Target, TargetSetContext};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Resolver that counts lookups and records the requested IP version.
struct CountingResolver {
    calls: Arc<AtomicUsize>,
    versions: Arc<Mutex<Vec<IpVersion>>>,
    ip: IpAddr,
}

impl Resolve for CountingResolver {
    fn resolve(&self, request: ResolveRequest) -> Resolving {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.versions.lock().unwrap().push(request.ip_version);
        let ip = self.ip;
        Box::pin(async move { Ok(ip) })
    }
}

fn counting(ip: &str) -> (Arc<dyn Resolve>, Arc<AtomicUsize>, Arc<Mutex<Vec<IpVersion>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let versions = Arc::new(Mutex::new(Vec::new()));
    let resolver: Arc<dyn Resolve> = Arc::new(CountingResolver {
        calls: Arc::clone(&calls),
        versions: Arc::clone(&versions),
        ip: ip.parse().unwrap(),
    });
    (resolver, calls, versions)
}

fn ctx() -> TargetSetContext {
    TargetSetContext::new("test-targets")
}

/// Processor that records every (address, port) it is called with.
fn recording_processor() -> (Arc<dyn LabelProcessor>, Arc<Mutex<Vec<(String, u16)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let processor: Arc<dyn LabelProcessor> =
        Arc::new(move |_target: &mut Target, address: &str, port: u16| {
            sink.lock().unwrap().push((address.to_string(), port));
        });
    (processor, seen)
}

#[tokio::test]
async fn test_fqdn_with_config_port() {
    let mut target = Target::new("a.com").with_label("fqdn", "a.example.com");
    let config = ProbeConfig::default()
        .with_protocol("https")
        .with_port(8443)
        .with_path("");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "https://a.example.com:8443");
    assert_eq!(req.host_header, "a.example.com:8443");
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.target, "a.com");
}

#[tokio::test]
async fn test_resolve_first_ipv6_is_bracketed_in_url_only() {
    let (resolver, calls, _) = counting("::1");
    let mut target = Target::new("b")
        .with_ip("::1".parse().unwrap())
        .with_resolver(resolver);
    let config = ProbeConfig::default().with_resolve_first(ResolveFirst::Enabled);

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(req.url, "http://[::1]");
    assert_eq!(req.host_header, "b");
}

#[tokio::test]
async fn test_resolve_first_ipv6_with_port() {
    let mut target = Target::new("b")
        .with_port(9313)
        .with_resolver(Arc::new(StaticResolver::new("2001:db8::7".parse().unwrap())));
    let config = ProbeConfig::default()
        .with_resolve_first(true)
        .with_path("/metrics");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://[2001:db8::7]:9313/metrics");
    assert_eq!(req.host_header, "b:9313");
    assert_eq!(req.parsed_url().port(), Some(9313));
}

#[tokio::test]
async fn test_resolve_first_ipv4_not_bracketed() {
    let mut target = Target::new("c")
        .with_label("fqdn", "c.example.com")
        .with_resolver(Arc::new(StaticResolver::new("192.0.2.5".parse().unwrap())));
    let config = ProbeConfig::default().with_resolve_first(true).with_port(80);

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://192.0.2.5:80");
    assert_eq!(req.host_header, "c.example.com:80");
}

#[tokio::test]
async fn test_ipv6_name_bracketed_without_resolution() {
    let mut target = Target::new("2001:db8::1").with_port(8080);
    let config = ProbeConfig::default();

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://[2001:db8::1]:8080");
    // Host header is never bracket-wrapped
    assert_eq!(req.host_header, "2001:db8::1:8080");
}

#[tokio::test]
async fn test_probe_host_header_overrides_in_both_modes() {
    let config = ProbeConfig::default()
        .with_header("Host", "probe.example.com")
        .with_port(443);

    let mut target = Target::new("a.com").with_label("fqdn", "a.example.com");
    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.host_header, "probe.example.com");
    assert!(!req.headers.contains_key("Host"));

    let mut target = Target::new("a.com")
        .with_label("fqdn", "a.example.com")
        .with_resolver(Arc::new(StaticResolver::new("192.0.2.9".parse().unwrap())));
    let config = config.with_resolve_first(true);
    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://192.0.2.9:443");
    assert_eq!(req.host_header, "probe.example.com");
}

#[tokio::test]
async fn test_empty_probe_host_header_falls_through() {
    let config = ProbeConfig::default()
        .with_header("Host", "first.example.com")
        .with_header("Host", "");
    let mut target = Target::new("a.com");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.host_header, "a.com");
}

#[tokio::test]
async fn test_relative_url_label_only_without_override() {
    let mut target = Target::new("a.com").with_label("relative_url", "/from-label");

    let req = build_request(&mut target, &ProbeConfig::default(), &ctx())
        .await
        .unwrap();
    assert_eq!(req.url, "http://a.com/from-label");

    let config = ProbeConfig::default().with_path("/from-config");
    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://a.com/from-config");
}

#[tokio::test]
async fn test_port_precedence() {
    // Config port wins over the target's port
    let mut target = Target::new("a.com").with_port(8080);
    let config = ProbeConfig::default().with_port(9090);
    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://a.com:9090");
    assert_eq!(req.host_header, "a.com:9090");

    // Target port when the config doesn't set one
    let req = build_request(&mut target, &ProbeConfig::default(), &ctx())
        .await
        .unwrap();
    assert_eq!(req.url, "http://a.com:8080");
    assert_eq!(req.host_header, "a.com:8080");

    // No suffix when neither is set
    let mut target = Target::new("a.com");
    let req = build_request(&mut target, &ProbeConfig::default(), &ctx())
        .await
        .unwrap();
    assert_eq!(req.url, "http://a.com");
    assert_eq!(req.host_header, "a.com");
}

#[tokio::test]
async fn test_unset_resolve_first_follows_target_ip() {
    let (resolver, calls, versions) = counting("198.51.100.20");
    let mut target = Target::new("d")
        .with_ip("198.51.100.20".parse().unwrap())
        .with_resolver(resolver);
    let config = ProbeConfig::default().with_ip_version(IpVersion::V4);

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://198.51.100.20");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*versions.lock().unwrap(), vec![IpVersion::V4]);

    let (resolver, calls, _) = counting("198.51.100.20");
    let mut target = Target::new("d").with_resolver(resolver);
    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://d");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_explicit_false_beats_preset_ip() {
    let (resolver, calls, _) = counting("198.51.100.20");
    let (processor, seen) = recording_processor();
    let mut target = Target::new("e")
        .with_port(81)
        .with_ip("198.51.100.20".parse().unwrap())
        .with_resolver(resolver);
    let config = ProbeConfig::default()
        .with_resolve_first(ResolveFirst::Disabled)
        .with_label_processor(processor);

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(req.url, "http://e:81");
    // Processors get the empty sentinel, not the pre-set address
    assert_eq!(*seen.lock().unwrap(), vec![(String::new(), 81)]);
}

#[tokio::test]
async fn test_processors_receive_resolved_address() {
    let (processor, seen) = recording_processor();
    let mut target = Target::new("f")
        .with_resolver(Arc::new(StaticResolver::new("192.0.2.77".parse().unwrap())));
    let config = ProbeConfig::default()
        .with_resolve_first(true)
        .with_port(8000)
        .with_label_processor(processor)
        .with_label_processor(Arc::new(AdditionalLabel::new(
            "dst",
            "@target.name@@@target.ip@",
        )));

    build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("192.0.2.77".to_string(), 8000)]
    );
    assert_eq!(
        target.labels.get("dst").map(String::as_str),
        Some("f@192.0.2.77")
    );
}

#[tokio::test]
async fn test_processors_run_in_order_before_url_host() {
    let first = |target: &mut Target, _: &str, _: u16| {
        target
            .labels
            .insert("fqdn".to_string(), "first.example.com".to_string());
    };
    let second = |target: &mut Target, _: &str, _: u16| {
        target
            .labels
            .insert("fqdn".to_string(), "second.example.com".to_string());
    };
    let config = ProbeConfig::default()
        .with_label_processor(Arc::new(first))
        .with_label_processor(Arc::new(second));
    let mut target = Target::new("g");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.url, "http://second.example.com");
    assert_eq!(req.host_header, "second.example.com");
}

#[tokio::test]
async fn test_resolve_failure_is_reported_per_target() {
    let (processor, seen) = recording_processor();
    let mut target = Target::new("h").with_resolver(Arc::new(StaticResolver::failing(
        ResolveError::Lookup {
            name: "h".to_string(),
            cause: "no such host".to_string(),
        },
    )));
    let config = ProbeConfig::default()
        .with_resolve_first(true)
        .with_label_processor(processor);

    let err = build_request(&mut target, &config, &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Resolve);
    assert_eq!(err.target(), "h");
    assert!(err.cause().contains("no such host"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_method() {
    let mut target = Target::new("a.com");
    let config = ProbeConfig::default().with_method("BAD METHOD");

    let err = build_request(&mut target, &config, &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Malformed);
    assert_eq!(err.target(), "a.com");
}

#[tokio::test]
async fn test_malformed_url() {
    let mut target = Target::new("a.com");
    let config = ProbeConfig::default().with_protocol("ht tp");

    let err = build_request(&mut target, &config, &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Malformed);

    let mut target = Target::new("");
    let err = build_request(&mut target, &ProbeConfig::default(), &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Malformed);
}

#[tokio::test]
async fn test_custom_method_accepted() {
    let mut target = Target::new("a.com");
    let config = ProbeConfig::default().with_method("PURGE");
    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.method.as_str(), "PURGE");
}

#[tokio::test]
async fn test_headers_later_entries_overwrite() {
    let config = ProbeConfig::default()
        .with_header("X-Probe", "1")
        .with_header("Accept", "text/plain")
        .with_header("X-Probe", "2");
    let mut target = Target::new("a.com");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.headers.len(), 2);
    assert_eq!(req.headers.get("X-Probe").map(String::as_str), Some("2"));
    assert_eq!(
        req.headers.get("Accept").map(String::as_str),
        Some("text/plain")
    );
}

#[tokio::test]
async fn test_body_and_content_length() {
    let config = ProbeConfig::default()
        .with_method("POST")
        .with_body(r#"{"probe":true}"#);
    let mut target = Target::new("a.com");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.content_length, 14);
    let body = req.body.as_ref().expect("non-empty body should be wrapped");

    let mut small = [0u8; 4];
    let read = body.read(&mut small);
    assert_eq!(read.bytes_read, 4);
    assert!(read.end_of_stream);
    assert_eq!(&small, br#"{"pr"#);

    let mut again = [0u8; 4];
    body.read(&mut again);
    assert_eq!(&again, br#"{"pr"#);
}

#[tokio::test]
async fn test_empty_body_not_wrapped() {
    let mut target = Target::new("a.com");
    let req = build_request(&mut target, &ProbeConfig::default(), &ctx())
        .await
        .unwrap();
    assert!(req.body.is_none());
    assert_eq!(req.content_length, 0);
}

#[tokio::test]
async fn test_requests_share_body_buffer() {
    let config = ProbeConfig::default().with_body(vec![7u8; 32]);
    let mut a = Target::new("a.com");
    let mut b = Target::new("b.com");

    let req_a = build_request(&mut a, &config, &ctx()).await.unwrap();
    let req_b = build_request(&mut b, &config, &ctx()).await.unwrap();
    let body_a = req_a.body.unwrap().bytes();
    let body_b = req_b.body.unwrap().bytes();
    assert_eq!(body_a.as_ptr(), body_b.as_ptr());
    assert_eq!(body_a.as_ptr(), config.body.as_ptr());
}

#[tokio::test]
async fn test_to_reqwest_carries_host_and_body() {
    let config = ProbeConfig::default()
        .with_method("PUT")
        .with_header("X-Probe", "yes")
        .with_header("Host", "vhost.example.com")
        .with_body("payload");
    let mut target = Target::new("a.com").with_port(8080);

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    let wire = req.to_reqwest().unwrap();

    assert_eq!(wire.method(), &Method::PUT);
    assert_eq!(wire.url().as_str(), "http://a.com:8080/");
    assert_eq!(wire.headers()[HOST], "vhost.example.com");
    assert_eq!(wire.headers()["x-probe"], "yes");
    assert_eq!(wire.headers()[CONTENT_LENGTH], "7");
    assert_eq!(
        wire.body().and_then(|b| b.as_bytes()),
        Some(&b"payload"[..])
    );
}

#[tokio::test]
async fn test_to_reqwest_rejects_invalid_header() {
    let config = ProbeConfig::default().with_header("Bad Header", "x");
    let mut target = Target::new("a.com");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    let err = req.to_reqwest().unwrap_err();
    assert_eq!(err.kind(), FailureKind::Malformed);
    assert_eq!(err.target(), "a.com");
}

#[tokio::test]
async fn test_concurrent_builds_do_not_interfere() {
    let config = Arc::new(
        ProbeConfig::default()
            .with_port(8080)
            .with_body("shared")
            .with_label_processor(Arc::new(AdditionalLabel::new(
                "probe_target",
                "@target.name@:@target.port@",
            ))),
    );

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let config = Arc::clone(&config);
            tokio::spawn(async move {
                let mut target = Target::new(format!("host-{i}"))
                    .with_label("fqdn", format!("host-{i}.example.com"));
                let req = build_request(&mut target, &config, &ctx()).await.unwrap();
                (i, target, req)
            })
        })
        .collect();

    for handle in handles {
        let (i, target, req) = handle.await.unwrap();
        assert_eq!(req.url, format!("http://host-{i}.example.com:8080"));
        assert_eq!(req.host_header, format!("host-{i}.example.com:8080"));
        assert_eq!(
            target.labels.get("probe_target"),
            Some(&format!("host-{i}:8080"))
        );
    }
}

#[tokio::test]
async fn test_headers_and_host_override_in_one_build() {
    let config = ProbeConfig::default()
        .with_header("Accept", "*/*")
        .with_header("Host", "vhost.example.com")
        .with_header("X-Probe", "1");
    let mut target = Target::new("a.com").with_label("fqdn", "a.example.com");

    let req = build_request(&mut target, &config, &ctx()).await.unwrap();
    assert_eq!(req.host_header, "vhost.example.com");
    assert_eq!(req.headers.len(), 2);
    assert_eq!(req.headers.get("Accept").map(String::as_str), Some("*/*"));
    assert_eq!(req.headers.get("X-Probe").map(String::as_str), Some("1"));
    assert!(!req.headers.contains_key("Host"));
}

#[tokio::test]
async fn test_fqdn_with_port_is_bracketed_and_rejected() {
    // Any host containing ':' is treated as an IPv6 literal
    let mut target = Target::new("a.com").with_label("fqdn", "a.example.com:8080");

    let err = build_request(&mut target, &ProbeConfig::default(), &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Malformed);
    assert!(err.cause().contains("[a.example.com:8080]"));
}
