//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `probe_request` library that builds, without
//! sending, the request a probe would issue for each target given on the
//! command line and prints it.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Instant;

use probe_request::config::{DEFAULT_METHOD, DEFAULT_PROTOCOL, DEFAULT_RESOLVE_TIMEOUT};
use probe_request::initialization::init_logger_with;
use probe_request::{
    build_requests_with_failures, AdditionalLabel, BuildStats, IpVersion, LogFormat, LogLevel,
    ProbeConfig, ProbeRequest, Target, TargetSetContext,
};

/// Build the HTTP requests an HTTP probe would send to each target.
#[derive(Debug, Parser)]
#[command(name = "probe_request", version)]
struct Cli {
    /// Target names
    #[arg(required = true)]
    targets: Vec<String>,

    /// URL scheme
    #[arg(long, default_value = DEFAULT_PROTOCOL)]
    protocol: String,

    /// HTTP method
    #[arg(long, default_value = DEFAULT_METHOD)]
    method: String,

    /// Port override (takes precedence over --target-port)
    #[arg(long)]
    port: Option<u16>,

    /// URL path override (takes precedence over the relative_url label)
    #[arg(long)]
    path: Option<String>,

    /// Resolve targets before building the URL (default: only targets with an IP)
    #[arg(long)]
    resolve_first: Option<bool>,

    /// Request header as NAME:VALUE; a Host header overrides the target-derived one
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Request body
    #[arg(long)]
    body: Option<String>,

    /// IP family to resolve targets to
    #[arg(long, value_enum, default_value_t = IpVersion::Any)]
    ip_version: IpVersion,

    /// Label applied to every target as KEY=VALUE (e.g. fqdn=a.example.com)
    #[arg(long = "label", value_parser = parse_key_value)]
    labels: Vec<(String, String)>,

    /// Label rendered per target as KEY=TEMPLATE (e.g. dst=@target.name@)
    #[arg(long = "additional-label", value_parser = parse_key_value)]
    additional_labels: Vec<(String, String)>,

    /// Port applied to every target
    #[arg(long, default_value_t = 0)]
    target_port: u16,

    /// Pre-resolved address applied to every target
    #[arg(long)]
    target_ip: Option<IpAddr>,

    /// Deadline for resolving all targets, in seconds
    #[arg(long, default_value_t = DEFAULT_RESOLVE_TIMEOUT.as_secs())]
    resolve_timeout_secs: u64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got {s:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    fn probe_config(&self) -> ProbeConfig {
        let mut config = ProbeConfig {
            protocol: self.protocol.clone(),
            method: self.method.clone(),
            port: self.port,
            path: self.path.clone(),
            resolve_first: self.resolve_first.into(),
            ip_version: self.ip_version,
            headers: self.headers.clone(),
            ..Default::default()
        };
        if let Some(body) = &self.body {
            config = config.with_body(body.clone().into_bytes());
        }
        for (key, template) in &self.additional_labels {
            config = config.with_label_processor(Arc::new(AdditionalLabel::new(key, template)));
        }
        config
    }

    fn targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .map(|name| {
                let mut target = Target::new(name).with_port(self.target_port);
                target.ip = self.target_ip;
                for (key, value) in &self.labels {
                    target.labels.insert(key.clone(), value.clone());
                }
                target
            })
            .collect()
    }
}

fn print_request(request: &ProbeRequest) {
    println!(
        "{}: {} {} (Host: {})",
        request.target, request.method, request.url, request.host_header
    );
    let headers: BTreeMap<_, _> = request.headers.iter().collect();
    for (name, value) in headers {
        println!("    {name}: {value}");
    }
    if request.content_length > 0 {
        println!("    Content-Length: {}", request.content_length);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = cli.probe_config();
    let mut targets = cli.targets();
    let ctx = TargetSetContext::new("cli")
        .with_deadline(Instant::now() + Duration::from_secs(cli.resolve_timeout_secs));
    let stats = BuildStats::new();

    let outcome = build_requests_with_failures(&mut targets, &config, &ctx, &stats).await;
    for request in &outcome.requests {
        print_request(request);
    }
    for target in targets.iter().filter(|t| !t.labels.is_empty()) {
        log::debug!("target {} labels: {:?}", target.name, target.labels);
    }

    if outcome.requests.is_empty() {
        eprintln!(
            "probe_request error: no request could be built ({} failure{})",
            stats.total_failures(),
            if stats.total_failures() == 1 { "" } else { "s" }
        );
        process::exit(1);
    }
    Ok(())
}
