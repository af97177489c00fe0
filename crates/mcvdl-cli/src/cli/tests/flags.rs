use super::parse;
use crate::cli::Cli;
use clap::Parser;
use mcvdl_core::config::McvConfig;
use mcvdl_core::scheduler::FailurePolicy;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_defaults() {
    let cli = parse(&["mcvdl"]);
    assert!(cli.concurrency.is_none());
    assert!(cli.out_dir.is_none());
    assert!(!cli.verbose);
    assert!(cli.listing_url.is_none());
    assert!(!cli.keep_going);
    assert!(cli.max_attempts.is_none());
    assert!(!cli.no_config);
}

#[test]
fn cli_parse_short_flags() {
    let cli = parse(&["mcvdl", "-c", "4", "-o", "/tmp/jars", "-v"]);
    assert_eq!(cli.concurrency, Some(4));
    assert_eq!(cli.out_dir.as_deref(), Some(Path::new("/tmp/jars")));
    assert!(cli.verbose);
}

#[test]
fn cli_parse_long_flags() {
    let cli = parse(&[
        "mcvdl",
        "--concurrency",
        "2",
        "--out-dir",
        "out",
        "--listing-url",
        "http://127.0.0.1:8080/",
        "--keep-going",
        "--max-attempts",
        "3",
        "--no-config",
    ]);
    assert_eq!(cli.concurrency, Some(2));
    assert_eq!(cli.out_dir.as_deref(), Some(Path::new("out")));
    assert_eq!(cli.listing_url.as_deref(), Some("http://127.0.0.1:8080/"));
    assert!(cli.keep_going);
    assert_eq!(cli.max_attempts, Some(3));
    assert!(cli.no_config);
}

#[test]
fn cli_parse_rejects_bad_values() {
    assert!(Cli::try_parse_from(["mcvdl", "-c", "many"]).is_err());
    assert!(Cli::try_parse_from(["mcvdl", "-c", "-1"]).is_err());
    assert!(Cli::try_parse_from(["mcvdl", "--max-attempts", "0"]).is_err());
    assert!(Cli::try_parse_from(["mcvdl", "download"]).is_err());
}

#[test]
fn zero_concurrency_fails_validation() {
    let cli = parse(&["mcvdl", "-c", "0", "--no-config"]);
    let cfg = cli.resolve_config().unwrap();
    let err = cfg.worker_count().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for --concurrency: must be at least 1"
    );
}

#[test]
fn overrides_replace_config_values() {
    let cli = parse(&[
        "mcvdl",
        "-c",
        "3",
        "-o",
        "jars",
        "--listing-url",
        "http://localhost/",
        "--keep-going",
        "--max-attempts",
        "5",
    ]);
    let mut cfg = McvConfig::default();
    cli.apply_overrides(&mut cfg);
    assert_eq!(cfg.concurrency, 3);
    assert_eq!(cfg.out_dir, PathBuf::from("jars"));
    assert_eq!(cfg.listing_url, "http://localhost/");
    assert_eq!(cfg.on_job_failure, FailurePolicy::SkipAndContinue);
    let retry = cfg.retry.expect("retry section");
    assert_eq!(retry.max_attempts, Some(5));
    assert_eq!(retry.initial_delay_secs, 0.5);
}

#[test]
fn no_flags_keep_config_values() {
    let cli = parse(&["mcvdl"]);
    let mut cfg = McvConfig {
        concurrency: 7,
        ..McvConfig::default()
    };
    cli.apply_overrides(&mut cfg);
    assert_eq!(cfg.concurrency, 7);
    assert_eq!(cfg.on_job_failure, FailurePolicy::FailFast);
    assert!(cfg.retry.is_none());
}
