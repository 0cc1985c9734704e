// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ssd`: the storage-script adapter daemon.

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use ss_daemon::{run, Config};

#[derive(Debug, Parser)]
#[command(name = "ssd", about = "Script-backed storage adapter daemon", version)]
struct Args {
    /// Directory containing the volume/ and datapath/ plugin trees
    #[arg(long, default_value = "/usr/libexec/ssd")]
    root: PathBuf,

    /// Path to the attached-SR state file
    #[arg(long, default_value = "/var/run/nonpersistent/ssd/state.json")]
    state: PathBuf,

    /// Directory holding per-queue switch sockets
    #[arg(long, default_value = "/var/run/ssd/switch")]
    switch_dir: PathBuf,

    /// Switch queue name of the metric-registration service
    #[arg(long, default_value = "org.xen.xcp.rrdd")]
    metrics_queue: String,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

    match &args.log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file = path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("ssd.log"));
            let appender = tracing_appender::rolling::never(dir, file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
            None
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let _guard = init_tracing(&args);

    let config = Config {
        root: args.root,
        state: args.state,
        switch_dir: args.switch_dir,
        metrics_queue: args.metrics_queue,
    };

    match run(config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e}");
            eprintln!("ssd: {e}");
            std::process::exit(1);
        }
    }
}
