//! Drives a filesystem-backed load from parsed [`CliArgs`] (§2.2): a
//! single-file load, a `--watch` loop re-loading on filesystem events, or
//! a `scan <dir>` whole-project walk parallelized with `rayon`.

use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use notify::{RecursiveMode, Watcher};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::cli::args::{CliArgs, Command};
use crate::FsHost;
use tsdoc_loader::Orchestrator;
use tsdoc_model::Asset;

pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Some(Command::Scan { dir, pretty }) => scan(&dir, pretty),
        None => {
            let file = args
                .file
                .context("a file argument or the `scan <dir>` subcommand is required")?;
            if args.watch {
                watch(&file, args.symbols.as_deref())
            } else {
                load_and_print(&file, args.symbols.as_deref(), args.pretty)
            }
        }
    }
}

fn load_and_print(file: &Path, symbols: Option<&[String]>, pretty: bool) -> Result<()> {
    let host = FsHost::new();
    let asset = load_one(&host, file, symbols)?;
    print_asset(&asset, pretty)
}

fn load_one(host: &FsHost, file: &Path, symbols: Option<&[String]>) -> Result<Asset> {
    let canonical = std::fs::canonicalize(file)
        .with_context(|| format!("cannot find {}", file.display()))?;
    Orchestrator::new()
        .load(host, &canonical, symbols)
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn print_asset(asset: &Asset, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(asset)?
    } else {
        serde_json::to_string(asset)?
    };
    println!("{json}");
    Ok(())
}

/// Walks `dir` with `walkdir`, loads every source file in parallel with
/// `rayon`, all against one shared `LoaderCache` (§2.2 "demonstrating
/// cache sharing across concurrent different entry files").
fn scan(dir: &Path, pretty: bool) -> Result<()> {
    let host = FsHost::new();
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| is_source_file(path))
        .collect();

    let results: Vec<(PathBuf, Result<Asset, tsdoc_common::TsDocError>)> = files
        .par_iter()
        .map(|file| (file.clone(), Orchestrator::new().load(&host, file, None)))
        .collect();

    for (file, result) in results {
        match result {
            Ok(asset) => print_asset(&asset, pretty)?,
            Err(e) => eprintln!("{} {}: {e}", "error".red().bold(), file.display()),
        }
    }
    Ok(())
}

fn is_source_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let name = path.to_string_lossy();
    if name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts") {
        return false;
    }
    name.ends_with(".ts") || name.ends_with(".tsx")
}

/// Loads once, then watches the entry file's directory (recursively) and
/// reloads on every event, invalidating only the paths that changed
/// before reloading (§2.2, §9 "a cache invalidation issued by the
/// external host during a live load").
fn watch(file: &Path, symbols: Option<&[String]>) -> Result<()> {
    let host = FsHost::new();
    let canonical = std::fs::canonicalize(file)
        .with_context(|| format!("cannot find {}", file.display()))?;

    load_and_report(&host, &canonical, symbols);

    let (tx, rx) = channel();
    let mut watcher =
        notify::recommended_watcher(tx).context("failed to start filesystem watcher")?;
    let root = canonical.parent().unwrap_or_else(|| Path::new("."));
    watcher
        .watch(root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", root.display()))?;

    loop {
        match rx.recv_timeout(Duration::from_secs(3600)) {
            Ok(Ok(event)) => {
                for path in event.paths {
                    host.invalidate(&path);
                }
                load_and_report(&host, &canonical, symbols);
            }
            Ok(Err(e)) => eprintln!("{} watch error: {e}", "warning".yellow().bold()),
            Err(_) => break,
        }
    }
    Ok(())
}

fn load_and_report(host: &FsHost, file: &Path, symbols: Option<&[String]>) {
    match Orchestrator::new().load(host, file, symbols) {
        Ok(asset) => match serde_json::to_string(&asset) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{} failed to serialize result: {e}", "error".red().bold()),
        },
        Err(e) => eprintln!("{} {e}", "error".red().bold()),
    }
}
