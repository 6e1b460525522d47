//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! validates the root, and dispatches the requested operation.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use fsource::config::{default_config_path, load_or_init, Config, LoadResult};
use fsource::output as out;
use fsource::{shutdown, FileSource, LocalFileSource, SourceError};

use fsource::cli::{Args, Command};
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Ok(cfg_env) = std::env::var("FSOURCE_CONFIG") {
            out::print_info(&format!("Using FSOURCE_CONFIG (explicit):\n  {}\n", cfg_env));
            out::print_info("To override, unset FSOURCE_CONFIG or point it at another file.");
            return Ok(());
        }
        match default_config_path() {
            Ok(p) => {
                out::print_info(&format!("Default fsource config path:\n  {}\n", p.display()));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info(
                        "No config file exists there yet. Run any command to create a template.",
                    );
                }
            }
            Err(e) => {
                out::print_error(&format!("Could not determine a default config path: {e}"));
            }
        }
        return Ok(());
    }

    // Load config; first run writes a template and exits with instructions.
    let mut cfg = match load_or_init()? {
        LoadResult::Loaded(cfg) => cfg,
        LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!(
                "A template fsource config was written to: {}",
                path.display()
            ));
            out::print_info(
                "Edit the file to set <root> and optionally <layout>, <log_level> and <log_file>. Example:\n\n<config>\n  <root>/data/fsource</root>\n  <layout>hierarchical</layout>\n  <log_level>normal</log_level>\n</config>\n",
            );
            out::print_info("Then re-run this command. To use a different location set FSOURCE_CONFIG.");
            return Ok(());
        }
        LoadResult::NoConfig => Config::default(),
    };

    // Apply CLI overrides (CLI wins).
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal.
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
        .map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {}", e));
            e
        })?;

    // Guard needs to be dropped on SIGINT to flush logs.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush the appender
            }
        })
        .context("failed to install signal handler")?;
    }

    let Some(command) = args.command.clone() else {
        bail!("no command given; see --help");
    };

    debug!(?command, "starting fsource");

    let result = dispatch(&cfg, command);

    // Ensure logs are flushed before exit.
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn dispatch(cfg: &Config, command: Command) -> Result<()> {
    let root = cfg.validate()?;
    let src = LocalFileSource::new(root, cfg.layout);

    match command {
        Command::List => {
            let names = contract(src.list_all_names())?;
            for name in &names {
                out::print_user(name);
            }
            info!(root = %src.describe(), entries = names.len(), "listed source");
            Ok(())
        }
        Command::Cat { name } => {
            let bytes = contract(src.get_bytes(&name))?;
            io::stdout()
                .write_all(&bytes)
                .context("write artifact to stdout")?;
            Ok(())
        }
        Command::Put { name, file } => {
            contract(src.ensure_exists())?;
            let bytes = match &file {
                Some(path) => {
                    let mut f = File::open(path)
                        .with_context(|| format!("open input file '{}'", path.display()))?;
                    contract(src.add_from_reader(&name, &mut f))?
                }
                None => {
                    let mut stdin = io::stdin().lock();
                    let mut buf = Vec::new();
                    stdin.read_to_end(&mut buf).context("read stdin")?;
                    contract(src.add_bytes(&name, &buf))?;
                    buf.len() as u64
                }
            };
            out::print_success(&format!("stored '{}' ({} bytes)", name, bytes));
            Ok(())
        }
        Command::Clear => {
            contract(src.clear())?;
            out::print_success(&format!("cleared {}", src.describe()));
            Ok(())
        }
        Command::Copy {
            dest_root,
            dest_layout,
            overwrite,
        } => {
            let dest = LocalFileSource::new(dest_root, dest_layout.unwrap_or(cfg.layout));
            contract(dest.ensure_exists())?;
            preflight_space(&src, &dest)?;
            if shutdown::is_requested() {
                bail!("interrupted before copy started");
            }
            let stats = contract(dest.copy_from(&src, overwrite))?;
            out::print_success(&format!(
                "copied {} artifact(s), skipped {}, {} bytes -> {}",
                stats.copied,
                stats.skipped,
                stats.bytes,
                dest.describe()
            ));
            Ok(())
        }
    }
}

/// Refuse a copy that cannot fit on the destination filesystem.
fn preflight_space(src: &LocalFileSource, dest: &LocalFileSource) -> Result<()> {
    let mut required: u64 = 0;
    for name in contract(src.list_all_names())? {
        required = required.saturating_add(contract(src.size(&name))?);
    }
    let available = fs2::available_space(dest.root())
        .with_context(|| format!("check free space at '{}'", dest.root().display()))?;
    if required > available {
        bail!(
            "insufficient space at '{}': need {} bytes, have {} bytes",
            dest.root().display(),
            required,
            available
        );
    }
    debug!(required, available, "space preflight passed");
    Ok(())
}

/// Surface a contract error as a structured log line plus a typed failure.
fn contract<T>(result: std::result::Result<T, SourceError>) -> Result<T> {
    result.map_err(|e| {
        error!(code = e.code(), kind = e.kind(), error = %e, "operation failed");
        anyhow::Error::new(e)
    })
}
