//! Consistent, colored user-facing messages for the CLI.
//! Colors apply only when the target stream is a TTY; log output goes
//! through `tracing` instead.

use owo_colors::OwoColorize;

fn color_stdout() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn color_stderr() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if color_stdout() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if color_stderr() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if color_stderr() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if color_stdout() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Primary output users may script against (names, byte payloads go to
/// stdout raw elsewhere); no prefix, no color.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
