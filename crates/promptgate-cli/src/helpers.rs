//! Shared CLI helpers — response printing, version banner.

use colored::Colorize;

/// Print a provider response to stdout.
pub fn print_response(provider: &str, response: &str) {
    println!();
    println!("{}", format!("⚡ {provider}").cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print a provider error to stderr.
pub fn print_error(message: &str) {
    eprintln!();
    eprintln!("{} {}", "✗".red().bold(), message);
    eprintln!();
}

/// Print the banner shown when the gateway starts.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "⚡ PromptGate".cyan().bold(), version.dimmed());
    println!();
}

/// Status marker used by the `status` command.
pub fn mark(ok: bool, detail: &str) -> String {
    if ok {
        format!("{} {}", "✓".green(), detail)
    } else {
        format!("{}", format!("· {detail}").dimmed())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
