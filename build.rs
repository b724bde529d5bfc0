//! Build script for Council
//!
//! Embeds git revision, build timestamp, target and compiler version into the
//! binary so `council version` can report them.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = run("git", &["rev-parse", "--short=8", "HEAD"]);
    let git_branch = run("git", &["rev-parse", "--abbrev-ref", "HEAD"]);
    let git_dirty = match Command::new("git").args(["status", "--porcelain"]).output() {
        Ok(out) if out.status.success() => {
            if out.stdout.is_empty() { "false" } else { "true" }
        }
        _ => "unknown",
    };

    let vars = [
        ("COUNCIL_GIT_HASH", git_hash),
        ("COUNCIL_GIT_BRANCH", git_branch),
        ("COUNCIL_GIT_DIRTY", git_dirty.to_string()),
        (
            "COUNCIL_BUILD_TIMESTAMP",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        ("COUNCIL_TARGET", cargo_var("TARGET")),
        ("COUNCIL_PROFILE", cargo_var("PROFILE")),
        ("COUNCIL_RUSTC_VERSION", run("rustc", &["--version"])),
    ];

    for (key, value) in &vars {
        println!("cargo:rustc-env={}={}", key, value);
    }
}

/// Run a command and return its trimmed stdout, or "unknown"
fn run(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn cargo_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| "unknown".to_string())
}
