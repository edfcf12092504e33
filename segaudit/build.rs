//! Build script for segaudit
//!
//! Captures build identification at compile time: short git hash, build
//! timestamp and build profile, exposed to the binary as `env!` values.

use std::process::Command;

fn main() {
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // RFC 3339 with local offset, e.g. 2025-10-26T14:30:45-05:00
    let build_timestamp = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=SEGAUDIT_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=SEGAUDIT_BUILD_TIMESTAMP={build_timestamp}");
    println!("cargo:rustc-env=SEGAUDIT_BUILD_PROFILE={profile}");
}
