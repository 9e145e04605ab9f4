// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=VIEW_SYNTHESIS_VERSION");

    // Packaged builds pin the version explicitly
    let version = match std::env::var("VIEW_SYNTHESIS_VERSION") {
        Ok(v) => v,
        Err(_) => describe_version(),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version from `git describe`, falling back to the crate version when the
/// source tree is not a git checkout.
fn describe_version() -> String {
    let described = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string());

    let Some(described) = described else {
        return std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    };

    let described = described.strip_prefix('v').unwrap_or(&described);

    // "0.1.0-5-gabcdef1" (commits after a tag) becomes "0.1.0-dirty-abcdef1"
    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() == 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        format!("{}-dirty-{}", parts[2], hash)
    } else {
        described.to_string()
    }
}
