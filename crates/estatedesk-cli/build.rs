//! Build script: stamps the binary version with the git revision.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let base = env!("CARGO_PKG_VERSION");
    let version = match git_revision() {
        Some(rev) => format!("{}+g{}", base, rev),
        None => base.to_string(),
    };

    println!("cargo:rustc-env=ESTATEDESK_VERSION={}", version);
}

/// Short commit hash, with `-dirty` when the tree has local changes.
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let rev = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if rev.is_empty() {
        return None;
    }

    let dirty = Command::new("git")
        .args(["status", "--porcelain", "--untracked-files=no"])
        .output()
        .ok()
        .is_some_and(|o| o.status.success() && !o.stdout.is_empty());

    Some(if dirty { format!("{}-dirty", rev) } else { rev })
}
