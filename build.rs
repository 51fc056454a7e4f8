use std::process::Command;

const VERSION_ENV: &str = "PREP_BOARD_VERSION";

fn strip_tag_prefix(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.strip_prefix('v') {
        Some(rest) if rest.starts_with(|ch: char| ch.is_ascii_digit()) => rest,
        _ => raw,
    }
}

/// Short commit hash of HEAD, with a `-dirty` suffix for uncommitted trees.
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--exclude", "*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let revision = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!revision.is_empty()).then_some(revision)
}

fn main() {
    println!("cargo:rerun-if-env-changed={VERSION_ENV}");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let package = env!("CARGO_PKG_VERSION");
    let version = match std::env::var(VERSION_ENV) {
        Ok(raw) if !strip_tag_prefix(&raw).is_empty() => strip_tag_prefix(&raw).to_string(),
        _ => match git_revision() {
            Some(revision) => format!("{package}+{revision}"),
            None => package.to_string(),
        },
    };

    println!("cargo:rustc-env=PREP_BOARD_BUILD_VERSION={version}");
}
