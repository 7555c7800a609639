//! Workspace checks, run as `cargo run -p xtask -- <command>`.

use anyhow::Context;
use serde::Deserialize;

/// Internal crates each workspace member may depend on.
const LAYERS: &[(&str, &[&str])] = &[
    ("playroom-domain", &[]),
    ("playroom-shared", &["playroom-domain"]),
    ("playroom-client", &["playroom-domain", "playroom-shared"]),
];

/// Crates the pure layers must never pull in. The rules engine and the
/// store contracts stay host-agnostic; only the client touches a runtime.
const PURE_LAYERS: &[&str] = &["playroom-domain", "playroom-shared"];
const RUNTIME_CRATES: &[&str] = &["tokio", "reqwest", "tracing-subscriber"];

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

#[derive(Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Deserialize)]
struct Dependency {
    name: String,
}

/// Verify the domain -> shared -> client layering from cargo metadata.
fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata")?;

    let mut violations = Vec::new();
    for package in &metadata.packages {
        let Some((_, allowed)) = LAYERS.iter().find(|(name, _)| *name == package.name) else {
            continue;
        };
        for dep in &package.dependencies {
            if dep.name.starts_with("playroom-") && !allowed.contains(&dep.name.as_str()) {
                violations.push(format!(
                    "{} must not depend on internal crate {}",
                    package.name, dep.name
                ));
            }
            if PURE_LAYERS.contains(&package.name.as_str())
                && RUNTIME_CRATES.contains(&dep.name.as_str())
            {
                violations.push(format!(
                    "{} must stay runtime-free but depends on {}",
                    package.name, dep.name
                ));
            }
        }
    }

    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("arch-check: {violation}");
        }
        anyhow::bail!("{} architecture violation(s)", violations.len())
    }

    println!("arch-check: {} workspace crates ok", metadata.packages.len());
    Ok(())
}
