//! quotient-bench-harness
//!
//! Run small end-to-end benchmarks (generate -> run -> explain conflicts)
//! and append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run -p quotient-bench-harness -- --profile configs/profiles/small.toml
//!   cargo run -p quotient-bench-harness -- --commands 5000 --repeats 3

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use quotient_script::{generate_script, GeneratorConfig, RunEvent, Runner};

#[derive(Debug, Deserialize)]
struct Profile {
    /// Commands per generated script
    commands: u32,
    /// Variables in the vocabulary
    variables: u32,
    /// Constants in the vocabulary
    constants: u32,
    /// Function applications in the vocabulary
    applications: u32,
    /// Base RNG seed (bumped per repeat)
    seed: u64,
    /// Repetitions of the whole pipeline
    repeats: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            commands: 2000,
            variables: 32,
            constants: 8,
            applications: 64,
            seed: 42,
            repeats: 3,
        }
    }
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

fn main() -> Result<()> {
    let profile_path = parse_flag("profile", "");
    let mut profile = if profile_path.is_empty() {
        Profile::default()
    } else {
        let src = fs::read_to_string(&profile_path)
            .with_context(|| format!("read profile {profile_path:?}"))?;
        toml::from_str(&src).context("parse profile toml")?
    };
    // Command-line overrides for quick sweeps.
    if let Ok(commands) = parse_flag("commands", "").parse() {
        profile.commands = commands;
    }
    if let Ok(repeats) = parse_flag("repeats", "").parse() {
        profile.repeats = repeats;
    }

    println!(
        "Profile: commands={}, vars={}, consts={}, apps={}, seed={}, repeats={}",
        profile.commands,
        profile.variables,
        profile.constants,
        profile.applications,
        profile.seed,
        profile.repeats
    );

    fs::create_dir_all("benchmarks/reports").ok();
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)?;
    writeln!(csv, "timestamp,commands,seed,repeat,stage,ms,extra")?;

    for rep in 0..profile.repeats {
        let cfg = GeneratorConfig {
            commands: profile.commands,
            variables: profile.variables,
            constants: profile.constants,
            applications: profile.applications,
            seed: profile.seed + u64::from(rep),
            ..GeneratorConfig::default()
        };

        // 1) generate
        let t0 = Instant::now();
        let script = generate_script(&cfg);
        let t_gen = t0.elapsed();
        writeln!(
            csv,
            "{ts},{},{},{rep},generate,{},decls={}",
            profile.commands,
            cfg.seed,
            dur_ms(t_gen),
            script.decls.len()
        )?;

        // 2) run
        let t0 = Instant::now();
        let report = Runner::run(&script)?;
        let t_run = t0.elapsed();
        let conflicts = report
            .events
            .iter()
            .filter(|e| matches!(e, RunEvent::Conflict { .. }))
            .count();
        writeln!(
            csv,
            "{ts},{},{},{rep},run,{},events={} conflicts={}",
            profile.commands,
            cfg.seed,
            dur_ms(t_run),
            report.events.len(),
            conflicts
        )?;
    }

    println!("Wrote report -> {}", csv_path.display());
    Ok(())
}
