// crates/quotient-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quotient_script::io::{read_script_json, read_script_jsonl, write_script_json, write_script_jsonl};
use quotient_script::{generate_script, GeneratorConfig, Runner, ScriptFile};

#[derive(Parser, Debug)]
#[command(
    name = "quotient-cli",
    about = "quotient reference CLI",
    long_about = "quotient reference CLI.\n\nGenerate assertion scripts and drive them through the congruence-closure core, printing implied literals, explanations and conflicts.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a deterministic random script.
    /// If --out ends with `.jsonl`, writes one declaration/command per line.
    Generate {
        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of commands (>0)
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
        commands: u32,

        /// Number of variables (>0)
        #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
        variables: u32,

        /// Number of constants
        #[arg(long, default_value_t = 4)]
        constants: u32,

        /// Number of function applications
        #[arg(long, default_value_t = 12)]
        applications: u32,

        /// Output path (JSON or JSONL)
        #[arg(long, default_value = "script.json")]
        out: PathBuf,
    },

    /// Run a script and print its events as JSON lines.
    Run {
        /// Input script path (JSON or JSONL)
        #[arg(long)]
        script: PathBuf,

        /// Output path for events; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run a script and print term/class/edge counts.
    Stats {
        /// Input script path (JSON or JSONL)
        #[arg(long)]
        script: PathBuf,
    },
}

fn is_jsonl(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "jsonl")
}

fn read_script(path: &Path) -> Result<ScriptFile> {
    if is_jsonl(path) {
        read_script_jsonl(path)
    } else {
        read_script_json(path)
    }
}

fn cmd_generate(cfg: &GeneratorConfig, out: &Path) -> Result<()> {
    info!(seed = cfg.seed, commands = cfg.commands, out = %out.display(), "generating script");
    let script = generate_script(cfg);
    if is_jsonl(out) {
        write_script_jsonl(out, &script)?;
    } else {
        write_script_json(out, &script)?;
    }
    println!(
        "wrote {} decls + {} cmds -> {}",
        script.decls.len(),
        script.cmds.len(),
        out.display()
    );
    Ok(())
}

fn cmd_run(script_path: &Path, out: Option<&Path>) -> Result<()> {
    info!(script = %script_path.display(), "running script");
    let script = read_script(script_path)?;
    let report = Runner::run(&script)?;

    let mut sink: Box<dyn Write> = match out {
        Some(p) => Box::new(BufWriter::new(
            std::fs::File::create(p).with_context(|| format!("create {}", p.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    for ev in &report.events {
        let line = serde_json::to_string(ev).context("serialize event")?;
        sink.write_all(line.as_bytes())?;
        sink.write_all(b"\n")?;
    }
    sink.flush()?;
    if report.root_conflict {
        info!("script is unsatisfiable at the root");
        println!("unsat");
    } else {
        println!("ok ({} events)", report.events.len());
    }
    Ok(())
}

fn cmd_stats(script_path: &Path) -> Result<()> {
    let script = read_script(script_path)?;
    let mut runner = Runner::new();
    for d in &script.decls {
        runner.declare(d)?;
    }
    let mut report = quotient_script::RunReport::default();
    for (i, c) in script.cmds.iter().enumerate() {
        runner.exec(i, c, &mut report)?;
    }
    println!(
        "terms={} classes={} edges={} events={}",
        runner.egraph.num_terms(),
        runner.egraph.num_classes(),
        runner.egraph.num_edges(),
        report.events.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Generate {
            seed,
            commands,
            variables,
            constants,
            applications,
            out,
        } => {
            let cfg = GeneratorConfig {
                seed,
                commands,
                variables,
                constants,
                applications,
                ..GeneratorConfig::default()
            };
            cmd_generate(&cfg, &out)
        }
        Cmd::Run { script, out } => cmd_run(&script, out.as_deref()),
        Cmd::Stats { script } => cmd_stats(&script),
    }
}
