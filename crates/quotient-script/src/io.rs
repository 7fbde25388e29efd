// crates/quotient-script/src/io.rs

//! Script io: whole-file JSON plus line-oriented JSONL (one declaration or
//! command per line) for streaming-friendly tooling.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::format::{Cmd, Decl, ScriptFile, SCRIPT_VERSION};

/// Read a script from a `.json` file.
pub fn read_script_json<P: AsRef<Path>>(path: P) -> Result<ScriptFile> {
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    let s: ScriptFile = serde_json::from_reader(BufReader::new(f)).context("parse script json")?;
    if s.version != SCRIPT_VERSION {
        bail!("unsupported script version {}", s.version);
    }
    Ok(s)
}

/// Write a script as pretty JSON.
pub fn write_script_json<P: AsRef<Path>>(path: P, s: &ScriptFile) -> Result<()> {
    let f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), s).context("serialize script")?;
    Ok(())
}

/// One JSONL line: a declaration or a command.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum Line {
    Decl(Decl),
    Cmd(Cmd),
}

/// Read a script from JSON Lines: declarations and commands interleaved,
/// one object per line. Declarations must precede the commands that use
/// them; relative order is preserved.
pub fn read_script_jsonl<P: AsRef<Path>>(path: P) -> Result<ScriptFile> {
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    let rdr = BufReader::new(f);
    let mut out = ScriptFile::new();
    for (i, line) in rdr.lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: Line = serde_json::from_str(&line)
            .with_context(|| format!("parse jsonl line {}", i + 1))?;
        match parsed {
            Line::Decl(d) => out.decls.push(d),
            Line::Cmd(c) => out.cmds.push(c),
        }
    }
    Ok(out)
}

/// Write a script as JSON Lines (declarations first, then commands).
pub fn write_script_jsonl<P: AsRef<Path>>(path: P, s: &ScriptFile) -> Result<()> {
    let f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    let mut w = BufWriter::new(f);
    for d in &s.decls {
        let line = serde_json::to_string(d).context("serialize decl")?;
        w.write_all(line.as_bytes()).context("write jsonl line")?;
        w.write_all(b"\n").context("write newline")?;
    }
    for c in &s.cmds {
        let line = serde_json::to_string(c).context("serialize cmd")?;
        w.write_all(line.as_bytes()).context("write jsonl line")?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush writer")?;
    Ok(())
}
