// crates/quotient-script/tests/script_io.rs

//! Script io roundtrips through JSON and JSONL.

use quotient_script::io::{
    read_script_json, read_script_jsonl, write_script_json, write_script_jsonl,
};
use quotient_script::{generate_script, GeneratorConfig, Runner};

fn temp_path(name: &str) -> std::path::PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("quotient-script-test-{}-{name}", std::process::id()));
    p
}

#[test]
fn json_roundtrip_preserves_the_script() {
    let script = generate_script(&GeneratorConfig::default());
    let path = temp_path("roundtrip.json");
    write_script_json(&path, &script).expect("write");
    let back = read_script_json(&path).expect("read");
    std::fs::remove_file(&path).ok();
    assert_eq!(script, back);
}

#[test]
fn jsonl_roundtrip_preserves_the_script() {
    let script = generate_script(&GeneratorConfig {
        seed: 3,
        ..GeneratorConfig::default()
    });
    let path = temp_path("roundtrip.jsonl");
    write_script_jsonl(&path, &script).expect("write");
    let back = read_script_jsonl(&path).expect("read");
    std::fs::remove_file(&path).ok();
    assert_eq!(script, back);
}

#[test]
fn reloaded_scripts_replay_identically() {
    let script = generate_script(&GeneratorConfig {
        seed: 11,
        commands: 80,
        ..GeneratorConfig::default()
    });
    let path = temp_path("replay.jsonl");
    write_script_jsonl(&path, &script).expect("write");
    let back = read_script_jsonl(&path).expect("read");
    std::fs::remove_file(&path).ok();

    let r1 = Runner::run(&script).expect("run original");
    let r2 = Runner::run(&back).expect("run reloaded");
    assert_eq!(r1.events, r2.events);
    assert_eq!(r1.root_conflict, r2.root_conflict);
}
