//! Offline authoring tooling.
//!
//! `cargo xtask validate [cases-dir]` runs the validator and verifier over
//! every case in the corpus and prints a report; the exit code is non-zero
//! if any case has errors. `cargo xtask generate --seed <s>` builds a case
//! deterministically and writes it into the corpus.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

use gumshoe_domain::Difficulty;
use gumshoe_engine::authoring::{
    validator::{self, Severity},
    verifier, BuildConfig, CaseBuilder,
};
use gumshoe_engine::infrastructure::case_store::CaseStore;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("validate") => validate(args.next()),
        Some("generate") => generate(args.collect()),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!(
            "Usage: cargo xtask <command>\n\nCommands:\n  validate [cases-dir]\n  generate --seed <seed> [--difficulty easy|medium|hard] [--theme <theme>] [--out <dir>]"
        ),
    }
}

fn default_cases_dir() -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("data")
        .join("cases")
}

fn validate(dir: Option<String>) -> anyhow::Result<()> {
    let root = dir.map(PathBuf::from).unwrap_or_else(default_cases_dir);
    anyhow::ensure!(root.exists(), "cases directory {} not found", root.display());

    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;
    let mut cases = 0usize;

    let mut entries: Vec<_> = fs::read_dir(&root)
        .with_context(|| format!("reading {}", root.display()))?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let folder = entry.file_name().to_string_lossy().to_string();
        let case_path = entry.path().join("case.json");
        if !case_path.is_file() {
            continue;
        }
        cases += 1;
        let raw = fs::read_to_string(&case_path)
            .with_context(|| format!("reading {}", case_path.display()))?;

        let issues = validator::validate_json(&raw, &folder);
        let errors: Vec<_> = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .collect();
        let warnings: Vec<_> = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect();

        println!("{}", "=".repeat(55));
        println!("  Verification Report: {folder}");
        println!("{}", "=".repeat(55));

        if errors.is_empty() {
            println!("PASSED - no critical errors");
        } else {
            println!("FAILED - {} error(s):", errors.len());
            for issue in &errors {
                println!("  [ERR] {}", issue.message);
            }
        }
        for issue in &warnings {
            println!("  [WRN] {}", issue.message);
        }

        if errors.is_empty() {
            if let Ok(case) = serde_json::from_str(&raw) {
                let report = verifier::verify(&case);
                println!(
                    "Solvability: {}/100 ({})",
                    report.score,
                    if report.is_solvable {
                        "solvable"
                    } else {
                        "unsolvable"
                    }
                );
                for issue in &report.issues {
                    println!("  [SCORE] {issue}");
                }
            }
        }
        println!();

        total_errors += errors.len();
        total_warnings += warnings.len();
    }

    println!("{cases} case(s): {total_errors} error(s), {total_warnings} warning(s)");
    anyhow::ensure!(total_errors == 0, "validation failed");
    Ok(())
}

fn generate(args: Vec<String>) -> anyhow::Result<()> {
    let mut seed = None;
    let mut difficulty = Difficulty::default();
    let mut theme = None;
    let mut out = default_cases_dir();

    let mut iter = args.into_iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow::anyhow!("flag {flag} needs a value"))?;
        match flag.as_str() {
            "--seed" => seed = Some(value),
            "--difficulty" => difficulty = Difficulty::from_str(&value)?,
            "--theme" => theme = Some(value),
            "--out" => out = PathBuf::from(value),
            other => anyhow::bail!("Unknown flag: {other}"),
        }
    }
    let seed = seed.context("--seed is required (generation is seed-deterministic)")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let case = runtime.block_on(async {
        CaseBuilder::new(None)
            .build(
                &BuildConfig {
                    seed,
                    difficulty,
                    theme,
                    use_llm: false,
                },
                |stage, detail| println!("[{stage}] {detail}"),
            )
            .await
    })?;

    let report = verifier::verify(&case);
    let store = CaseStore::new(&out);
    let path = store.save(&case)?;
    println!(
        "Wrote {} (solvability {}/100)",
        path.display(),
        report.score
    );
    Ok(())
}
