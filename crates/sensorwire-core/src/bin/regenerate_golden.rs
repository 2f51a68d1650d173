use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sensorwire_core::{ReportOptions, decode_envelope_file, profiles};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.json");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected_report.json");
        regenerate_one(&path, &input, &output)?;
    }

    Ok(())
}

/// Case directories are named `<profile>_<case>`.
fn profile_for(case_dir: &Path) -> Result<&'static sensorwire_core::Profile, String> {
    let name = case_dir
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('_').next())
        .ok_or_else(|| format!("cannot infer profile from {}", case_dir.display()))?;
    profiles::from_name(name).map_err(|err| err.to_string())
}

fn regenerate_one(case_dir: &Path, input: &Path, output: &Path) -> Result<(), String> {
    let profile = profile_for(case_dir)?;
    let report = decode_envelope_file(profile, input, ReportOptions::default())
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?
        .ok_or_else(|| format!("port rejected by {} for {}", profile.name, input.display()))?;
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
