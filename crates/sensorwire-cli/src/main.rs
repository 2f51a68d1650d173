use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{ArgGroup, Args, Parser, Subcommand};
use glob::glob;
use sensorwire_core::profiles::{self, PROFILE_NAMES};
use sensorwire_core::{Envelope, Profile, Report, ReportOptions, build_report};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SENSORWIRE_BUILD_COMMIT"),
    ", ",
    env!("SENSORWIRE_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  sensorwire decode --profile ambience --hex 0367e600 --stdout\n  sensorwire decode --profile soil uplink.json -o report.json\n  sensorwire profiles";

#[derive(Parser, Debug)]
#[command(name = "sensorwire")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for LoRaWAN environmental sensor payloads (ambience / soil / light).",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log decoding details to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one uplink payload and generate a versioned JSON report.
    #[command(after_help = EXAMPLES)]
    Decode(DecodeArgs),
    /// List sensor profiles and their channel tables.
    Profiles {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("payload")
        .required(true)
        .args(["input", "hex", "base64"])
))]
struct DecodeArgs {
    /// Path to a JSON uplink envelope
    input: Option<PathBuf>,

    /// Raw payload as hex (e.g. 0367e600)
    #[arg(long)]
    hex: Option<String>,

    /// Raw payload as base64 (e.g. A2fmAA==)
    #[arg(long)]
    base64: Option<String>,

    /// Sensor profile the payload comes from
    #[arg(short, long, value_parser = PossibleValuesParser::new(PROFILE_NAMES))]
    profile: String,

    /// LoRaWAN port the payload arrived on (overrides the envelope)
    #[arg(long)]
    port: Option<u16>,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if the payload did not decode completely
    #[arg(long)]
    strict: bool,

    /// Do not attach dew point and heat index
    #[arg(long)]
    no_derived: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(&cli.command, Commands::Decode(args) if args.quiet);
    init_logging(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode(args),
        Commands::Profiles { json } => cmd_profiles(json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let profile = profiles::from_name(&args.profile).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("run `sensorwire profiles` to list them".to_string()),
        )
    })?;

    let (mut envelope, source, input_path) = load_envelope(&args)?;
    if let Some(port) = args.port {
        envelope.port = Some(port);
    }
    profile.check_port(envelope.port).map_err(|mismatch| {
        CliError::new(
            mismatch.to_string(),
            Some(format!(
                "{} sensors uplink on port {}; pass --port {} or omit the port",
                profile.name, mismatch.expected, mismatch.expected
            )),
        )
    })?;

    if let (Some(report_path), Some(input_path)) = (args.report.as_ref(), input_path.as_ref()) {
        ensure_distinct_paths(report_path, input_path)?;
    }

    let options = ReportOptions {
        derived: !args.no_derived,
    };
    let mut rep = build_report(profile, &envelope, &source, options)
        .map_err(|err| {
            CliError::new(
                format!("invalid payload: {}", err),
                Some("expected hex, base64 or an envelope with `data`/`payload_hex`".to_string()),
            )
        })?
        .ok_or_else(|| CliError::new("payload rejected by port filter", None))?;
    rep.tool.build = build_commit();
    debug!(profile = profile.name, fields = rep.decoded.len(), "report built");

    let json = serialize_report(&rep, args.pretty, args.compact)?;

    if args.stdout {
        println!("{}", json);
    } else {
        let report = args
            .report
            .as_ref()
            .ok_or_else(|| {
                CliError::new(
                    "missing output path",
                    Some("use -o/--report or --stdout".to_string()),
                )
            })?;
        write_report(report, &json)?;
        if !args.quiet {
            eprintln!("OK: report written -> {}", report.display());
        }
    }

    if !args.quiet {
        print_decode_status(&rep);
    }
    if args.strict && rep.decoded.has_error() {
        return Err(CliError::new(
            "payload did not decode completely",
            Some("inspect `decoded.error` in the report".to_string()),
        ));
    }
    Ok(())
}

fn load_envelope(args: &DecodeArgs) -> Result<(Envelope, String, Option<PathBuf>), CliError> {
    if let Some(hex) = &args.hex {
        let envelope = Envelope {
            payload_hex: Some(hex.clone()),
            ..Envelope::default()
        };
        return Ok((envelope, "hex".to_string(), None));
    }
    if let Some(data) = &args.base64 {
        let envelope = Envelope {
            data: Some(data.clone()),
            ..Envelope::default()
        };
        return Ok((envelope, "base64".to_string(), None));
    }

    let input = args.input.as_ref().ok_or_else(|| {
        CliError::new(
            "missing payload",
            Some("pass an envelope path, --hex or --base64".to_string()),
        )
    })?;
    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved)?;
    let json = fs::read_to_string(&resolved)
        .with_context(|| format!("Failed to read input file: {}", resolved.display()))?;
    let envelope = Envelope::from_json(&json).map_err(|err| {
        CliError::new(
            format!("invalid envelope '{}': {}", resolved.display(), err),
            Some("expected a JSON object with `data` or `payload_hex`".to_string()),
        )
    })?;
    let source = resolved.display().to_string();
    Ok((envelope, source, Some(resolved)))
}

fn ensure_distinct_paths(report_path: &Path, input_path: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input_path)
        .with_context(|| format!("Failed to resolve input path: {}", input_path.display()))?;
    let report_dir = match report_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Some(Path::new(".")),
        // A directory that does not exist yet cannot hold the input.
        Some(parent) if !parent.exists() => return Ok(()),
        parent => parent,
    };
    let report_abs = report_dir
        .map(fs::canonicalize)
        .transpose()
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    if let Some(report_dir) = report_abs {
        let report_target = report_dir.join(
            report_path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
        );
        if report_target == input_abs {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn write_report(report: &Path, json: &str) -> Result<(), CliError> {
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;
    Ok(())
}

fn build_commit() -> Option<String> {
    let commit = env!("SENSORWIRE_BUILD_COMMIT");
    if commit == "unknown" {
        None
    } else {
        Some(commit.to_string())
    }
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_decode_status(rep: &Report) {
    match &rep.decoded.error {
        Some(err) => eprintln!(
            "Decode stopped after {} field(s): {}",
            rep.decoded.len(),
            err
        ),
        None => eprintln!("Decoded {} field(s) as {}", rep.decoded.len(), rep.sensor.profile),
    }
}

#[derive(Serialize)]
struct ProfileListing {
    name: &'static str,
    model: &'static str,
    application_port: u16,
    channels: Vec<ChannelListing>,
}

#[derive(Serialize)]
struct ChannelListing {
    channel_id: u8,
    channel_type: u8,
    field: &'static str,
    width: usize,
}

impl ProfileListing {
    fn from_profile(profile: &Profile) -> Self {
        let sensors = profile.channels.iter().map(|def| ChannelListing {
            channel_id: def.id,
            channel_type: def.ty,
            field: def.field,
            width: def.kind.width(),
        });
        let system = profile.system.iter().map(|channel| ChannelListing {
            channel_id: sensorwire_core::codec::layout::SYSTEM_CHANNEL_ID,
            channel_type: channel.channel_type(),
            field: channel.field(),
            width: channel.kind().width(),
        });
        Self {
            name: profile.name,
            model: profile.model,
            application_port: profile.application_port,
            channels: sensors.chain(system).collect(),
        }
    }
}

fn cmd_profiles(json: bool) -> Result<(), CliError> {
    let listings: Vec<_> = profiles::PROFILES
        .iter()
        .map(|profile| ProfileListing::from_profile(profile))
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&listings).context("JSON serialization failed")?;
        println!("{}", out);
        return Ok(());
    }

    for listing in listings {
        println!(
            "{} - {} (port {})",
            listing.name, listing.model, listing.application_port
        );
        for channel in listing.channels {
            println!(
                "  0x{:02x} 0x{:02x}  {:<16} {} byte(s)",
                channel.channel_id, channel.channel_type, channel.field, channel.width
            );
        }
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .json uplink envelope, or --hex/--base64".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .json uplink envelope".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json uplink envelope".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .json envelope".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single envelope, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
