use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "peakform", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an audio file as a waveform PNG.
    Waveform(WaveformArgs),
    /// Validate endpoint settings without rendering.
    Check(CheckArgs),
    /// Print the canonical form of a format descriptor.
    Describe(DescribeArgs),
    /// Validate a JSON request and, for the waveform endpoint, render it.
    Request(RequestArgs),
}

#[derive(Parser, Debug)]
struct WaveformArgs {
    /// Input audio file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Format descriptor, e.g. "fmt=pcm, width=16, channels=2". Defaults to wav.
    #[arg(long)]
    format: Option<String>,

    /// Image width in pixels.
    #[arg(long)]
    width: Option<i64>,

    /// Image height in pixels.
    #[arg(long)]
    height: Option<i64>,

    /// black-on-white or white-on-black.
    #[arg(long)]
    colour: Option<String>,

    /// left, right or mix.
    #[arg(long)]
    channel: Option<String>,

    /// Decimate columns in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Abort if decimation takes longer than this.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// mp3, ogg or waveform.
    #[arg(long)]
    endpoint: peakform::Endpoint,

    /// Setting as key=value; repeatable.
    #[arg(long = "set", value_parser = parse_setting)]
    set: Vec<(String, peakform::SettingValue)>,
}

#[derive(Parser, Debug)]
struct DescribeArgs {
    descriptor: String,
}

#[derive(Parser, Debug)]
struct RequestArgs {
    /// Request JSON file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// mp3, ogg or waveform.
    #[arg(long)]
    endpoint: peakform::Endpoint,

    /// Output PNG path (waveform endpoint only).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Waveform(args) => cmd_waveform(args),
        Command::Check(args) => cmd_check(args),
        Command::Describe(args) => cmd_describe(args),
        Command::Request(args) => cmd_request(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_setting(s: &str) -> Result<(String, peakform::SettingValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    let value = match value.parse::<i64>() {
        Ok(v) => peakform::SettingValue::Integer(v),
        Err(_) => peakform::SettingValue::Text(value.to_string()),
    };
    Ok((key.trim().to_string(), value))
}

fn cmd_waveform(args: WaveformArgs) -> anyhow::Result<()> {
    let descriptor = match &args.format {
        Some(s) => peakform::FormatDescriptor::parse(s)?,
        None => peakform::FormatDescriptor::default(),
    };

    let mut settings = peakform::Settings::new();
    if let Some(w) = args.width {
        settings.insert(peakform::FIELD_WIDTH, w);
    }
    if let Some(h) = args.height {
        settings.insert(peakform::FIELD_HEIGHT, h);
    }
    if let Some(c) = args.colour {
        settings.insert(peakform::FIELD_COLOUR, c);
    }
    if let Some(c) = args.channel {
        settings.insert(peakform::FIELD_CHANNEL, c);
    }

    let opts = peakform::DecimateOpts {
        parallel: args.parallel,
        threads: args.threads,
        deadline: args
            .timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms)),
        ..peakform::DecimateOpts::default()
    };

    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read audio file '{}'", args.in_path.display()))?;
    let rendered = peakform::render_waveform_bytes(bytes, &descriptor, &settings, &opts)?;
    write_png(&args.out, &rendered.png.bytes)?;

    if !rendered.degraded.is_empty() {
        eprintln!(
            "warning: {} unreadable block(s) drawn as silence",
            rendered.degraded.len()
        );
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let settings = args.endpoint.schema().create(args.set)?;
    println!("{}", serde_json::to_string(&settings)?);
    Ok(())
}

fn cmd_describe(args: DescribeArgs) -> anyhow::Result<()> {
    let descriptor = peakform::FormatDescriptor::parse(&args.descriptor)?;
    println!("{descriptor}");
    Ok(())
}

fn cmd_request(args: RequestArgs) -> anyhow::Result<()> {
    let request = peakform::AudioRequest::from_path(&args.in_path)?;
    if args.endpoint != peakform::Endpoint::Waveform {
        request.validate(args.endpoint, true)?;
        println!("ok: {} ({})", args.endpoint, args.endpoint.content_type());
        return Ok(());
    }

    let out = args
        .out
        .context("--out is required for the waveform endpoint")?;
    let rendered = request.render_waveform(&peakform::DecimateOpts::default())?;
    write_png(&out, &rendered.png.bytes)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn write_png(path: &std::path::Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))
}
