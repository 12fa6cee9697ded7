mod report;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use gcsift::{Context, GcError, Options, analyze_verbose_with};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_OUTPUT: &str = "report.txt";
const START_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

fn main() {
    init_logging();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&config) {
        tracing::error!(error = %err, "analysis failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "gcsift=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

struct CliConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    context: Context,
    options: Options,
    verbose: bool,
    color: Option<bool>,
}

fn run(config: &CliConfig) -> Result<(), GcError> {
    let lines = read_lines(config.input.as_deref())?;
    tracing::debug!(lines = lines.len(), "log read");
    let report = analyze_verbose_with(&lines, &config.context, &config.options)?;

    match &config.output {
        None => {
            let stdout = io::stdout();
            let color = config.color.unwrap_or_else(|| stdout.is_terminal());
            let mut out = stdout.lock();
            report::write_report(&mut out, &report, config.verbose, color)?;
            out.flush()?;
        }
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            report::write_report(&mut out, &report, config.verbose, config.color.unwrap_or(false))?;
            out.flush()?;
            eprintln!("report written to {}", path.display());
        }
    }
    Ok(())
}

/// Invalid UTF-8 is replaced; rotated logs sometimes end in a torn write.
fn read_lines(input: Option<&std::path::Path>) -> Result<Vec<String>, GcError> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut lines = Vec::new();
    for line in reader.split(b'\n') {
        lines.push(String::from_utf8_lossy(&line?).into_owned());
    }
    Ok(lines)
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<PathBuf> = None;
    let mut output = Some(PathBuf::from(DEFAULT_OUTPUT));
    let mut context = Context::default();
    let mut options = Options::default();
    let mut verbose = false;
    let mut color = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("gcsift {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-p" | "--preprocess" => options.preprocess = true,
            "--no-preprocess" => options.preprocess = false,
            "-v" | "--verbose" => verbose = true,
            "--color" => color = Some(true),
            "--no-color" => color = Some(false),
            "-s" | "--startdatetime" => {
                let value = args.next().ok_or_else(|| format!("error: {arg} expects a value"))?;
                context.jvm_start = Some(parse_start(&value)?);
            }
            "-j" | "--jvmoptions" => {
                let value = args.next().ok_or_else(|| format!("error: {arg} expects a value"))?;
                context.jvm_options = Some(value);
            }
            "-t" | "--threshold" => {
                let value = args.next().ok_or_else(|| format!("error: {arg} expects a value"))?;
                options.throughput_threshold = parse_threshold(&value)?;
            }
            "-o" | "--output" => {
                let value = args.next().ok_or_else(|| format!("error: {arg} expects a value"))?;
                output = if value == "-" { None } else { Some(PathBuf::from(value)) };
            }
            _ if arg.starts_with("--startdatetime=") => {
                context.jvm_start = Some(parse_start(arg.trim_start_matches("--startdatetime="))?);
            }
            _ if arg.starts_with("--jvmoptions=") => {
                context.jvm_options = Some(arg.trim_start_matches("--jvmoptions=").to_string());
            }
            _ if arg.starts_with("--threshold=") => {
                options.throughput_threshold = parse_threshold(arg.trim_start_matches("--threshold="))?;
            }
            _ if arg.starts_with("--output=") => {
                let value = arg.trim_start_matches("--output=");
                output = if value == "-" { None } else { Some(PathBuf::from(value)) };
            }
            _ if arg.starts_with('-') && arg != "-" => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                if arg != "-" {
                    input = Some(PathBuf::from(arg));
                }
            }
        }
    }

    if input.is_none() && io::stdin().is_terminal() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, output, context, options, verbose, color })
}

/// `2021-03-13 03:37:40,051` in local time, or a natural-language date.
fn parse_start(value: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, START_FORMAT) {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.fixed_offset())
            .ok_or_else(|| format!("error: --startdatetime '{value}' does not exist in the local time zone"));
    }
    chrono_english::parse_date_string(value, Local::now(), chrono_english::Dialect::Uk)
        .map(|local| local.fixed_offset())
        .map_err(|_| format!("error: invalid --startdatetime '{value}' (expected yyyy-MM-dd HH:mm:ss,SSS)"))
}

fn parse_threshold(value: &str) -> Result<u8, String> {
    value
        .parse::<u8>()
        .ok()
        .filter(|t| *t <= 100)
        .ok_or_else(|| format!("error: invalid --threshold '{value}' (expected 0..100)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "gcsift {version}

JVM garbage collection log analyzer.

Usage:
  gcsift [OPTIONS] [<gc.log>]

Reads the log from <gc.log>, or from stdin when omitted or '-'.

Options:
  -p, --preprocess             Merge multi-line records (default).
      --no-preprocess          Match raw lines as they are.
  -s, --startdatetime <date>   JVM start, yyyy-MM-dd HH:mm:ss,SSS or natural
                               language (\"yesterday 10:00\").
  -j, --jvmoptions <options>   JVM options, e.g. \"-Xms1g -Xmx2g -XX:+UseG1GC\".
  -t, --threshold <percent>    Bottleneck throughput threshold. Default: 90
  -o, --output <file>          Report file, '-' for stdout. Default: {default_output}
      --color                  Force ANSI color output.
      --no-color               Disable ANSI color output.
  -v, --verbose                Append stage timings to the report.
  -h, --help                   Show this help message.
  -V, --version                Print version information.

Logging:
  RUST_LOG=gcsift=debug        Diagnostics on stderr.

Exit codes:
  0  Success.
  1  Internal error (I/O, catalogue defect).
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_output = DEFAULT_OUTPUT
    )
}
