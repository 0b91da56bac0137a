use calex::{EventCandidate, ReferenceContext, extract};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::{self, Read};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let ctx = match build_context(&config) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    match extract(&config.input, &ctx) {
        Ok(candidate) => print_candidate(&candidate, config.json),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

struct CliConfig {
    input: String,
    reference: Option<NaiveDateTime>,
    today: Option<NaiveDate>,
    timezone: String,
    json: bool,
}

fn build_context(config: &CliConfig) -> Result<ReferenceContext, calex::ExtractError> {
    match (config.reference, config.today) {
        (Some(reference), None) => ReferenceContext::at(reference, &config.timezone),
        (Some(reference), Some(today)) => {
            let mut ctx = ReferenceContext::build(Some(today), None, None, Some(&config.timezone))?;
            ctx.now = reference;
            Ok(ctx)
        }
        (None, today) => ReferenceContext::build(today, None, None, Some(&config.timezone)),
    }
}

fn print_candidate(candidate: &EventCandidate, json: bool) {
    if json {
        match serde_json::to_string_pretty(candidate) {
            Ok(body) => println!("{body}"),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Title:    {}", candidate.title);
    println!("Start:    {}", candidate.start.format("%Y-%m-%dT%H:%M:%S"));
    match candidate.end {
        Some(end) => println!("End:      {}", end.format("%Y-%m-%dT%H:%M:%S")),
        None => println!("End:      (none)"),
    }
    if candidate.location.is_empty() {
        println!("Location: (none)");
    } else {
        println!("Location: {}", candidate.location);
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut reference: Option<NaiveDateTime> = None;
    let mut today: Option<NaiveDate> = None;
    let mut timezone = "UTC".to_string();
    let mut json = false;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("calex {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--json" => json = true,
            "--reference" => {
                let value = args.next().ok_or_else(|| "error: --reference expects a value".to_string())?;
                reference = Some(parse_reference(&value)?);
            }
            "--today" => {
                let value = args.next().ok_or_else(|| "error: --today expects a value".to_string())?;
                today = Some(parse_today(&value)?);
            }
            "--timezone" => {
                timezone = args.next().ok_or_else(|| "error: --timezone expects a value".to_string())?;
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--reference=") => {
                reference = Some(parse_reference(arg.trim_start_matches("--reference="))?);
            }
            _ if arg.starts_with("--today=") => {
                today = Some(parse_today(arg.trim_start_matches("--today="))?);
            }
            _ if arg.starts_with("--timezone=") => {
                timezone = arg.trim_start_matches("--timezone=").to_string();
            }
            _ if arg.starts_with("--input=") => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(arg.trim_start_matches("--input=").to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, reference, today, timezone, json })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_reference(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| format!("error: invalid --reference '{value}' (expected YYYY-MM-DDTHH:MM:SS)"))
}

fn parse_today(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("error: invalid --today '{value}' (expected YYYY-MM-DD)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "calex {version}

Extract a calendar event from natural-language text.

Usage:
  calex [OPTIONS] [--] <text...>
  calex [OPTIONS] --input <text>

Options:
  -i, --input <text>         Text to parse. If omitted, reads remaining args
                             or stdin when no args are provided.
  --reference <timestamp>    Reference \"now\" in YYYY-MM-DDTHH:MM:SS.
                             Default: the current UTC wall clock.
  --today <date>             Caller-local calendar date in YYYY-MM-DD.
                             Default: the reference timestamp's date.
  --timezone <tz>            Timezone label attached to the result. Default: UTC.
  --json                     Print the candidate as JSON.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  1  Extraction failed.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
