use anyhow::{anyhow, bail, Context};
use retropad::file::{self, TextEncoding};
use retropad::logging::{self, DebugLogger, LogLevel, Logger};
use retropad::search;
use retropad::{error, DocumentHost, EditorConfig, EditorSession, FindOutcome};
use std::process::ExitCode;

const USAGE: &str = "\
usage: retropad [--config <path>] [--log-level <level>] [--debug-log <path>] <command>

commands:
  detect <file>
  find <file> <needle> [--match-case] [--backward] [--from <offset>] [--all]
  replace <file> <needle> <replacement> [--match-case] [--dry-run]
  convert <file> <encoding> [--output <path>]";

fn main() -> ExitCode {
    error::setup_panic_handler();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("retropad: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run(args: &[String]) -> anyhow::Result<ExitCode> {
    let cli = parse_args(args)?;
    if cli.command == Command::Help {
        println!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => EditorConfig::load(&file::expand_path(path)?)
            .with_context(|| format!("failed to load configuration {}", path))?,
        None => EditorConfig::load_default().context("failed to load configuration")?,
    };

    let level = cli.log_level.unwrap_or(config.log_level);
    let mut logger = Logger::new(level);
    if let Some(path) = &config.log_file {
        logger = logger.with_file_output(path);
    }
    logging::init(logger);

    let debug_log = match &cli.debug_log {
        Some(path) => Some(
            DebugLogger::new(file::expand_path(path)?)
                .with_context(|| format!("cannot open debug log {}", path))?,
        ),
        None => None,
    };

    let mut session = EditorSession::from_config(&config);
    let code = execute(&mut session, &cli.command, debug_log.as_ref())?;
    Ok(code)
}

fn execute(
    session: &mut EditorSession,
    command: &Command,
    debug_log: Option<&DebugLogger>,
) -> anyhow::Result<ExitCode> {
    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(ExitCode::SUCCESS)
        }
        Command::Detect { file: path } => {
            let path = file::expand_path(path)?;
            let bytes =
                std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
            let encoding = file::detect(&bytes);
            println!("{}", encoding);
            record(debug_log, "detect", serde_json::json!({ "encoding": encoding }));
            Ok(ExitCode::SUCCESS)
        }
        Command::Find {
            file: path,
            needle,
            match_case,
            backward,
            from,
            all,
        } => {
            open(session, path)?;
            let settings = session.search_settings_mut();
            settings.needle = needle.clone();
            settings.match_case = settings.match_case || *match_case;

            if *all {
                let matches =
                    search::find_all(&session.text(), needle, session.search_settings().match_case);
                for found in &matches {
                    println!("{}..{}", found.start, found.end);
                }
                println!("{} occurrence(s).", matches.len());
                record(debug_log, "find_all", serde_json::json!({ "count": matches.len() }));
                return Ok(if matches.is_empty() {
                    ExitCode::from(1)
                } else {
                    ExitCode::SUCCESS
                });
            }

            let start = from.unwrap_or(if *backward {
                session.text().chars().count()
            } else {
                0
            });
            session.host_mut().set_cursor_offset(start);

            let outcome = if *backward {
                session.find_previous()
            } else {
                session.find_next()
            };
            match outcome {
                FindOutcome::Found(found) => {
                    println!(
                        "{}..{}{}",
                        found.start,
                        found.end,
                        if found.wrapped { " (wrapped)" } else { "" }
                    );
                    record(
                        debug_log,
                        "find",
                        serde_json::json!({ "start": found.start, "end": found.end, "wrapped": found.wrapped }),
                    );
                    Ok(ExitCode::SUCCESS)
                }
                FindOutcome::NotFound | FindOutcome::EmptyQuery => {
                    println!("Cannot find the text.");
                    record(debug_log, "find", serde_json::json!({ "found": false }));
                    Ok(ExitCode::from(1))
                }
            }
        }
        Command::Replace {
            file: path,
            needle,
            replacement,
            match_case,
            dry_run,
        } => {
            if needle.is_empty() {
                bail!("the search text must not be empty");
            }
            open(session, path)?;
            let settings = session.search_settings_mut();
            settings.needle = needle.clone();
            settings.replacement = replacement.clone();
            settings.match_case = settings.match_case || *match_case;

            let replaced = session.replace_all();
            if replaced > 0 && !dry_run {
                session
                    .save()
                    .map_err(|e| anyhow!(e.user_message()))
                    .with_context(|| format!("cannot save {}", session.display_name()))?;
            }
            println!("Replaced {} occurrence(s).", replaced);
            record(
                debug_log,
                "replace",
                serde_json::json!({ "count": replaced, "dry_run": dry_run }),
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Convert {
            file: path,
            encoding,
            output,
        } => {
            open(session, path)?;
            let source = session.encoding();
            session.set_encoding(*encoding);

            let target = match output {
                Some(output) => file::expand_path(output)?,
                None => file::expand_path(path)?,
            };
            session
                .save_as(&target)
                .map_err(|e| anyhow!(e.user_message()))
                .with_context(|| format!("cannot save {}", target.display()))?;
            println!("{} -> {}", source, session.encoding());
            record(
                debug_log,
                "convert",
                serde_json::json!({ "from": source, "to": session.encoding() }),
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open(session: &mut EditorSession, path: &str) -> anyhow::Result<()> {
    let path = file::expand_path(path)?;
    session
        .open(&path)
        .map_err(|e| anyhow!(e.user_message()))
        .with_context(|| format!("cannot open {}", path.display()))
}

fn record(debug_log: Option<&DebugLogger>, tag: &str, payload: serde_json::Value) {
    if let Some(logger) = debug_log {
        if let Err(err) = logger.log_event(tag, &payload) {
            log::warn!("failed to write debug log {}: {}", logger.path().display(), err);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Cli {
    config: Option<String>,
    log_level: Option<LogLevel>,
    debug_log: Option<String>,
    command: Command,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Detect {
        file: String,
    },
    Find {
        file: String,
        needle: String,
        match_case: bool,
        backward: bool,
        from: Option<usize>,
        all: bool,
    },
    Replace {
        file: String,
        needle: String,
        replacement: String,
        match_case: bool,
        dry_run: bool,
    },
    Convert {
        file: String,
        encoding: TextEncoding,
        output: Option<String>,
    },
}

fn parse_args(args: &[String]) -> anyhow::Result<Cli> {
    let mut config = None;
    let mut log_level = None;
    let mut debug_log = None;
    let mut match_case = false;
    let mut backward = false;
    let mut dry_run = false;
    let mut all = false;
    let mut help = false;
    let mut from = None;
    let mut output = None;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value\n\n{}", flag, USAGE))
        };
        match arg.as_str() {
            "--config" => config = Some(value("--config")?),
            "--log-level" => {
                let name = value("--log-level")?;
                log_level = Some(
                    LogLevel::from_name(&name)
                        .ok_or_else(|| anyhow!("unknown log level: {}", name))?,
                );
            }
            "--debug-log" => debug_log = Some(value("--debug-log")?),
            "--output" => output = Some(value("--output")?),
            "--from" => {
                let raw = value("--from")?;
                from = Some(
                    raw.parse::<usize>()
                        .with_context(|| format!("invalid offset: {}", raw))?,
                );
            }
            "--match-case" => match_case = true,
            "--backward" => backward = true,
            "--dry-run" => dry_run = true,
            "--all" => all = true,
            "-h" | "--help" => help = true,
            flag if flag.starts_with("--") => bail!("unknown option: {}\n\n{}", flag, USAGE),
            _ => positional.push(arg.clone()),
        }
    }

    if help {
        return Ok(Cli {
            config,
            log_level,
            debug_log,
            command: Command::Help,
        });
    }

    let mut positional = positional.into_iter();
    let name = positional
        .next()
        .ok_or_else(|| anyhow!("missing command\n\n{}", USAGE))?;
    let mut operand = |what: &str| {
        positional
            .next()
            .ok_or_else(|| anyhow!("{}: missing <{}>\n\n{}", name, what, USAGE))
    };

    let command = match name.as_str() {
        "detect" => Command::Detect {
            file: operand("file")?,
        },
        "find" => Command::Find {
            file: operand("file")?,
            needle: operand("needle")?,
            match_case,
            backward,
            from,
            all,
        },
        "replace" => Command::Replace {
            file: operand("file")?,
            needle: operand("needle")?,
            replacement: operand("replacement")?,
            match_case,
            dry_run,
        },
        "convert" => {
            let file = operand("file")?;
            let label = operand("encoding")?;
            let encoding = TextEncoding::from_name(&label)
                .ok_or_else(|| anyhow!("unknown encoding: {}", label))?;
            Command::Convert {
                file,
                encoding,
                output,
            }
        }
        other => bail!("unknown command: {}\n\n{}", other, USAGE),
    };

    if let Some(extra) = positional.next() {
        bail!("unexpected argument: {}", extra);
    }

    Ok(Cli {
        config,
        log_level,
        debug_log,
        command,
    })
}
