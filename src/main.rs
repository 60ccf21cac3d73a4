use anyhow::Result;
use bitsy_spec_test::backend::{Compiler, ExternalCompiler};
use bitsy_spec_test::config::{self, Overrides};
use bitsy_spec_test::engine::run_cases_with;
use bitsy_spec_test::i18n;
use bitsy_spec_test::report::{OutputKind, ReportOptions, render_case, render_totals};
use bitsy_spec_test::spec::load_specs;
use bitsy_spec_test::types::TestCase;
use bitsy_spec_test::{t, t_args};
use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind};
use colored::Colorize;
use colored::control::set_override as set_color_override;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

const PROGRAM: &str = env!("CARGO_PKG_NAME");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Compact,
    Terse,
    Final,
    Normal,
}
impl From<OutputFormat> for OutputKind {
    fn from(v: OutputFormat) -> Self {
        match v {
            OutputFormat::Normal => OutputKind::Normal,
            OutputFormat::Compact => OutputKind::Compact,
            OutputFormat::Terse => OutputKind::Terse,
            OutputFormat::Final => OutputKind::Final,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = t!("cli-about")
)]
struct Cli {
    // Compiler executable; defaults to build/bitsyc
    #[arg(
        long,
        value_name = "FILE",
        visible_alias = "exe",
        help = t!("cli-compiler")
    )]
    compiler: Option<String>,

    // Directory holding the spec corpus
    #[arg(long, value_name = "DIR", help = t!("cli-specs"))]
    specs: Option<PathBuf>,

    // YAML file with a Config section
    #[arg(long, value_name = "FILE", help = t!("cli-config"))]
    config: Option<PathBuf>,

    #[arg(long, value_name = "SECS", help = t!("cli-timeout"))]
    timeout: Option<u64>,

    // -t/--test: number (1..N) or base name. Special: 0 / null / list lists all tests and exits.
    #[arg(
        short = 't',
        long = "test",
        value_name = "TEST",
        help = t!("cli-test")
    )]
    test: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value = "normal",
        help = t!("cli-output")
    )]
    output: OutputFormat,

    #[arg(
        short = 'f',
        long = "hide-fails",
        conflicts_with = "hide_passes",
        help = t!("cli-hide-fails")
    )]
    hide_fails: bool,

    #[arg(
        short = 'p',
        long = "hide-passes",
        conflicts_with = "hide_fails",
        help = t!("cli-hide-passes")
    )]
    hide_passes: bool,

    #[arg(short = 'q', long = "silent", help = t!("cli-silent"))]
    silent: bool,

    #[arg(short = 'v', long = "verbose", help = t!("cli-verbose"))]
    verbose: bool,

    #[arg(
        short = 'c',
        long = "color",
        alias = "colour",
        help = t!("cli-color")
    )]
    color: bool,

    #[arg(long = "no-color", help = t!("cli-no-color"))]
    no_color: bool,
}

/// Make CLI flags bold: --word or -letter at the start of a line
fn format_flags_bold(text: &str) -> String {
    let flag_regex = match Regex::new(r"(?m)^(\s*)(--?\w+(?:-\w+[^<\n]*)*)") {
        Ok(re) => re,
        Err(_) => return text.to_string(),
    };

    flag_regex
        .replace_all(text, |caps: &regex::Captures| {
            let indent = &caps[1];
            let flag = &caps[2];
            format!("{}{}", indent, flag.bold())
        })
        .to_string()
}

fn localize_common(text: &str) -> String {
    let mut text = text.replace(
        "Usage:",
        &t!("cli-error-usage").bold().underline().to_string(),
    );
    text = text.replace(PROGRAM, &PROGRAM.bold().to_string());
    format_flags_bold(&text)
}

/// Format clap errors with localized messages
fn format_clap_error(error: &clap::Error) -> String {
    let mut msg = error.to_string();
    msg = msg.replace("For more information, try '--help'.", &t!("cli-error-help-info"));
    msg = msg.replace("error:", &t!("cli-error-label").red().bold().to_string());
    msg = msg.replace("tip:", &t!("cli-tip-label"));
    msg = msg.replace("unexpected argument", &t!("cli-unexpected-argument"));
    msg = localize_common(&msg);

    match error.kind() {
        ErrorKind::MissingRequiredArgument => msg.replace(
            "the following required arguments were not provided:",
            &t!("cli-error-missing-args"),
        ),
        ErrorKind::InvalidValue => msg.replace("invalid value", &t!("cli-error-invalid-value")),
        _ => msg,
    }
}

/// Create custom localized help text
fn create_custom_help() -> String {
    let mut help_text = Cli::command().render_long_help().to_string();

    help_text = help_text.replace(
        "Options:",
        &t!("cli-help-options").bold().underline().to_string(),
    );
    help_text = help_text.replace("[default:", &format!("[{}:", t!("cli-help-default")));
    help_text = help_text.replace("[aliases:", &format!("[{}:", t!("cli-help-aliases")));
    help_text = help_text.replace(
        "[possible values:",
        &format!("[{}:", t!("cli-help-possible-values")),
    );
    help_text = help_text.replace("Print help", &t!("cli-help-print-help"));
    help_text = help_text.replace("Print version", &t!("cli-help-print-version"));
    help_text = localize_common(&help_text);

    // Collapse runs of blank lines
    let mut cleaned_lines = Vec::new();
    let mut prev_was_empty = false;
    for line in help_text.lines() {
        let is_empty = line.trim().is_empty();
        if is_empty && prev_was_empty {
            continue;
        }
        cleaned_lines.push(line);
        prev_was_empty = is_empty;
    }
    cleaned_lines.join("\n")
}

fn print_test_list(cases: &[TestCase], to_stderr: bool) {
    let mut lines = vec![t!("available-tests")];
    for (idx, case) in cases.iter().enumerate() {
        lines.push(t_args!("test-list-item",
            "index" => (idx + 1),
            "name" => case.base_name()
        ));
    }
    for line in lines {
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

enum Selection {
    List,
    Run(Vec<TestCase>),
}

/// Resolve -t/--test against the discovered cases. `None` means no match.
fn select_cases(cases: &[TestCase], sel: &str) -> Option<Selection> {
    let trimmed = sel.trim();
    if trimmed == "0"
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("list")
    {
        return Some(Selection::List);
    }
    if let Ok(n) = trimmed.parse::<usize>() {
        return cases
            .get(n.wrapping_sub(1))
            .cloned()
            .map(|c| Selection::Run(vec![c]));
    }
    let selected: Vec<TestCase> = cases
        .iter()
        .filter(|c| c.base_name() == trimmed || c.id == trimmed)
        .cloned()
        .collect();
    if selected.is_empty() {
        None
    } else {
        Some(Selection::Run(selected))
    }
}

fn main() -> Result<()> {
    i18n::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp => {
                println!("{}", create_custom_help());
                std::process::exit(0);
            }
            ErrorKind::DisplayVersion => {
                println!("{} {}", PROGRAM, env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            _ => {
                eprintln!("{}", format_clap_error(&error));
                std::process::exit(2);
            }
        },
    };

    // Without -v only warnings and errors; RUST_LOG overrides either way
    let default_filter = if cli.verbose {
        "bitsy_spec_test=info"
    } else {
        "bitsy_spec_test=warn"
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Colors: default on, --no-color turns off
    set_color_override(cli.color || !cli.no_color);

    let file_cfg = cli
        .config
        .as_deref()
        .map(config::load_config)
        .transpose()?;
    let settings = config::resolve(
        Overrides {
            compiler: cli.compiler.clone(),
            specs: cli.specs.clone(),
            timeout: cli.timeout,
        },
        file_cfg,
    );

    let mut cases = load_specs(&settings.spec_dir)?;

    if let Some(sel) = &cli.test {
        match select_cases(&cases, sel) {
            Some(Selection::List) => {
                print_test_list(&cases, false);
                return Ok(());
            }
            Some(Selection::Run(selected)) => cases = selected,
            None => {
                error!("{}", t_args!("error-test-not-found", "test" => sel.trim()));
                print_test_list(&cases, true);
                std::process::exit(2);
            }
        }
    }

    let compiler = ExternalCompiler {
        executable: settings.compiler.clone(),
        timeout: Some(settings.timeout),
        quiet: cli.silent,
    };

    // Fail fast on a missing compiler rather than erroring every case
    if let Err(e) = compiler.validate() {
        error!("{}", t_args!("error-validation-failed", "error" => e));
        std::process::exit(2);
    }

    if cli.verbose && !cli.silent {
        let compiler_path = compiler
            .resolve()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| settings.compiler.clone());
        info!(
            "{}",
            t_args!("info-version", "name" => PROGRAM, "version" => env!("CARGO_PKG_VERSION"))
        );
        info!("{}", t_args!("info-compiler", "path" => &compiler_path));
        info!("{}", t_args!("info-spec-dir", "path" => settings.spec_dir.display()));
        info!("{}", t_args!("info-starting-tests", "count" => cases.len()));
    }

    let opts = ReportOptions {
        kind: cli.output.into(),
        hide_fails: cli.hide_fails,
        hide_passes: cli.hide_passes,
    };
    let summary = run_cases_with(&compiler, &cases, |result| {
        if cli.silent {
            return;
        }
        print!("{}", render_case(result, &opts));
        let _ = std::io::stdout().flush();
    });

    if !cli.silent {
        if opts.kind == OutputKind::Terse && !summary.cases.is_empty() {
            println!();
        }
        println!("{}", render_totals(&summary));
    }

    if cli.verbose && !cli.silent {
        info!(
            "{}",
            t_args!("info-all-finished",
                "total" => summary.total,
                "passed" => summary.passed,
                "failed" => summary.failed,
                "errored" => summary.errored
            )
        );
    }

    if !summary.all_passed() {
        std::process::exit(1);
    }

    Ok(())
}
