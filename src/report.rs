use crate::types::{CaseResult, Outcome, Summary};
use crate::{t, t_args};
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    #[default]
    Normal,
    Compact,
    Terse,
    Final,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub kind: OutputKind,
    pub hide_fails: bool,
    pub hide_passes: bool,
}

impl ReportOptions {
    fn shows(&self, result: &CaseResult) -> bool {
        if result.passed() {
            !self.hide_passes
        } else {
            !self.hide_fails
        }
    }
}

/// The report text for a single case, empty when filtered out.
pub fn render_case(result: &CaseResult, opts: &ReportOptions) -> String {
    if !opts.shows(result) {
        return String::new();
    }
    let name = result.case.base_name();
    match opts.kind {
        OutputKind::Final => String::new(),
        OutputKind::Terse => match result.outcome {
            Outcome::Pass => ".".green().to_string(),
            Outcome::Mismatch => "F".red().bold().to_string(),
            Outcome::Error(_) => "E".red().bold().to_string(),
        },
        OutputKind::Compact | OutputKind::Normal => {
            let mut out = match result.outcome {
                Outcome::Pass => format!("{} {}\n", t!("report-ok").green().bold(), name.green()),
                Outcome::Mismatch => {
                    format!("{} {}\n", t!("report-fail").red().bold(), name.red().bold())
                }
                Outcome::Error(_) => {
                    format!("{} {}\n", t!("report-error").red().bold(), name.red().bold())
                }
            };
            if opts.kind == OutputKind::Normal {
                match &result.outcome {
                    Outcome::Pass => {}
                    Outcome::Mismatch => {
                        out.push_str(&format!(
                            "  {} {:?}\n",
                            t!("report-expected").bold(),
                            result.expected
                        ));
                        out.push_str(&format!(
                            "  {} {:?}\n",
                            t!("report-actual").bold(),
                            result.actual
                        ));
                    }
                    Outcome::Error(e) => {
                        out.push_str(&format!(
                            "  {} {}\n",
                            t!("report-error-detail").bold(),
                            e.to_string().red()
                        ));
                    }
                }
            }
            out
        }
    }
}

pub fn render_totals(summary: &Summary) -> String {
    let failed = summary.failed + summary.errored;
    let failed_txt = if failed > 0 {
        failed.to_string().red().bold().to_string()
    } else {
        failed.to_string().green().to_string()
    };
    let passed_txt = summary.passed.to_string().green();
    t_args!("report-totals",
        "total" => summary.total,
        "passed" => passed_txt,
        "failed" => failed_txt,
        "errored" => summary.errored
    )
}

pub fn render_human(summary: &Summary, opts: &ReportOptions) -> String {
    let mut out = String::new();
    for c in &summary.cases {
        out.push_str(&render_case(c, opts));
    }
    if opts.kind == OutputKind::Terse && !summary.cases.is_empty() {
        out.push('\n');
    }
    out.push_str(&render_totals(summary));
    out.push('\n');
    out
}

pub fn print_human(summary: &Summary, opts: &ReportOptions) {
    print!("{}", render_human(summary, opts));
}
