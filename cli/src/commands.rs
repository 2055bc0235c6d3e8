pub mod fuzz;

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use fuzzr_common::config::{Config, DEFAULT_MAX_HOST_ERRORS};
use fuzzr_common::operators::{Condition, Matcher};

#[derive(Parser)]
#[command(name = "fuzzr")]
#[command(about = "Preview the requests a parameter fuzzing rule sends to a target.")]
pub struct CommandLine {
    /// Target URLs
    pub targets: Vec<String>,
    /// Raw HTTP request file to fuzz
    #[arg(short, long)]
    pub request: Option<PathBuf>,
    /// Scheme used to rebuild the URL of a raw request
    #[arg(long, default_value = "https")]
    pub scheme: String,
    /// Query or form body parameter to substitute
    #[arg(short = 'P', long)]
    pub param: String,
    /// Payload substituted into the parameter (repeatable)
    #[arg(short, long = "payload", required = true)]
    pub payloads: Vec<String>,
    /// Precondition filter as PART=WORD, e.g. method=POST (repeatable)
    #[arg(short, long = "filter", value_parser = parse_word_matcher)]
    pub filters: Vec<Matcher>,
    /// How precondition filters combine
    #[arg(long, default_value = "or")]
    pub filter_condition: Condition,
    /// Matcher marking a request as a finding, as PART=WORD (repeatable)
    #[arg(short, long = "match", value_parser = parse_word_matcher)]
    pub matchers: Vec<Matcher>,
    /// How matchers combine
    #[arg(long, default_value = "or")]
    pub match_condition: Condition,
    /// Stop sending payloads to a target once one matched
    #[arg(long)]
    pub stop_at_first_match: bool,
    /// Maximum requests per second, 0 for no limit
    #[arg(long, default_value_t = 0)]
    pub rate_limit: u32,
    /// Failures after which a host is skipped
    #[arg(long, default_value_t = DEFAULT_MAX_HOST_ERRORS)]
    pub max_host_errors: usize,
    /// Show the outcome of every precondition filter
    #[arg(long)]
    pub matcher_status: bool,
    /// Dump the variables precondition filters see
    #[arg(long)]
    pub show_var_dump: bool,
    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            stop_at_first_match: self.stop_at_first_match,
            matcher_status: self.matcher_status,
            show_var_dump: self.show_var_dump,
            max_host_errors: self.max_host_errors,
            rate_limit: self.rate_limit,
        }
    }
}

fn parse_word_matcher(s: &str) -> Result<Matcher, String> {
    let Some((part, word)) = s.split_once('=') else {
        return Err(format!("invalid filter `{s}`, expected PART=WORD"));
    };
    let (part, word) = (part.trim(), word.trim());
    if part.is_empty() || word.is_empty() {
        return Err(format!("invalid filter `{s}`, expected PART=WORD"));
    }
    Ok(Matcher::words(&part.to_ascii_lowercase(), [word]).ignore_case())
}
