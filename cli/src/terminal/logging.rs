use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::spinner::SpinnerWriter;

pub struct FuzzrFormatter;

/// Event fields split into the template/input prefix and the rest.
#[derive(Default)]
struct EventFields {
    message: String,
    template: Option<String>,
    input: Option<String>,
    rest: Vec<String>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "template" => self.template = Some(value.to_string()),
            "input" => self.input = Some(value.to_string()),
            name => self.rest.push(format!("{name}={value}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }
}

impl EventFields {
    fn prefix(&self) -> Option<String> {
        match (&self.template, &self.input) {
            (Some(template), Some(input)) => Some(format!("[{template}] [{input}]")),
            (Some(template), None) => Some(format!("[{template}]")),
            (None, Some(input)) => Some(format!("[{input}]")),
            (None, None) => None,
        }
    }
}

impl<S, N> FormatEvent<S, N> for FuzzrFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match *event.metadata().level() {
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[+]", |s| s.green().bold()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };

        let mut fields = EventFields::default();
        event.record(&mut fields);

        write!(writer, "{} ", color_func(symbol.into()))?;
        if let Some(prefix) = fields.prefix() {
            write!(writer, "{} ", prefix.cyan())?;
        }
        write!(writer, "{}", fields.message)?;
        if !fields.rest.is_empty() {
            write!(writer, " {}", fields.rest.join(" ").dimmed())?;
        }
        writeln!(writer)
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(FuzzrFormatter)
        .with_writer(|| SpinnerWriter)
        .init();
}
