use std::time::Duration;

use colored::*;
use fuzzr_common::event::ResultEvent;

use super::spinner;

pub fn finding(result: &ResultEvent) {
    let matcher = result
        .matcher_name
        .as_deref()
        .map(|name| format!(":{name}"))
        .unwrap_or_default();
    let mut line = format!(
        "[{}{}] {}",
        result.template_id.bold().green(),
        matcher.green(),
        result.matched_at
    );
    if !result.extracted.is_empty() {
        line.push_str(&format!(" [{}]", result.extracted.join(", ")).cyan().to_string());
    }
    spinner::get_spinner().println(line);
}

pub fn summary(targets: usize, findings: usize, total_time: Duration) {
    let requests = spinner::requests_sent().to_string().bold().green();
    let findings = format!("{findings} findings").bold().yellow();
    let total_time = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let unit = if targets == 1 { "target" } else { "targets" };
    println!("Fuzzing Complete: {requests} requests to {targets} {unit}, {findings} in {total_time}");
}
