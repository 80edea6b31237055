//! CLI output formatting utilities.

use crate::analysis::{AnalysisReport, ReplayedCall};
use crate::remote::truncate_chars;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print one replayed tool call with its arguments and result.
    pub fn tool_call(index: usize, call: &ReplayedCall) {
        println!(
            "\n{} {}",
            call.category().icon(),
            style(format!("Tool {}: {}", index, call.name)).bold()
        );
        let args = serde_json::to_string_pretty(&call.arguments)
            .unwrap_or_else(|_| call.arguments.to_string());
        println!("  {}", style("Input:").dim());
        println!("{}", indent(&content_preview(&args, 300), 4));
        println!("  {}", style("Output:").dim());
        println!("{}", indent(&call.result_display(), 4));
    }

    /// Print the performance metrics of a report.
    pub fn metrics(report: &AnalysisReport) {
        Output::kv("Tools Used", &report.tools_used_label());
        Output::kv("Processing Time", &format!("{}ms", report.elapsed_ms));
        Output::kv("Estimated Cost", &report.cost_label());
        Output::kv("Request", &report.request_id.to_string());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        format!("{}...", truncate_chars(content, max_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb", 2), "  a\n  b");
    }
}
