//! Samples command implementation.

use crate::cli::Output;
use crate::samples::SAMPLE_CLAIMS;
use console::style;

/// List the built-in sample claims.
pub fn run_samples() {
    Output::header("Sample claims");
    println!();

    for sample in SAMPLE_CLAIMS.iter() {
        Output::list_item(&format!("{} {}", style(sample.name).bold(), sample.badge()));
        println!("    {}", style(sample.preview(100).replace('\n', " ")).dim());
    }

    println!();
    Output::info("Analyze one with: claimscope analyze --sample \"<name>\"");
}
