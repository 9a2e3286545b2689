use crate::triage::RunSummary;
use colored::Colorize;

/// Print the outcome of a pass.
pub fn print_summary(pass: &str, summary: &RunSummary, dry_run: bool) {
    let header = if dry_run {
        format!("{} (dry run)", pass)
    } else {
        pass.to_string()
    };
    println!("{}", header.bold());
    println!("  {:<10} {}", "found", summary.found);
    println!("  {:<10} {}", "changed", summary.changed.to_string().green());
    println!("  {:<10} {}", "notified", summary.notified.to_string().green());
    if summary.skipped > 0 {
        println!("  {:<10} {}", "skipped", summary.skipped.to_string().yellow());
    }
    let failed = summary.failed.to_string();
    if summary.failed > 0 {
        println!("  {:<10} {}", "failed", failed.red());
    } else {
        println!("  {:<10} {}", "failed", failed);
    }
}
