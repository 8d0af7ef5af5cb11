use addventure_core::BatchFailure;
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Addventure".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract episode metadata from archive dumps\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print a running total during long batches
pub fn print_progress(processed: usize, failed: usize) {
    eprintln!(
        "{} {}\t{} {}",
        "Processed:".dimmed(),
        processed.to_string().bright_white(),
        "Failed:".dimmed(),
        failed.to_string().bright_white()
    );
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the end-of-run totals and every failed page
pub fn print_summary(processed: usize, failures: &[BatchFailure]) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Extraction Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Processed:".dimmed(), processed.to_string().bright_white());
    eprintln!("  {} {}", "Failed:".dimmed(), failures.len().to_string().bright_white());

    if failures.is_empty() {
        return;
    }

    eprintln!();
    print_warning(&format!("{} pages were skipped", failures.len()));
    for failure in failures {
        print_error(&format!("{}: {}", failure.path.display(), failure.message));
    }
    eprintln!();
}
