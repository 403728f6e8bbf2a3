use crate::prelude::{print, println, *};
use indicatif::{ProgressBar, ProgressStyle};
use nonfollowers_core::reconcile::ReconciliationResult;
use nonfollowers_core::report::{build_report, format_report_json, format_report_text, Platform};

/// Spinner shown on stderr while listings are fetched
pub fn new_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| eyre!("Invalid spinner template: {}", e))?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    Ok(spinner)
}

/// Print a reconciliation result as JSON or as one line per user
pub fn print_result(
    platform: Platform,
    username: &str,
    result: &ReconciliationResult,
    json: bool,
) -> Result<()> {
    if json {
        let report = build_report(platform, username, result);
        let json_output = format_report_json(&report).map_err(|e| eyre!("{}", e))?;
        println!("{}", json_output);
        return Ok(());
    }

    print!("{}", format_report_text(platform, result));

    Ok(())
}
