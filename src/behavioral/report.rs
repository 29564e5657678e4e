//! Markdown rendering for validation reports.

use chrono::Utc;

use super::{CheckKind, ValidationReport};

/// Render a validation report as a human-readable markdown document.
pub fn render_markdown(report: &ValidationReport) -> String {
    let mut out = String::new();

    let title = report.api_name.as_deref().unwrap_or("Behavioral Validation");
    out.push_str(&format!("# {} Report\n\n", title));
    out.push_str(&format!(
        "Generated: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("## Summary\n\n");
    out.push_str(&format!(
        "- Score: {:.1} / {:.1} ({:.1}%)\n",
        report.score,
        report.total_weight,
        report.score_percent()
    ));
    out.push_str(&format!("- Scenarios passed: {}\n", report.passed));
    out.push_str(&format!("- Scenarios failed: {}\n", report.failed));
    if let Some(error) = &report.error {
        out.push_str(&format!("- Error: {}\n", error));
    }
    out.push('\n');

    if !report.api_capabilities.is_empty() {
        out.push_str("## API Capabilities\n\n");
        for capability in &report.api_capabilities {
            out.push_str(&format!(
                "- {} ({} {})\n",
                capability.name, capability.method, capability.endpoint
            ));
        }
        out.push('\n');
    }

    if !report.required_features.is_empty() {
        out.push_str("## Required Features\n\n");
        for feature in &report.required_features {
            out.push_str(&format!(
                "- {} [{}]: {}\n",
                feature.feature, feature.priority, feature.description
            ));
        }
        out.push('\n');
    }

    if !report.results.is_empty() {
        out.push_str("## Scenarios\n\n");
        for result in &report.results {
            let marker = if result.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "### {} - {} (weight {:.1})\n\n",
                marker, result.name, result.weight
            ));
            if !result.description.is_empty() {
                out.push_str(&format!("{}\n\n", result.description));
            }
            out.push_str(&format!("Command: `{}`\n\n", result.command.join(" ")));
            if let Some(error) = &result.error {
                out.push_str(&format!("Error: {}\n\n", error));
                continue;
            }
            for check in &result.checks {
                let check_marker = if check.passed { "ok" } else { "FAIL" };
                out.push_str(&format!(
                    "- [{}] {}: expected `{}`, got `{}`\n",
                    check_marker,
                    check_label(check.check),
                    check.expected,
                    check.actual
                ));
            }
            out.push('\n');
        }
    }

    out
}

fn check_label(kind: CheckKind) -> &'static str {
    match kind {
        CheckKind::ExitCode => "exit code",
        CheckKind::StdoutContains => "stdout contains",
        CheckKind::StdoutNotContains => "stdout does not contain",
        CheckKind::StderrEmpty => "stderr empty",
    }
}
