use colored::Colorize;
use dfa_equiv_lib::{report::CheckReport, solver::SerializableSolverStatus};

/// Human readable summary of a comparison, with terminal colors.
pub fn format_report(report: &CheckReport) -> String {
    let mut lines = vec![];

    match report.status {
        SerializableSolverStatus::True => {
            lines.push(format!("{}", "The automata are equivalent.".green().bold()));
        }
        SerializableSolverStatus::False => {
            lines.push(format!("{}", "The automata are NOT equivalent.".red().bold()));
            lines.push(format!("Shortest distinguishing word: {}", describe_witness(report)));
        }
        SerializableSolverStatus::Unknown => {
            let reason = report
                .unknown_reason
                .as_ref()
                .map(|reason| format!(" ({reason:?})"))
                .unwrap_or_default();
            lines.push(format!("{}{}", "No verdict, the check gave up".yellow().bold(), reason));
        }
    }

    lines.push(format!(
        "Explored {} product states in {:?}",
        report.statistics.visited_pairs, report.statistics.time
    ));

    for (label, image) in [("left", &report.left_image), ("right", &report.right_image)] {
        if let Some(path) = image {
            lines.push(format!("Rendered {label} automaton to {}", path.display()));
        }
    }

    for err in &report.render_errors {
        lines.push(format!("{} {err}", "Rendering failed:".yellow()));
    }

    lines.join("\n")
}

fn describe_witness(report: &CheckReport) -> String {
    match report.witness_string.as_deref() {
        Some("") => format!("{}", "the empty word".cyan()),
        Some(word) => format!("{}", format!("\"{word}\"").cyan()),
        None => "-".to_string(),
    }
}
