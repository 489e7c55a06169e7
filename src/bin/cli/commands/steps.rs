//! Step listing command handler

use ecoverse_probe::{OutputFormat, ProbeResult, StepId};
use serde_json::json;

pub fn handle_steps_command(format: OutputFormat) -> ProbeResult<()> {
    match format {
        OutputFormat::Json => {
            let steps: Vec<_> = StepId::all()
                .map(|step| {
                    json!({
                        "step": step,
                        "description": step.description(),
                        "extended": step.is_extended(),
                        "depends_on": step.depends_on(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&steps)?);
        }
        OutputFormat::Table => {
            println!("Probe steps (readiness wait always runs first):");
            for (index, step) in StepId::all().enumerate() {
                let mut notes = Vec::new();
                if step.is_extended() {
                    notes.push("extended".to_string());
                }
                if let Some(dep) = step.depends_on() {
                    notes.push(format!("needs {}", dep));
                }
                let notes = if notes.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", notes.join(", "))
                };
                println!(
                    "  {:>2}. {:<16} {}{}",
                    index + 1,
                    step.name(),
                    step.description(),
                    notes
                );
            }
        }
    }
    Ok(())
}
