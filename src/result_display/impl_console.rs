use crate::controller::core::SubmissionState;
use crate::controller::present::View;
use crate::result_display::interface::ResultDisplay;
use std::error::Error;

const BAR_WIDTH: usize = 30;

/// Prints the view as a text bar chart. Only prints when the view changed.
pub struct ResultDisplayConsole {
    last: Option<View>,
}

impl ResultDisplayConsole {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn format_view(view: &View) -> Vec<String> {
        let mut lines = vec![];

        match &view.file_name {
            Some(name) => lines.push(format!("file: {}", name)),
            None => lines.push("file: (none)".to_string()),
        }

        match view.state {
            SubmissionState::Idle => lines.push("status: ready".to_string()),
            SubmissionState::InFlight => lines.push(format!(
                "status: analyzing... {:>3}% [{}]",
                view.progress,
                bar(f32::from(view.progress) / 100.0)
            )),
            SubmissionState::Succeeded => lines.push("status: done".to_string()),
            SubmissionState::Failed => lines.push("status: failed".to_string()),
        }

        if let Some(notice) = &view.notice {
            lines.push(format!("notice: {}", notice));
        }

        if let Some(error) = &view.error {
            lines.push(format!("error: {}", error));
        }

        if let Some(label) = &view.label {
            lines.push(format!("predicted emotion: {}", label));
            for entry in view.series.iter() {
                lines.push(format!(
                    "{:<9}{} {:.3}",
                    entry.label,
                    bar(entry.value),
                    entry.value
                ));
            }
        }

        lines
    }
}

impl Default for ResultDisplayConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn bar(fraction: f32) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled))
}

impl ResultDisplay for ResultDisplayConsole {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.last.as_ref() == Some(view) {
            return Ok(());
        }

        println!("┌──────────────────────────────────────────────┐");
        for line in Self::format_view(view) {
            println!("│ {}", line);
        }
        println!("└──────────────────────────────────────────────┘");

        self.last = Some(view.clone());
        Ok(())
    }
}
