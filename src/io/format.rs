//! Output formatting for reduction results.

use crate::reduce::Reduction;

/// How the `run` command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `Total sum of squares: <total>`
    #[default]
    Text,
    /// One JSON object with the run shape and total
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Render a reduction for stdout.
pub fn render_reduction(reduction: &Reduction, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format!("Total sum of squares: {}", reduction.total)),
        OutputFormat::Json => serde_json::to_string(reduction),
    }
}
