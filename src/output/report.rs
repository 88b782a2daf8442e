use crate::visitor::VisitOutcome;
use crate::Result;
use serde::Serialize;
use std::io::Write;

/// Outcomes of a completed run, ordered by body size (largest first)
///
/// Outcomes with equal body sizes keep the order in which they were
/// collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    outcomes: Vec<VisitOutcome>,
}

impl Report {
    /// Builds a report, ordering `outcomes` by descending body size
    pub fn from_outcomes(mut outcomes: Vec<VisitOutcome>) -> Self {
        // stable, so ties stay in collection order
        outcomes.sort_by(|a, b| b.body_size.cmp(&a.body_size));
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[VisitOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Text rendering, one line per outcome in report order
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.outcomes
            .iter()
            .map(|o| format!("URL: {} => BodySize: {}", o.url, o.body_size))
    }

    /// Writes the text rendering to `out`
    pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// Renders the report as a pretty-printed JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Prints the report to `out` as text lines, or as JSON when `json` is set
    pub fn render<W: Write>(&self, out: &mut W, json: bool) -> Result<()> {
        if json {
            writeln!(out, "{}", self.to_json()?)?;
        } else {
            self.write_text(out)?;
        }
        out.flush()?;
        Ok(())
    }
}
