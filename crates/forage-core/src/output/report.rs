//! Run Report
//!
//! Collects what the driver produces (resolved actions, belief traces,
//! survival days and episode summaries) and writes the finished report as JSON.

use bevy_ecs::prelude::*;
use std::fs;
use std::path::Path;

use forage_events::{ActionRecord, BeliefRecord, EpisodeSummary, RunReport};

/// Resource: accumulates the run report as the simulation progresses
#[derive(Resource, Debug, Clone)]
pub struct RunRecorder {
    report: RunReport,
    record_beliefs: bool,
}

impl RunRecorder {
    pub fn new(seed: u64) -> Self {
        Self {
            report: RunReport::new(seed),
            record_beliefs: true,
        }
    }

    /// Skip the per-turn belief trace (it dominates report size)
    pub fn without_belief_trace(mut self) -> Self {
        self.record_beliefs = false;
        self
    }

    pub fn record_action(&mut self, record: ActionRecord) {
        *self
            .report
            .days_survived
            .entry(record.agent_name.clone())
            .or_insert(0) += 1;
        self.report.actions.push(record);
    }

    pub fn record_beliefs(&mut self, record: BeliefRecord) {
        if self.record_beliefs {
            self.report.beliefs.push(record);
        }
    }

    pub fn record_episode(&mut self, summary: EpisodeSummary) {
        self.report.episodes.push(summary);
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }
}

/// Write a run report to file
pub fn write_report(report: &RunReport, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json)?;
    Ok(())
}
