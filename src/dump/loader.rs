use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;
use tracing::info;
use crate::dump::LaneState;

pub fn load_from_disk(path: impl AsRef<Path>) -> Result<LaneState> {
    let path = path.as_ref();
    let json_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dump file from {}", path.display()))?;

    let state: LaneState = serde_json::from_str(&json_content)
        .with_context(|| format!("Failed to deserialize dump content from {}", path.display()))?;

    info!(
        playbooks = state.playbooks_by_id.len(),
        components = state.components_by_id.len(),
        workflows = state.workflows_by_id.len(),
        applications = state.applications_by_id.len(),
        connectors = state.connectors_by_id.len(),
        sensors = state.sensors_by_id.len(),
        tasks = state.orchestration_tasks.len(),
        "Loaded dump from {}", path.display()
    );

    Ok(state)
}

pub fn write_to_disk(state: &LaneState, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json_content = serde_json::to_string_pretty(state)
        .context("Failed to serialize lane state")?;

    fs::write(path, json_content)
        .with_context(|| format!("Failed to write dump file to {}", path.display()))?;

    Ok(())
}
