//! Integration tests driving the runner against fake tools

mod pipeline_flow;
