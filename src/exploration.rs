// Exploration instrumentation
//
// Strategies report every frontier pop to an optional observer. Observers see
// read-only views of the search and can only influence it by asking it to
// halt, which the search reports as `SearchOutcome::Halted`.

use log::error;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::ops::ControlFlow;

use crate::grid::Cell;

/// Snapshot passed to observers once per expansion
#[derive(Debug, Clone, Copy)]
pub struct ExpansionEvent<'a> {
    /// Path to the popped node, start cell excluded
    pub partial_path: &'a [Cell],
    /// Head cells of every state marked visited so far
    pub visited_heads: &'a HashSet<Cell>,
    /// Expansions so far, including this one
    pub nodes_expanded: usize,
    /// Live frontier entries after the pop; superseded A* entries are not counted
    pub frontier_size: usize,
}

impl ExpansionEvent<'_> {
    /// Head of the popped node, `None` for the start node
    pub fn head(&self) -> Option<Cell> {
        self.partial_path.last().copied()
    }
}

/// Receives expansion notifications from a running search
pub trait ExplorationObserver {
    /// Called once per popped node, before the goal test
    ///
    /// Returning `ControlFlow::Break(())` halts the search with `found = false`.
    fn on_expand(&mut self, event: &ExpansionEvent<'_>) -> ControlFlow<()>;
}

/// Observer backed by a closure, see [`from_fn`]
pub struct FnObserver<F>(F);

impl<F> ExplorationObserver for FnObserver<F>
where
    F: FnMut(&ExpansionEvent<'_>) -> ControlFlow<()>,
{
    fn on_expand(&mut self, event: &ExpansionEvent<'_>) -> ControlFlow<()> {
        (self.0)(event)
    }
}

/// Wraps a closure as an observer
pub fn from_fn<F>(f: F) -> FnObserver<F>
where
    F: FnMut(&ExpansionEvent<'_>) -> ControlFlow<()>,
{
    FnObserver(f)
}

/// One recorded expansion, owned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionRecord {
    pub partial_path: Vec<Cell>,
    pub visited_heads: usize,
    pub nodes_expanded: usize,
    pub frontier_size: usize,
}

/// Keeps every expansion in memory, e.g. to animate the search afterwards
#[derive(Debug, Default)]
pub struct ExplorationRecorder {
    records: Vec<ExpansionRecord>,
}

impl ExplorationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ExpansionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ExpansionRecord> {
        self.records
    }
}

impl ExplorationObserver for ExplorationRecorder {
    fn on_expand(&mut self, event: &ExpansionEvent<'_>) -> ControlFlow<()> {
        self.records.push(ExpansionRecord {
            partial_path: event.partial_path.to_vec(),
            visited_heads: event.visited_heads.len(),
            nodes_expanded: event.nodes_expanded,
            frontier_size: event.frontier_size,
        });
        ControlFlow::Continue(())
    }
}

/// Represents a single trace line
#[derive(Debug, Serialize)]
struct TraceEntry {
    expansion: usize,
    head: Option<Cell>,
    depth: usize,
    frontier_size: usize,
    visited_heads: usize,
    timestamp: String,
}

/// Writes one JSON line per expansion to a trace file
///
/// Write failures are logged and disable the recorder; they never halt the search.
pub struct TraceRecorder {
    writer: Option<BufWriter<File>>,
    entries_written: usize,
}

impl TraceRecorder {
    /// Creates a new trace recorder
    /// If enabled is true, initializes the trace file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return TraceRecorder::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Exploration trace enabled: {}", log_file_path);
                TraceRecorder {
                    writer: Some(BufWriter::new(file)),
                    entries_written: 0,
                }
            }
            Err(e) => {
                error!("Failed to create trace file '{}': {}", log_file_path, e);
                TraceRecorder::disabled()
            }
        }
    }

    /// Creates a disabled recorder (no-op)
    pub fn disabled() -> Self {
        TraceRecorder {
            writer: None,
            entries_written: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Flushes buffered lines to disk
    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                error!("Failed to flush exploration trace: {}", e);
                self.writer = None;
            }
        }
    }

    fn write_entry(writer: &mut BufWriter<File>, entry: &TraceEntry) -> std::io::Result<()> {
        serde_json::to_writer(&mut *writer, entry)?;
        writer.write_all(b"\n")
    }
}

impl ExplorationObserver for TraceRecorder {
    fn on_expand(&mut self, event: &ExpansionEvent<'_>) -> ControlFlow<()> {
        let Some(writer) = self.writer.as_mut() else {
            return ControlFlow::Continue(());
        };

        let entry = TraceEntry {
            expansion: event.nodes_expanded,
            head: event.head(),
            depth: event.partial_path.len(),
            frontier_size: event.frontier_size,
            visited_heads: event.visited_heads.len(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        match Self::write_entry(writer, &entry) {
            Ok(()) => self.entries_written += 1,
            Err(e) => {
                error!("Failed to write exploration trace entry: {}", e);
                self.writer = None;
            }
        }

        ControlFlow::Continue(())
    }
}

impl Drop for TraceRecorder {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event<'a>(path: &'a [Cell], visited: &'a HashSet<Cell>, n: usize) -> ExpansionEvent<'a> {
        ExpansionEvent {
            partial_path: path,
            visited_heads: visited,
            nodes_expanded: n,
            frontier_size: 2,
        }
    }

    #[test]
    fn test_event_head() {
        let visited = HashSet::new();
        assert_eq!(event(&[], &visited, 1).head(), None);
        let path = [Cell::new(0, 1), Cell::new(0, 2)];
        assert_eq!(event(&path, &visited, 1).head(), Some(Cell::new(0, 2)));
    }

    #[test]
    fn test_from_fn_observer_can_halt() {
        let mut calls = 0;
        let mut observer = from_fn(|e: &ExpansionEvent<'_>| {
            calls += 1;
            if e.nodes_expanded >= 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        let visited = HashSet::new();
        assert_eq!(observer.on_expand(&event(&[], &visited, 1)), ControlFlow::Continue(()));
        assert_eq!(observer.on_expand(&event(&[], &visited, 2)), ControlFlow::Break(()));
        drop(observer);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_recorder_keeps_owned_copies() {
        let mut recorder = ExplorationRecorder::new();
        let mut visited = HashSet::new();
        visited.insert(Cell::new(1, 1));
        let path = [Cell::new(1, 1)];

        let _ = recorder.on_expand(&event(&path, &visited, 1));
        assert_eq!(recorder.records().len(), 1);
        assert_eq!(recorder.records()[0].partial_path, vec![Cell::new(1, 1)]);
        assert_eq!(recorder.records()[0].visited_heads, 1);
    }

    #[test]
    fn test_disabled_trace_recorder_is_noop() {
        let mut recorder = TraceRecorder::new(false, "unused.jsonl");
        assert!(!recorder.is_enabled());
        let visited = HashSet::new();
        assert_eq!(recorder.on_expand(&event(&[], &visited, 1)), ControlFlow::Continue(()));
        assert_eq!(recorder.entries_written(), 0);
    }

    #[test]
    fn test_trace_recorder_writes_json_lines() {
        let path = std::env::temp_dir().join(format!("snake_trace_{}.jsonl", std::process::id()));
        let path_str = path.to_string_lossy().to_string();

        {
            let mut recorder = TraceRecorder::new(true, &path_str);
            assert!(recorder.is_enabled());
            let visited = HashSet::new();
            let cells = [Cell::new(0, 1)];
            let _ = recorder.on_expand(&event(&[], &visited, 1));
            let _ = recorder.on_expand(&event(&cells, &visited, 2));
            assert_eq!(recorder.entries_written(), 2);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["expansion"], 2);
        assert_eq!(second["depth"], 1);
        assert_eq!(second["head"]["y"], 1);

        let _ = std::fs::remove_file(&path);
    }
}
