use crate::marker::{project, MarkerDescriptor};
use crate::surface::MapSurface;
use crate::types::RawPointRow;
use crate::validate::validate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the "Total Locations Shown" label counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Every row handed to `update`, including rows that fail validation.
    #[default]
    InputRows,
    /// Only rows that became markers.
    Rendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Empty,
    Populated,
}

/// A marker set built ahead of time, ready to be swapped in by [`DisplaySync::apply`].
#[derive(Debug, Clone)]
pub struct MarkerSnapshot {
    pub markers: Vec<MarkerDescriptor>,
    pub input_rows: usize,
    pub rejected: usize,
}

/// Validate and project every row. Order of the surviving markers follows the input.
pub fn prepare(rows: &[RawPointRow]) -> MarkerSnapshot {
    let results: Vec<_> = rows
        .par_iter()
        .map(|row| validate(row).map(|point| project(&point)))
        .collect();

    let mut markers = Vec::with_capacity(results.len());
    let mut rejected = 0;
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(marker) => markers.push(marker),
            Err(reason) => {
                debug!(row = index, %reason, "Skipping row");
                rejected += 1;
            }
        }
    }

    MarkerSnapshot { markers, input_rows: rows.len(), rejected }
}

pub fn count_label(count: usize) -> String {
    format!("Total Locations Shown: {}", count)
}

/// Owns the live marker set and the displayed count, and pushes both to the surface.
pub struct DisplaySync<S> {
    surface: S,
    count_mode: CountMode,
    markers: Vec<MarkerDescriptor>,
    count: usize,
    state: DisplayState,
}

impl<S: MapSurface> DisplaySync<S> {
    pub fn new(surface: S, count_mode: CountMode) -> Self {
        Self {
            surface,
            count_mode,
            markers: Vec::new(),
            count: 0,
            state: DisplayState::Empty,
        }
    }

    /// Replace every displayed marker and the count with this dataset.
    pub fn update(&mut self, rows: &[RawPointRow]) {
        let snapshot = prepare(rows);
        self.apply(snapshot);
    }

    /// Clear, repopulate and relabel in one step. `&mut self` keeps observers out until it returns.
    pub fn apply(&mut self, snapshot: MarkerSnapshot) {
        let count = match self.count_mode {
            CountMode::InputRows => snapshot.input_rows,
            CountMode::Rendered => snapshot.markers.len(),
        };

        self.surface.clear_markers();
        for marker in &snapshot.markers {
            self.surface.add_marker(marker);
        }
        self.surface.set_count_label(&count_label(count));

        debug!(
            markers = snapshot.markers.len(),
            rejected = snapshot.rejected,
            count,
            "Display updated"
        );

        self.markers = snapshot.markers;
        self.count = count;
        self.state = DisplayState::Populated;
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        &self.markers
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn count_label(&self) -> String {
        count_label(self.count)
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn count_mode(&self) -> CountMode {
        self.count_mode
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// For layers the display does not own (boundary, base layers).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
