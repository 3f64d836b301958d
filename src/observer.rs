/// Which way panes are stacked. `Vertical` places them side by side and
/// splits along the horizontal axis; `Horizontal` stacks them top to
/// bottom and splits along the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Tracks the container's extent along the split axis and reports only
/// real changes, so unrelated redraw passes never trigger a reflow.
pub struct DimensionObserver {
    orientation: Orientation,
    last_extent: Option<f64>,
}

impl DimensionObserver {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            last_extent: None,
        }
    }

    /// Feed a raw container measurement. Returns the split-axis extent
    /// only when it is positive and differs from the last one seen.
    pub fn observe(&mut self, width: u16, height: u16) -> Option<f64> {
        let extent = match self.orientation {
            Orientation::Vertical => width,
            Orientation::Horizontal => height,
        } as f64;
        if extent <= 0.0 {
            return None;
        }
        if self.last_extent == Some(extent) {
            return None;
        }
        self.last_extent = Some(extent);
        Some(extent)
    }
}
