use crate::engine::{Divider, EngineParams, LayoutState};

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragPhase {
    Idle,
    Dragging { divider: Divider, anchor: f64 },
}

/// Outcome of ending a drag: the sizes at release time, and whether a
/// container rescale deferred during the drag was replayed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragFinish {
    pub sizes: [f64; 3],
    pub replayed_resize: bool,
}

/// Turns a stream of pointer positions into divider transfers.
///
/// Positions are scalars along the split axis; the caller normalizes mouse
/// or touch coordinates before they get here. The anchor advances only when
/// the engine accepts a delta, so movement rejected at a floor never builds
/// a backlog that would snap the divider once the floor releases.
pub struct ResizeController {
    phase: DragPhase,
    /// Negate deltas (rtl reading direction on the horizontal split axis).
    reversed: bool,
    /// Container extent observed mid-drag, applied after the drag ends.
    pending_extent: Option<f64>,
}

impl ResizeController {
    pub fn new(reversed: bool) -> Self {
        Self {
            phase: DragPhase::Idle,
            reversed,
            pending_extent: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Enter the dragging state anchored at `pos`. Starting while already
    /// dragging re-anchors; the newest pointer-down wins.
    pub fn drag_start(&mut self, divider: Divider, pos: f64) {
        self.phase = DragPhase::Dragging { divider, anchor: pos };
    }

    /// Apply the movement since the last accepted position. Returns whether
    /// the engine took the transfer. A move without a preceding start is
    /// ignored.
    pub fn drag_move(&mut self, state: &mut LayoutState, pos: f64, params: &EngineParams) -> bool {
        let DragPhase::Dragging { divider, anchor } = self.phase else {
            return false;
        };
        let mut delta = pos - anchor;
        if self.reversed {
            delta = -delta;
        }
        if delta == 0.0 {
            return false;
        }
        let applied = state.apply_drag(divider, delta, params);
        if applied {
            self.phase = DragPhase::Dragging { divider, anchor: pos };
        }
        applied
    }

    /// Leave the dragging state, replaying any container rescale that was
    /// deferred while the drag was live. Idempotent: a duplicate end is a
    /// no-op and returns `None`.
    pub fn drag_end(
        &mut self,
        state: &mut LayoutState,
        params: &EngineParams,
    ) -> Option<DragFinish> {
        if !self.is_dragging() {
            return None;
        }
        self.phase = DragPhase::Idle;
        let sizes = state.sizes;
        let replayed_resize = match self.pending_extent.take() {
            Some(extent) => {
                state.rescale(extent, params);
                true
            }
            None => false,
        };
        Some(DragFinish {
            sizes,
            replayed_resize,
        })
    }

    /// Route a container extent change into the engine: applied right away
    /// when idle, queued while dragging so the two size-mutation sources
    /// never race. Returns whether the state changed now.
    pub fn observe_extent(
        &mut self,
        state: &mut LayoutState,
        extent: f64,
        params: &EngineParams,
    ) -> bool {
        if self.is_dragging() {
            self.pending_extent = Some(extent);
            false
        } else {
            state.rescale(extent, params);
            true
        }
    }
}
