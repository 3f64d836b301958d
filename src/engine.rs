use serde::{Deserialize, Serialize};

/// Hard floor applied to every visible pane, in container units.
pub const DEFAULT_MIN_SIZE: f64 = 50.0;

/// Residues below one cell are parked on the middle pane instead of being
/// redistributed any further.
const SUM_TOLERANCE: f64 = 1.0;

/// Float-noise guard for "the sum already matches" checks.
const EPSILON: f64 = 1e-9;

/// The two externally toggleable layout slots. The middle pane is always
/// visible and has no `SidePane` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidePane {
    First,
    Third,
}

impl SidePane {
    pub fn slot(self) -> usize {
        match self {
            SidePane::First => 0,
            SidePane::Third => 2,
        }
    }
}

/// A draggable boundary between two adjacent panes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Divider {
    /// Between the first and middle panes.
    FirstMiddle,
    /// Between the middle and third panes.
    MiddleThird,
}

impl Divider {
    /// Slot indices of the panes on either side, in layout order.
    pub fn slots(self) -> (usize, usize) {
        match self {
            Divider::FirstMiddle => (0, 1),
            Divider::MiddleThird => (1, 2),
        }
    }
}

/// Which side panes are currently shown. The middle slot is not tracked
/// here because it can never be hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub first: bool,
    pub third: bool,
}

impl Visibility {
    pub fn slot_visible(&self, slot: usize) -> bool {
        match slot {
            0 => self.first,
            1 => true,
            _ => self.third,
        }
    }

    pub fn of(&self, pane: SidePane) -> bool {
        match pane {
            SidePane::First => self.first,
            SidePane::Third => self.third,
        }
    }

    pub fn set(&mut self, pane: SidePane, visible: bool) {
        match pane {
            SidePane::First => self.first = visible,
            SidePane::Third => self.third = visible,
        }
    }

    pub fn visible_count(&self) -> usize {
        1 + self.first as usize + self.third as usize
    }
}

/// Sizes the side panes held immediately before being hidden, kept so a
/// later show can restore them. Cleared on restore.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HiddenSizes {
    pub first: Option<f64>,
    pub third: Option<f64>,
}

impl HiddenSizes {
    fn take(&mut self, pane: SidePane) -> Option<f64> {
        match pane {
            SidePane::First => self.first.take(),
            SidePane::Third => self.third.take(),
        }
    }

    fn store(&mut self, pane: SidePane, size: f64) {
        match pane {
            SidePane::First => self.first = Some(size),
            SidePane::Third => self.third = Some(size),
        }
    }
}

/// Sizing knobs shared by every operation.
#[derive(Clone, Copy, Debug)]
pub struct EngineParams {
    /// Minimum extent a visible pane may shrink to.
    pub min_size: f64,
    /// Fallback fractional extents, used when a pane is shown with no
    /// cached size to restore.
    pub ratios: [f64; 3],
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            ratios: [0.25, 0.5, 0.25],
        }
    }
}

/// The complete sizing state of the three-slot layout. Mutated only through
/// the operations below; no other code writes to these fields directly.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutState {
    pub sizes: [f64; 3],
    pub visibility: Visibility,
    pub hidden_sizes: HiddenSizes,
    pub container_extent: f64,
}

impl LayoutState {
    /// Compute the starting layout for a fresh container measurement.
    ///
    /// A lone visible pane takes the full extent; otherwise every visible
    /// pane gets an equal share, raised to the floor where the share falls
    /// below it. An undersized container may then logically overflow; that
    /// is accepted rather than corrected.
    pub fn initial(extent: f64, visibility: Visibility, params: &EngineParams) -> Self {
        let count = visibility.visible_count();
        let mut sizes = [0.0; 3];
        if count == 1 {
            sizes[1] = extent;
        } else {
            let share = extent / count as f64;
            for slot in 0..3 {
                if visibility.slot_visible(slot) {
                    sizes[slot] = share.max(params.min_size);
                }
            }
        }
        Self {
            sizes,
            visibility,
            hidden_sizes: HiddenSizes::default(),
            container_extent: extent,
        }
    }

    /// Hide or show a side pane, reflowing the middle pane to compensate.
    ///
    /// Hiding caches the pane's size and hands it to the middle pane.
    /// Showing restores the cached size, or `extent * ratio` when none is
    /// cached, raised to the floor; the middle pane funds the restore but
    /// is never pushed below its own floor.
    pub fn set_visible(&mut self, pane: SidePane, visible: bool, params: &EngineParams) {
        if self.visibility.of(pane) == visible {
            return;
        }
        let slot = pane.slot();
        if visible {
            self.visibility.set(pane, true);
            let fallback = self.container_extent * params.ratios[slot];
            let mut restored = self
                .hidden_sizes
                .take(pane)
                .unwrap_or(fallback)
                .max(params.min_size);
            let slack = self.sizes[1] - params.min_size;
            if restored > slack {
                restored = slack.max(0.0);
            }
            self.sizes[slot] = restored;
            self.sizes[1] -= restored;
        } else {
            self.hidden_sizes.store(pane, self.sizes[slot]);
            self.sizes[1] += self.sizes[slot];
            self.sizes[slot] = 0.0;
            self.visibility.set(pane, false);
        }
        self.correct_sum(params);
    }

    /// Scale every visible pane to a new container extent, clamping each to
    /// the floor. Hidden panes stay at zero. The very first positive
    /// measurement falls back to the initial computation, keeping the
    /// current visibility and any sizes cached by an early hide.
    pub fn rescale(&mut self, new_extent: f64, params: &EngineParams) {
        if new_extent <= 0.0 {
            return;
        }
        let total: f64 = self.sizes.iter().sum();
        if self.container_extent <= 0.0 || total <= 0.0 {
            let hidden = self.hidden_sizes;
            *self = Self::initial(new_extent, self.visibility, params);
            self.hidden_sizes = hidden;
            return;
        }
        let factor = new_extent / self.container_extent;
        for slot in 0..3 {
            if self.visibility.slot_visible(slot) {
                self.sizes[slot] = (self.sizes[slot] * factor).max(params.min_size);
            }
        }
        self.container_extent = new_extent;
        self.correct_sum(params);
    }

    /// Transfer `delta` across a divider: the pane before it grows, the
    /// pane after it shrinks.
    ///
    /// All-or-nothing: if either pane would land below the floor the whole
    /// delta is rejected and the sizes stay untouched. A two-pane transfer
    /// preserves the total, so no correction pass runs here.
    pub fn apply_drag(&mut self, divider: Divider, delta: f64, params: &EngineParams) -> bool {
        let (a, b) = divider.slots();
        if !self.visibility.slot_visible(a) || !self.visibility.slot_visible(b) {
            return false;
        }
        let grown = self.sizes[a] + delta;
        let shrunk = self.sizes[b] - delta;
        if grown < params.min_size || shrunk < params.min_size {
            return false;
        }
        self.sizes[a] = grown;
        self.sizes[b] = shrunk;
        true
    }

    /// Give every visible pane an equal share again. Hidden caches survive
    /// so a later show still restores the pre-hide size.
    pub fn equalize(&mut self, params: &EngineParams) {
        let hidden = self.hidden_sizes;
        *self = Self::initial(self.container_extent, self.visibility, params);
        self.hidden_sizes = hidden;
    }

    /// Restore `sizes[0] + sizes[1] + sizes[2] == container_extent` after a
    /// reflow. Growth lands on the middle pane; shrinkage takes the middle
    /// down to its floor first, then splits the rest equally across visible
    /// side panes down to their floors. A residue under one cell is parked
    /// on the middle pane; anything larger means the floors cannot all be
    /// met and the floors win.
    fn correct_sum(&mut self, params: &EngineParams) {
        let diff = self.container_extent - self.sizes.iter().sum::<f64>();
        if diff.abs() < EPSILON {
            return;
        }
        if diff > 0.0 || self.sizes[1] + diff >= params.min_size {
            self.sizes[1] += diff;
            return;
        }
        let mut remainder = diff + (self.sizes[1] - params.min_size);
        self.sizes[1] = params.min_size;
        // Two rounds at most: if one side pane bottoms out, the second
        // round pushes what it could not take onto the other.
        for _ in 0..2 {
            if remainder.abs() < EPSILON {
                break;
            }
            let absorbers: Vec<usize> = [0usize, 2]
                .into_iter()
                .filter(|&s| self.visibility.slot_visible(s) && self.sizes[s] > params.min_size)
                .collect();
            if absorbers.is_empty() {
                break;
            }
            let share = remainder / absorbers.len() as f64;
            for slot in absorbers {
                let room = params.min_size - self.sizes[slot];
                let taken = share.max(room);
                self.sizes[slot] += taken;
                remainder -= taken;
            }
        }
        if remainder.abs() < SUM_TOLERANCE {
            self.sizes[1] += remainder;
        }
    }
}
