use tracing::debug;

use crate::controller::ResizeController;
use crate::engine::{
    Divider, EngineParams, LayoutState, SidePane, Visibility, DEFAULT_MIN_SIZE,
};
use crate::observer::{DimensionObserver, Orientation};
use crate::store::{self, DebouncedSaver, SavedLayout};

/// Reading direction. `Rtl` flips drag deltas, on the horizontal split
/// axis only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

#[derive(Clone, Copy, Debug)]
pub struct PaneOptions {
    pub visible: bool,
    /// Fractional extent used when the pane is shown with nothing cached.
    pub preferred_ratio: Option<f64>,
}

impl Default for PaneOptions {
    fn default() -> Self {
        Self {
            visible: true,
            preferred_ratio: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewOptions {
    pub orientation: Orientation,
    pub direction: Direction,
    pub first: PaneOptions,
    pub middle: PaneOptions,
    pub third: PaneOptions,
    /// Enables persistence; `None` runs stateless.
    pub storage_key: Option<String>,
    pub min_size: f64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            direction: Direction::Ltr,
            first: PaneOptions::default(),
            middle: PaneOptions::default(),
            third: PaneOptions::default(),
            storage_key: None,
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

/// Optional callbacks, invoked synchronously from the operation that
/// changed the layout.
#[derive(Default)]
pub struct LayoutHooks {
    pub on_drag_started: Option<Box<dyn FnMut()>>,
    pub on_drag_finished: Option<Box<dyn FnMut([f64; 3])>>,
    pub on_change: Option<Box<dyn FnMut([f64; 3])>>,
}

/// The assembled three-pane split: one `LayoutState` fed by the dimension
/// observer, the drag controller, and visibility toggles, with debounced
/// persistence behind an optional storage key.
///
/// The state does not exist until the first positive container measurement
/// arrives; operations before that point only record intent.
pub struct SplitView {
    params: EngineParams,
    requested: Visibility,
    state: Option<LayoutState>,
    controller: ResizeController,
    observer: DimensionObserver,
    saver: Option<DebouncedSaver>,
    storage_key: Option<String>,
    hooks: LayoutHooks,
}

impl SplitView {
    /// Build the view. When `options.storage_key` is set this spawns the
    /// debounced writer task and must run inside a tokio runtime.
    pub fn new(options: ViewOptions, hooks: LayoutHooks) -> Self {
        let reversed =
            options.direction == Direction::Rtl && options.orientation == Orientation::Vertical;
        let ratios = [
            options.first.preferred_ratio.unwrap_or(0.25),
            options.middle.preferred_ratio.unwrap_or(0.5),
            options.third.preferred_ratio.unwrap_or(0.25),
        ];
        let params = EngineParams {
            min_size: options.min_size,
            ratios,
        };
        let requested = Visibility {
            first: options.first.visible,
            third: options.third.visible,
        };
        let saver = options
            .storage_key
            .as_deref()
            .and_then(DebouncedSaver::for_key);
        Self {
            params,
            requested,
            state: None,
            controller: ResizeController::new(reversed),
            observer: DimensionObserver::new(options.orientation),
            saver,
            storage_key: options.storage_key,
            hooks,
        }
    }

    pub fn sizes(&self) -> Option<[f64; 3]> {
        self.state.as_ref().map(|s| s.sizes)
    }

    pub fn state(&self) -> Option<&LayoutState> {
        self.state.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        self.requested
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Feed a raw container measurement (both axes). The first positive
    /// extent creates the layout, from the persisted record when one is
    /// usable; later changes rescale it, deferred while a drag is live.
    pub fn container_resized(&mut self, width: u16, height: u16) {
        let Some(extent) = self.observer.observe(width, height) else {
            return;
        };
        if self.state.is_none() {
            let state = self.restore_or_initial(extent);
            self.state = Some(state);
            self.notify_change();
        } else if let Some(state) = self.state.as_mut() {
            if self.controller.observe_extent(state, extent, &self.params) {
                self.persist();
                self.notify_change();
            }
        }
    }

    /// Show or hide a side pane. Before the first measurement this only
    /// records the request; afterwards it reflows immediately.
    pub fn set_pane_visible(&mut self, pane: SidePane, visible: bool) {
        if self.requested.of(pane) == visible {
            return;
        }
        self.requested.set(pane, visible);
        if let Some(state) = self.state.as_mut() {
            state.set_visible(pane, visible, &self.params);
            self.persist();
            self.notify_change();
        }
    }

    /// Begin dragging a divider at the given split-axis position.
    pub fn drag_start(&mut self, divider: Divider, pos: f64) {
        if self.state.is_none() {
            return;
        }
        self.controller.drag_start(divider, pos);
        if let Some(cb) = &mut self.hooks.on_drag_started {
            cb();
        }
    }

    /// Track pointer movement during a drag.
    pub fn drag_move(&mut self, pos: f64) {
        let applied = match self.state.as_mut() {
            Some(state) => self.controller.drag_move(state, pos, &self.params),
            None => false,
        };
        if applied {
            self.notify_change();
        }
    }

    /// End the drag, persist the result, and replay any rescale that came
    /// in while the drag was live. Safe to call on duplicate end events.
    pub fn drag_end(&mut self) {
        let finish = match self.state.as_mut() {
            Some(state) => self.controller.drag_end(state, &self.params),
            None => None,
        };
        let Some(finish) = finish else {
            return;
        };
        self.persist();
        if let Some(cb) = &mut self.hooks.on_drag_finished {
            cb(finish.sizes);
        }
        if finish.replayed_resize {
            self.notify_change();
        }
    }

    /// Keyboard-driven divider movement: one fixed delta straight through
    /// the engine, same floor rules as a pointer drag.
    pub fn nudge_divider(&mut self, divider: Divider, delta: f64) {
        let applied = match self.state.as_mut() {
            Some(state) => state.apply_drag(divider, delta, &self.params),
            None => false,
        };
        if applied {
            self.persist();
            self.notify_change();
        }
    }

    /// Reset every visible pane to an equal share. Ignored mid-drag.
    pub fn equalize(&mut self) {
        if self.controller.is_dragging() || self.state.is_none() {
            return;
        }
        if let Some(state) = self.state.as_mut() {
            state.equalize(&self.params);
        }
        self.persist();
        self.notify_change();
    }

    fn restore_or_initial(&self, extent: f64) -> LayoutState {
        if let Some(saved) = self.storage_key.as_deref().and_then(store::load) {
            if let Some(state) = restore_state(&saved, self.requested, extent, &self.params) {
                debug!(extent, "restored layout from saved record");
                return state;
            }
        }
        LayoutState::initial(extent, self.requested, &self.params)
    }

    fn persist(&self) {
        let (Some(saver), Some(state)) = (&self.saver, &self.state) else {
            return;
        };
        saver.request(SavedLayout {
            sizes: state.sizes,
            visibility: state.visibility,
            previous_sizes: state.hidden_sizes,
        });
    }

    fn notify_change(&mut self) {
        if let Some(state) = &self.state {
            if let Some(cb) = &mut self.hooks.on_change {
                cb(state.sizes);
            }
        }
    }
}

/// Rebuild a layout from a persisted record against the currently
/// requested visibility.
///
/// Saved pane sizes are honored only where the saved visibility matches
/// the requested one; a mismatched pane is reconciled through the engine's
/// normal hide/show transition instead, after a proportional rescale to
/// the measured extent.
pub(crate) fn restore_state(
    saved: &SavedLayout,
    requested: Visibility,
    extent: f64,
    params: &EngineParams,
) -> Option<LayoutState> {
    if !saved.is_structurally_valid() {
        return None;
    }
    let mut state = LayoutState {
        sizes: saved.sizes,
        visibility: saved.visibility,
        hidden_sizes: saved.previous_sizes,
        container_extent: saved.sizes.iter().sum(),
    };
    state.rescale(extent, params);
    for pane in [SidePane::First, SidePane::Third] {
        if state.visibility.of(pane) != requested.of(pane) {
            state.set_visible(pane, requested.of(pane), params);
        }
    }
    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HiddenSizes;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn options() -> ViewOptions {
        ViewOptions::default()
    }

    fn change_log() -> (LayoutHooks, Rc<RefCell<Vec<[f64; 3]>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let hooks = LayoutHooks {
            on_change: Some(Box::new(move |sizes| sink.borrow_mut().push(sizes))),
            ..LayoutHooks::default()
        };
        (hooks, log)
    }

    #[test]
    fn test_first_measurement_creates_layout() {
        let (hooks, log) = change_log();
        let mut view = SplitView::new(options(), hooks);
        assert_eq!(view.sizes(), None);

        view.container_resized(900, 40);
        assert_eq!(view.sizes(), Some([300.0, 300.0, 300.0]));
        assert_eq!(log.borrow().as_slice(), &[[300.0, 300.0, 300.0]]);
    }

    #[test]
    fn test_redundant_measurement_is_silent() {
        let (hooks, log) = change_log();
        let mut view = SplitView::new(options(), hooks);
        view.container_resized(900, 40);
        view.container_resized(900, 40);
        view.container_resized(900, 25);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_visibility_request_before_measurement() {
        let mut view = SplitView::new(options(), LayoutHooks::default());
        view.set_pane_visible(SidePane::Third, false);
        view.container_resized(900, 40);
        assert_eq!(view.sizes(), Some([450.0, 450.0, 0.0]));
    }

    #[test]
    fn test_toggle_after_measurement_reflows() {
        let mut view = SplitView::new(options(), LayoutHooks::default());
        view.container_resized(900, 40);
        view.set_pane_visible(SidePane::First, false);
        assert_eq!(view.sizes(), Some([0.0, 600.0, 300.0]));
        view.set_pane_visible(SidePane::First, true);
        assert_eq!(view.sizes(), Some([300.0, 300.0, 300.0]));
    }

    #[test]
    fn test_drag_lifecycle_fires_hooks() {
        let started = Rc::new(RefCell::new(0));
        let finished = Rc::new(RefCell::new(Vec::new()));
        let started_sink = Rc::clone(&started);
        let finished_sink = Rc::clone(&finished);
        let hooks = LayoutHooks {
            on_drag_started: Some(Box::new(move || *started_sink.borrow_mut() += 1)),
            on_drag_finished: Some(Box::new(move |sizes| finished_sink.borrow_mut().push(sizes))),
            on_change: None,
        };
        let mut view = SplitView::new(options(), hooks);
        view.container_resized(900, 40);

        view.drag_start(Divider::FirstMiddle, 300.0);
        view.drag_move(330.0);
        view.drag_end();
        view.drag_end(); // duplicate end must not re-fire

        assert_eq!(*started.borrow(), 1);
        assert_eq!(finished.borrow().as_slice(), &[[330.0, 270.0, 300.0]]);
    }

    #[test]
    fn test_drag_move_without_start_is_ignored() {
        let mut view = SplitView::new(options(), LayoutHooks::default());
        view.container_resized(900, 40);
        view.drag_move(500.0);
        assert_eq!(view.sizes(), Some([300.0, 300.0, 300.0]));
    }

    #[test]
    fn test_resize_during_drag_waits_for_release() {
        let mut view = SplitView::new(options(), LayoutHooks::default());
        view.container_resized(900, 40);
        view.drag_start(Divider::FirstMiddle, 300.0);
        view.container_resized(1800, 40);
        assert_eq!(view.sizes(), Some([300.0, 300.0, 300.0]));
        view.drag_end();
        assert_eq!(view.sizes(), Some([600.0, 600.0, 600.0]));
    }

    #[test]
    fn test_nudge_respects_floor() {
        let mut view = SplitView::new(options(), LayoutHooks::default());
        view.container_resized(180, 40);
        // 60 each; a 20-cell nudge would push the middle below 50.
        view.nudge_divider(Divider::FirstMiddle, 20.0);
        assert_eq!(view.sizes(), Some([60.0, 60.0, 60.0]));
        view.nudge_divider(Divider::FirstMiddle, 5.0);
        assert_eq!(view.sizes(), Some([65.0, 55.0, 60.0]));
    }

    #[test]
    fn test_equalize_through_view() {
        let mut view = SplitView::new(options(), LayoutHooks::default());
        view.container_resized(900, 40);
        view.nudge_divider(Divider::MiddleThird, 100.0);
        view.equalize();
        assert_eq!(view.sizes(), Some([300.0, 300.0, 300.0]));
    }

    fn saved(sizes: [f64; 3], first: bool, third: bool, cache: HiddenSizes) -> SavedLayout {
        SavedLayout {
            sizes,
            visibility: Visibility { first, third },
            previous_sizes: cache,
        }
    }

    #[test]
    fn test_restore_honors_matching_visibility() {
        let params = EngineParams::default();
        let record = saved([200.0, 400.0, 300.0], true, true, HiddenSizes::default());
        let requested = Visibility {
            first: true,
            third: true,
        };
        let state = restore_state(&record, requested, 900.0, &params).unwrap();
        assert_eq!(state.sizes, [200.0, 400.0, 300.0]);
    }

    #[test]
    fn test_restore_rescales_to_new_extent() {
        let params = EngineParams::default();
        let record = saved([200.0, 400.0, 300.0], true, true, HiddenSizes::default());
        let requested = Visibility {
            first: true,
            third: true,
        };
        let state = restore_state(&record, requested, 450.0, &params).unwrap();
        assert_eq!(state.sizes, [100.0, 200.0, 150.0]);
    }

    #[test]
    fn test_restore_discards_pane_now_hidden() {
        let params = EngineParams::default();
        let record = saved([200.0, 400.0, 300.0], true, true, HiddenSizes::default());
        let requested = Visibility {
            first: true,
            third: false,
        };
        let state = restore_state(&record, requested, 900.0, &params).unwrap();
        // The third pane's saved size folds into the middle, as a live
        // hide would have done.
        assert_eq!(state.sizes, [200.0, 700.0, 0.0]);
        assert_eq!(state.hidden_sizes.third, Some(300.0));
    }

    #[test]
    fn test_restore_shows_pane_hidden_in_record() {
        let params = EngineParams::default();
        let cache = HiddenSizes {
            first: Some(250.0),
            third: None,
        };
        let record = saved([0.0, 600.0, 300.0], false, true, cache);
        let requested = Visibility {
            first: true,
            third: true,
        };
        let state = restore_state(&record, requested, 900.0, &params).unwrap();
        assert_eq!(state.sizes, [250.0, 350.0, 300.0]);
        assert!(state.hidden_sizes.first.is_none());
    }

    #[test]
    fn test_restore_rejects_invalid_record() {
        let params = EngineParams::default();
        let record = saved([0.0, 0.0, 0.0], true, true, HiddenSizes::default());
        let requested = Visibility {
            first: true,
            third: true,
        };
        assert!(restore_state(&record, requested, 900.0, &params).is_none());
    }
}
