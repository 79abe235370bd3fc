//! Preview session – ties the parameter store, render pipeline, measurer,
//! and pagination engine into one unit the presentation layer drives.
//!
//! The store and the pipeline are independent producers: a parameter change
//! and a fresh render result both invalidate the cached pagination. Triggers
//! are coalesced through a [`FrameScheduler`], so any burst of changes costs
//! one recompute pass on the next `run_due` call (one per display refresh).

use std::sync::Arc;

use crate::measure::Measure;
use crate::paginate::{FrameScheduler, PageGeometry, Pagination};
use crate::params::{Field, ParamStore, ParameterSeed};
use crate::render::{Convert, DisplayState, RenderPipeline};

pub struct PreviewSession<M: Measure> {
    store: ParamStore,
    pipeline: RenderPipeline,
    measurer: M,
    scheduler: FrameScheduler,
    pagination: Pagination,
    /// Last pipeline revision folded into `pagination`.
    seen_revision: u64,
}

impl<M: Measure> PreviewSession<M> {
    pub fn new(converter: Arc<dyn Convert>, seed: &ParameterSeed, measurer: M) -> Self {
        let mut session = Self {
            store: ParamStore::new(seed),
            pipeline: RenderPipeline::new(converter),
            measurer,
            scheduler: FrameScheduler::new(),
            pagination: Pagination::Continuous,
            seen_revision: 0,
        };
        // Initial pass so the session starts from a consistent layout.
        session.scheduler.schedule();
        session
    }

    pub fn params(&self) -> &ParamStore {
        &self.store
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn display(&self) -> DisplayState {
        self.pipeline.snapshot()
    }

    pub fn print_css(&self) -> String {
        self.store.print_css()
    }

    /// Set one tunable from raw input; schedules a repagination pass when
    /// the field can move geometry or content extent.
    pub fn set_param(&mut self, field: Field, raw: &str) {
        if self.store.set(field, raw) {
            self.scheduler.schedule();
        }
    }

    /// Restore every tunable to its captured default.
    pub fn reset_params(&mut self) {
        self.store.reset_all();
        self.scheduler.schedule();
    }

    pub fn toggle_settings(&mut self) {
        self.store.settings_open = !self.store.settings_open;
    }

    /// The presentation layer's viewport changed size.
    pub fn viewport_resized(&mut self) {
        self.scheduler.schedule();
    }

    /// Run at most one recompute pass if anything is due. Call once per
    /// display refresh.
    ///
    /// Returns true when the pagination was rebuilt.
    pub fn run_due(&mut self) -> bool {
        if self.pipeline.snapshot().revision != self.seen_revision {
            self.scheduler.schedule();
        }
        if !self.scheduler.take_due() {
            return false;
        }
        self.recompute();
        true
    }

    /// One wholesale pagination pass: resolve geometry, measure the current
    /// fragment, rebuild the slice sequence. Prior slices are discarded,
    /// never patched.
    fn recompute(&mut self) {
        let display = self.pipeline.snapshot();
        let params = self.store.live();
        let geometry = PageGeometry::from_params(params);
        let content_height = match geometry {
            Some(_) => self
                .measurer
                .extent(display.fragment(), params, &params.scale()),
            // Geometry unknown: skip measuring, the content flows unbroken.
            None => 0.0,
        };
        self.pagination = Pagination::compute(content_height, geometry);
        self.seen_revision = display.revision;
    }
}
