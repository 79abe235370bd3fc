//! Pagination engine – turns one continuous content block into an ordered
//! sequence of fixed-height page windows.
//!
//! Handles:
//! - Usable-height derivation (page height minus top and bottom margins)
//! - Degenerate geometry (falls back to a single continuous flow)
//! - Wholesale recompute: slices are always rebuilt, never patched
//! - Frame-coalesced scheduling of recompute passes

use crate::params::PrintParameters;

/// Resolved page geometry in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_height: f32,
    /// Vertical capacity of one page window.
    pub usable_height: f32,
}

impl PageGeometry {
    /// Derive geometry from the live parameters.
    ///
    /// Returns `None` when the page height is unresolved or the margins eat
    /// the whole page. That is a valid degraded state, not an error: the
    /// caller shows the content as one continuous flow.
    pub fn from_params(params: &PrintParameters) -> Option<Self> {
        let scale = params.scale();
        let page_height = scale.resolve(Some(params.paper_size.height()));
        let margin = scale.resolve(Some(params.margin));
        Self::from_heights(page_height, margin)
    }

    /// Derive geometry from already-resolved pixel heights.
    pub fn from_heights(page_height: f32, margin: f32) -> Option<Self> {
        if !(page_height.is_finite() && page_height > 0.0) {
            return None;
        }
        let usable_height = page_height - 2.0 * margin.max(0.0);
        if !(usable_height.is_finite() && usable_height > 0.0) {
            return None;
        }
        Some(Self {
            page_height,
            usable_height,
        })
    }
}

/// One page window onto the shared content block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    /// 0-based position in the sequence; display labels are 1-indexed.
    pub index: usize,
    /// How far the content is shifted up inside this window.
    pub offset: f32,
    /// Clip height of the window; equals the usable height.
    pub height: f32,
}

impl PageSlice {
    /// Human-facing 1-indexed page number.
    pub fn label(&self) -> usize {
        self.index + 1
    }
}

/// Result of one pagination pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Pagination {
    /// Geometry unknown or degenerate: content shown as one unbroken flow.
    Continuous,
    Paged(Vec<PageSlice>),
}

impl Pagination {
    /// Compute the slice sequence for `content_height` under `geometry`.
    ///
    /// With geometry present the union of the returned windows reconstructs
    /// the content exactly once, top to bottom, with no gaps or overlaps.
    pub fn compute(content_height: f32, geometry: Option<PageGeometry>) -> Self {
        let Some(geometry) = geometry else {
            return Pagination::Continuous;
        };
        let h = geometry.usable_height;
        let count = if content_height > 0.0 {
            ((content_height / h).ceil() as usize).max(1)
        } else {
            1
        };
        let slices = (0..count)
            .map(|i| PageSlice {
                index: i,
                offset: i as f32 * h,
                height: h,
            })
            .collect();
        Pagination::Paged(slices)
    }

    pub fn page_count(&self) -> usize {
        match self {
            Pagination::Continuous => 1,
            Pagination::Paged(slices) => slices.len(),
        }
    }

    pub fn slices(&self) -> &[PageSlice] {
        match self {
            Pagination::Continuous => &[],
            Pagination::Paged(slices) => slices,
        }
    }
}

/// Coalesces recompute triggers to at most one pass per display refresh.
///
/// `schedule` is idempotent: any number of triggers before the next
/// `take_due` collapse into a single pending pass.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self) {
        self.pending = true;
    }

    /// Consume the pending flag; returns true when a pass is due.
    pub fn take_due(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Field, ParamStore};

    #[test]
    fn slices_cover_content_exactly() {
        let geometry = PageGeometry::from_heights(1100.0, 75.0).unwrap();
        assert_eq!(geometry.usable_height, 950.0);
        let pagination = Pagination::compute(2000.0, Some(geometry));
        let slices = pagination.slices();
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].offset, 0.0);
        assert_eq!(slices[1].offset, 950.0);
        assert_eq!(slices[2].offset, 1900.0);
        for s in slices {
            assert_eq!(s.height, 950.0);
        }
        assert_eq!(slices[0].label(), 1);
    }

    #[test]
    fn short_content_still_gets_one_page() {
        let geometry = PageGeometry::from_heights(1000.0, 50.0);
        assert_eq!(Pagination::compute(10.0, geometry).page_count(), 1);
        assert_eq!(Pagination::compute(0.0, geometry).page_count(), 1);
    }

    #[test]
    fn exact_multiple_has_no_trailing_blank_page() {
        let geometry = PageGeometry::from_heights(1000.0, 100.0);
        let pagination = Pagination::compute(1600.0, geometry);
        assert_eq!(pagination.page_count(), 2);
    }

    #[test]
    fn degenerate_geometry_disables_pagination() {
        // Margins consume the whole sheet.
        assert_eq!(PageGeometry::from_heights(100.0, 50.0), None);
        assert_eq!(PageGeometry::from_heights(100.0, 60.0), None);
        assert_eq!(PageGeometry::from_heights(0.0, 10.0), None);
        assert_eq!(Pagination::compute(500.0, None), Pagination::Continuous);
    }

    #[test]
    fn recompute_is_idempotent() {
        let geometry = PageGeometry::from_heights(1100.0, 75.0);
        let first = Pagination::compute(2000.0, geometry);
        let second = Pagination::compute(2000.0, geometry);
        assert_eq!(first, second);
    }

    #[test]
    fn geometry_from_live_params() {
        let mut store = ParamStore::default();
        store.set(Field::Margin, "0.75in");
        let geometry = PageGeometry::from_params(store.live()).unwrap();
        // Letter at 96 dpi: 11in = 1056px, margins 2 × 72px.
        assert_eq!(geometry.page_height, 1056.0);
        assert_eq!(geometry.usable_height, 912.0);
    }

    #[test]
    fn geometry_tracks_zoom() {
        let mut store = ParamStore::default();
        store.set(Field::PreviewZoom, "2.0");
        let geometry = PageGeometry::from_params(store.live()).unwrap();
        assert_eq!(geometry.page_height, 2112.0);
        assert_eq!(geometry.usable_height, 1824.0);
    }

    #[test]
    fn scheduler_coalesces_triggers() {
        let mut scheduler = FrameScheduler::new();
        assert!(!scheduler.take_due());
        scheduler.schedule();
        scheduler.schedule();
        scheduler.schedule();
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());
    }
}
