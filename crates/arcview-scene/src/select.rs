//! Pixel selection
//!
//! Picking follows a three-phase protocol. [`Selector::begin_selection`]
//! clears the hit buffer and yields the [`PickRegion`] the application
//! must restrict its frustum to while drawing tagged objects; during that
//! draw the application reports candidates with [`Selector::push_hit`];
//! [`Selector::end_selection`] resolves the nearest hit.

/// Rectangular pick region centered on the selection pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRegion {
    /// Center pixel, origin in the upper left corner.
    pub center: (f32, f32),
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
}

/// One tagged object seen in the pick region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionHit {
    /// Application-chosen object id.
    pub id: u32,
    /// Minimum depth at which the object was seen (smaller is closer).
    pub min_depth: f32,
}

/// Hit collection and resolution state.
#[derive(Debug, Clone)]
pub struct Selector {
    region_width: u32,
    region_height: u32,
    capacity: usize,
    hits: Vec<SelectionHit>,
    truncated: bool,
    selected: Option<u32>,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            region_width: 3,
            region_height: 3,
            capacity: 1000,
            hits: Vec::new(),
            truncated: false,
            selected: None,
        }
    }
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick region width in pixels (default 3).
    pub fn set_region_width(&mut self, width: u32) {
        self.region_width = width.max(1);
    }

    /// Pick region height in pixels (default 3).
    pub fn set_region_height(&mut self, height: u32) {
        self.region_height = height.max(1);
    }

    /// Maximum number of recorded hits (default 1000).
    ///
    /// Hits past the capacity are silently dropped, mirroring the
    /// fixed-size select buffer of the underlying picking mechanism; size
    /// it for the densest expected pick region.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The id resolved by the last selection, `None` when nothing was hit.
    pub fn selected_id(&self) -> Option<u32> {
        self.selected
    }

    /// Override the selection result (applications may preset it).
    pub fn set_selected_id(&mut self, id: Option<u32>) {
        self.selected = id;
    }

    /// Begin a selection at `pixel`: clears the hit buffer and returns
    /// the region the draw-with-names callback must honor.
    pub fn begin_selection(&mut self, pixel: (f32, f32)) -> PickRegion {
        self.hits.clear();
        self.truncated = false;
        PickRegion {
            center: pixel,
            width: self.region_width,
            height: self.region_height,
        }
    }

    /// Record a tagged hit. Beyond the capacity the hit is dropped.
    pub fn push_hit(&mut self, id: u32, min_depth: f32) {
        if self.hits.len() >= self.capacity {
            self.truncated = true;
            return;
        }
        self.hits.push(SelectionHit { id, min_depth });
    }

    /// Number of hits recorded since `begin_selection`.
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    /// Whether the last draw produced more hits than the buffer holds.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Resolve the nearest recorded hit.
    ///
    /// The hit with the smallest minimum depth wins; ties keep the first
    /// recorded. Stores and returns the winner's id, `None` without hits.
    pub fn end_selection(&mut self) -> Option<u32> {
        if self.truncated {
            log::warn!(
                "selection hit buffer truncated at {} hits; increase the capacity",
                self.capacity
            );
        }

        let mut winner: Option<SelectionHit> = None;
        for hit in &self.hits {
            match &winner {
                Some(best) if hit.min_depth >= best.min_depth => {}
                _ => winner = Some(*hit),
            }
        }

        self.selected = winner.map(|hit| hit.id);
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_hit_wins() {
        let mut selector = Selector::new();
        selector.begin_selection((100.0, 100.0));
        selector.push_hit(5, 10.0);
        selector.push_hit(7, 3.0);

        assert_eq!(selector.end_selection(), Some(7));
        assert_eq!(selector.selected_id(), Some(7));
    }

    #[test]
    fn test_no_hits_is_none() {
        let mut selector = Selector::new();
        selector.begin_selection((0.0, 0.0));
        assert_eq!(selector.end_selection(), None);
        assert_eq!(selector.selected_id(), None);
    }

    #[test]
    fn test_depth_tie_keeps_first() {
        let mut selector = Selector::new();
        selector.begin_selection((0.0, 0.0));
        selector.push_hit(1, 2.0);
        selector.push_hit(2, 2.0);
        assert_eq!(selector.end_selection(), Some(1));
    }

    #[test]
    fn test_begin_clears_previous_hits() {
        let mut selector = Selector::new();
        selector.begin_selection((0.0, 0.0));
        selector.push_hit(1, 1.0);
        selector.end_selection();

        selector.begin_selection((0.0, 0.0));
        assert_eq!(selector.hit_count(), 0);
        assert_eq!(selector.end_selection(), None);
    }

    #[test]
    fn test_capacity_truncates_silently() {
        let mut selector = Selector::new();
        selector.set_capacity(2);
        selector.begin_selection((0.0, 0.0));
        selector.push_hit(1, 5.0);
        selector.push_hit(2, 4.0);
        selector.push_hit(3, 0.1); // dropped
        assert_eq!(selector.hit_count(), 2);
        assert!(selector.was_truncated());
        assert_eq!(selector.end_selection(), Some(2));
    }

    #[test]
    fn test_region_parameters() {
        let mut selector = Selector::new();
        selector.set_region_width(5);
        selector.set_region_height(7);
        let region = selector.begin_selection((10.0, 20.0));
        assert_eq!(region.width, 5);
        assert_eq!(region.height, 7);
        assert_eq!(region.center, (10.0, 20.0));
    }
}
