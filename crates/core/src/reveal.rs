use crate::RevealState;

/// Fraction of the surface that must be cleared before a card counts as
/// fully revealed.
pub const REVEAL_THRESHOLD: f64 = 0.5;

/// Floor on the stamp radius so finger input stays usable on small surfaces.
pub const MIN_STAMP_RADIUS: f64 = 16.0;

/// Anything that can report how much of a slot's scratch surface has been
/// cleared. The rendering layer supplies its own sampler; [`RevealMask`] is
/// the built-in raster implementation.
pub trait MaskSampler {
    fn cleared_fraction(&self) -> f64;
}

/// Per-slot reveal mask: a dense raster of covered/cleared cells. Clearing is
/// monotonic; strokes only ever clear more.
#[derive(Debug, Clone)]
pub struct RevealMask {
    width: usize,
    height: usize,
    cleared: Vec<bool>,
}

impl RevealMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cleared: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Stroke radius for this surface: scales with width, floored for touch.
    pub fn stamp_radius(&self) -> f64 {
        (self.width as f64 / 25.0).max(MIN_STAMP_RADIUS)
    }

    /// Clear a circular stamp at the default radius.
    pub fn stamp(&mut self, x: f64, y: f64) {
        self.stamp_with_radius(x, y, self.stamp_radius());
    }

    pub fn stamp_with_radius(&mut self, x: f64, y: f64, radius: f64) {
        if self.cleared.is_empty() || radius <= 0.0 {
            return;
        }
        let min_x = (x - radius).floor().max(0.0) as usize;
        let max_x = ((x + radius).ceil() as usize).min(self.width.saturating_sub(1));
        let min_y = (y - radius).floor().max(0.0) as usize;
        let max_y = ((y + radius).ceil() as usize).min(self.height.saturating_sub(1));
        let r2 = radius * radius;
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                let dx = cx as f64 + 0.5 - x;
                let dy = cy as f64 + 0.5 - y;
                if dx * dx + dy * dy <= r2 {
                    self.cleared[cy * self.width + cx] = true;
                }
            }
        }
    }
}

impl MaskSampler for RevealMask {
    fn cleared_fraction(&self) -> f64 {
        if self.cleared.is_empty() {
            return 0.0;
        }
        let cleared = self.cleared.iter().filter(|cell| **cell).count();
        cleared as f64 / self.cleared.len() as f64
    }
}

/// Threshold decision, independent of any rendering surface. The caller owns
/// the latch: once a slot is `FullyRevealed` this never demotes it.
pub fn evaluate_reveal(current: RevealState, sampler: &dyn MaskSampler) -> RevealState {
    if current == RevealState::FullyRevealed {
        return RevealState::FullyRevealed;
    }
    if sampler.cleared_fraction() > REVEAL_THRESHOLD {
        RevealState::FullyRevealed
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSampler(f64);

    impl MaskSampler for FixedSampler {
        fn cleared_fraction(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn fresh_mask_is_fully_covered() {
        let mask = RevealMask::new(100, 60);
        assert_eq!(mask.cleared_fraction(), 0.0);
    }

    #[test]
    fn stamp_clears_a_disc() {
        let mut mask = RevealMask::new(100, 100);
        mask.stamp_with_radius(50.0, 50.0, 10.0);
        let fraction = mask.cleared_fraction();
        // pi * 100 cells out of 10_000, give or take rasterization
        assert!(fraction > 0.02 && fraction < 0.05, "fraction {}", fraction);
    }

    #[test]
    fn stamping_is_monotonic() {
        let mut mask = RevealMask::new(80, 40);
        mask.stamp(10.0, 10.0);
        let first = mask.cleared_fraction();
        mask.stamp(10.0, 10.0);
        assert_eq!(mask.cleared_fraction(), first);
        mask.stamp(60.0, 30.0);
        assert!(mask.cleared_fraction() >= first);
    }

    #[test]
    fn radius_is_floored_for_narrow_surfaces() {
        let mask = RevealMask::new(100, 100);
        assert_eq!(mask.stamp_radius(), MIN_STAMP_RADIUS);
        let wide = RevealMask::new(1000, 100);
        assert_eq!(wide.stamp_radius(), 40.0);
    }

    #[test]
    fn threshold_must_be_exceeded() {
        let below = FixedSampler(REVEAL_THRESHOLD);
        assert_eq!(
            evaluate_reveal(RevealState::Revealing, &below),
            RevealState::Revealing
        );
        let above = FixedSampler(0.51);
        assert_eq!(
            evaluate_reveal(RevealState::Revealing, &above),
            RevealState::FullyRevealed
        );
    }

    #[test]
    fn fully_revealed_never_demotes() {
        let empty = FixedSampler(0.0);
        assert_eq!(
            evaluate_reveal(RevealState::FullyRevealed, &empty),
            RevealState::FullyRevealed
        );
    }

    #[test]
    fn stamps_cross_the_threshold_eventually() {
        let mut mask = RevealMask::new(50, 30);
        for step in 0..15 {
            mask.stamp(step as f64 * 4.0 + 2.0, 15.0);
        }
        assert!(mask.cleared_fraction() > REVEAL_THRESHOLD);
    }
}
