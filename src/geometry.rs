//! Geometry & size-hint engine. Pure functions over plain rectangles; no
//! window-server handle is touched here, so this module is exercised
//! entirely by unit tests rather than a live display.

/// A candidate or committed window rectangle, always inclusive of the
/// border in layout math that cares about it (callers add `2*bw` where the
/// original macros did).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn width_with_border(&self, bw: i32) -> i32 {
        self.w + 2 * bw
    }

    pub fn height_with_border(&self, bw: i32) -> i32 {
        self.h + 2 * bw
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

/// ICCCM WM_NORMAL_HINTS, as parsed by the size-hint engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeHints {
    pub basew: i32,
    pub baseh: i32,
    pub incw: i32,
    pub inch: i32,
    pub maxw: i32,
    pub maxh: i32,
    pub minw: i32,
    pub minh: i32,
    pub mina: f64,
    pub maxa: f64,
}

impl Default for SizeHints {
    fn default() -> Self {
        SizeHints {
            basew: 0,
            baseh: 0,
            incw: 0,
            inch: 0,
            maxw: 0,
            maxh: 0,
            minw: 0,
            minh: 0,
            mina: 0.0,
            maxa: 0.0,
        }
    }
}

impl SizeHints {
    /// `isfixed` holds iff min and max are equal and nonzero on both axes.
    pub fn is_fixed(&self) -> bool {
        self.maxw > 0 && self.maxh > 0 && self.maxw == self.minw && self.maxh == self.minh
    }
}

/// Applies monitor/screen clamping and (for floating clients) ICCCM
/// §4.1.2.3 aspect/increment/min/max quantization to a candidate rectangle.
/// Returns whether the result differs from `current`.
#[allow(clippy::too_many_arguments)]
pub fn apply_size_hints(
    hints: &SizeHints,
    current: Rect,
    mut cand: Rect,
    bw: i32,
    bounds: Rect,
    interactive: bool,
    honor_hints: bool,
) -> (Rect, bool) {
    // Clamp into the work area (or screen, if interactive) unless the
    // window is requesting to move off-screen entirely during an
    // interactive drag, matching the upstream tolerance of allowing a
    // window to be dragged fully out of view on one axis.
    if interactive {
        if cand.x > bounds.x + bounds.w {
            cand.x = bounds.x + bounds.w - cand.w.max(1);
        }
        if cand.y > bounds.y + bounds.h {
            cand.y = bounds.y + bounds.h - cand.h.max(1);
        }
        if cand.x + cand.w + 2 * bw < bounds.x {
            cand.x = bounds.x;
        }
        if cand.y + cand.h + 2 * bw < bounds.y {
            cand.y = bounds.y;
        }
    } else {
        if cand.x >= bounds.x + bounds.w {
            cand.x = bounds.x + bounds.w - cand.w.max(1);
        }
        if cand.y >= bounds.y + bounds.h {
            cand.y = bounds.y + bounds.h - cand.h.max(1);
        }
        if cand.x + cand.w + 2 * bw <= bounds.x {
            cand.x = bounds.x;
        }
        if cand.y + cand.h + 2 * bw <= bounds.y {
            cand.y = bounds.y;
        }
    }

    cand.w = cand.w.max(1);
    cand.h = cand.h.max(1);

    if honor_hints {
        let base_w = if hints.basew > 0 { hints.basew } else { 0 };
        let base_h = if hints.baseh > 0 { hints.baseh } else { 0 };

        let mut w = cand.w;
        let mut h = cand.h;

        if hints.mina > 0.0 && hints.maxa > 0.0 {
            let bw_ = w - base_w;
            let bh_ = h - base_h;
            let aspect = bw_ as f64 / bh_.max(1) as f64;
            if hints.maxa < aspect {
                w = (hints.maxa * bh_ as f64 + 0.5) as i32 + base_w;
            } else if hints.mina > 0.0 && (1.0 / hints.mina) < aspect {
                h = (bw_ as f64 / hints.mina + 0.5) as i32 + base_h;
            }
        }

        let mut w = w - base_w;
        let mut h = h - base_h;
        if hints.incw > 0 {
            w -= w % hints.incw;
        }
        if hints.inch > 0 {
            h -= h % hints.inch;
        }
        w += base_w;
        h += base_h;

        w = w.max(hints.minw.max(1));
        h = h.max(hints.minh.max(1));
        if hints.maxw > 0 {
            w = w.min(hints.maxw);
        }
        if hints.maxh > 0 {
            h = h.min(hints.maxh);
        }
        cand.w = w.max(1);
        cand.h = h.max(1);
    }

    let changed = cand != current;
    (cand, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::new(0, 0, 1920, 1080)
    }

    #[test]
    fn clamps_minimum_dimensions_to_one() {
        let hints = SizeHints::default();
        let (r, changed) = apply_size_hints(
            &hints,
            Rect::new(0, 0, 10, 10),
            Rect::new(5, 5, 0, 0),
            0,
            bounds(),
            false,
            true,
        );
        assert_eq!(r.w, 1);
        assert_eq!(r.h, 1);
        assert!(changed);
    }

    #[test]
    fn increment_quantization_rounds_down_to_base_plus_multiple() {
        let hints = SizeHints {
            basew: 2,
            baseh: 2,
            incw: 10,
            inch: 10,
            ..SizeHints::default()
        };
        let (r, _) = apply_size_hints(
            &hints,
            Rect::default(),
            Rect::new(0, 0, 27, 27),
            0,
            bounds(),
            false,
            true,
        );
        // (27 - 2) = 25, 25 - 25%10 = 20, +2 = 22
        assert_eq!(r.w, 22);
        assert_eq!(r.h, 22);
    }

    #[test]
    fn is_fixed_requires_equal_nonzero_min_max_both_axes() {
        let fixed = SizeHints {
            minw: 100,
            maxw: 100,
            minh: 50,
            maxh: 50,
            ..SizeHints::default()
        };
        assert!(fixed.is_fixed());
        let not_fixed = SizeHints {
            minw: 100,
            maxw: 200,
            ..SizeHints::default()
        };
        assert!(!not_fixed.is_fixed());
    }

    #[test]
    fn unchanged_rectangle_reports_no_change() {
        let hints = SizeHints::default();
        let r = Rect::new(10, 10, 100, 100);
        let (out, changed) = apply_size_hints(&hints, r, r, 2, bounds(), false, true);
        assert_eq!(out, r);
        assert!(!changed);
    }
}
