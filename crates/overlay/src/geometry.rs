//! Selection geometry

use capture::{Point, Rect};

/// Normalized rectangle spanned by two drag points, whatever the drag direction
pub fn normalize(p1: Point, p2: Point) -> Rect {
    Rect::new(
        p1.x.min(p2.x),
        p1.y.min(p2.y),
        p1.x.abs_diff(p2.x),
        p1.y.abs_diff(p2.y),
    )
}

/// Rectangles that outline a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSet {
    /// Selection too thin to hollow out, drawn filled
    Solid(Rect),
    /// Top, bottom, left and right strips of a hollow frame
    Frame([Rect; 4]),
}

impl BorderSet {
    pub fn rects(&self) -> &[Rect] {
        match self {
            BorderSet::Solid(rect) => std::slice::from_ref(rect),
            BorderSet::Frame(strips) => strips,
        }
    }

    /// Rectangle enclosing every strip
    pub fn bounds(&self) -> Rect {
        self.rects()
            .iter()
            .fold(Rect::default(), |acc, rect| acc.union(rect))
    }
}

/// Border strips of `rect` for a frame `thickness` pixels wide.
///
/// The side strips are inset by `thickness` at both ends so the corners
/// belong to the top and bottom strips only.
pub fn borders(rect: Rect, thickness: u32) -> BorderSet {
    let double = thickness as u64 * 2;
    if rect.width as u64 <= double || rect.height as u64 <= double {
        return BorderSet::Solid(rect);
    }

    let t = thickness;
    let side_height = (rect.height - 2 * t).max(1);
    let inner_top = rect.y.saturating_add_unsigned(t);

    BorderSet::Frame([
        Rect::new(rect.x, rect.y, rect.width, t),
        Rect::new(rect.x, rect.bottom() - t as i32, rect.width, t),
        Rect::new(rect.x, inner_top, t, side_height),
        Rect::new(rect.right() - t as i32, inner_top, t, side_height),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn normalize_any_drag_direction() {
        let expected = Rect::new(10, 20, 30, 40);
        assert_eq!(normalize(p(10, 20), p(40, 60)), expected);
        assert_eq!(normalize(p(40, 60), p(10, 20)), expected);
        assert_eq!(normalize(p(40, 20), p(10, 60)), expected);
        assert_eq!(normalize(p(10, 60), p(40, 20)), expected);
    }

    #[test]
    fn normalize_negative_coordinates() {
        assert_eq!(normalize(p(-5, 3), p(-20, -7)), Rect::new(-20, -7, 15, 10));
    }

    #[test]
    fn normalize_extremes_do_not_overflow() {
        let rect = normalize(p(i32::MIN, i32::MAX), p(i32::MAX, i32::MIN));
        assert_eq!(rect.x, i32::MIN);
        assert_eq!(rect.y, i32::MIN);
        assert_eq!(rect.width, u32::MAX);
        assert_eq!(rect.height, u32::MAX);
    }

    #[test]
    fn zero_size_drag() {
        assert_eq!(normalize(p(100, 100), p(100, 100)), Rect::new(100, 100, 0, 0));
    }

    #[test]
    fn frame_strips_for_known_drag() {
        let rect = normalize(p(50, 50), p(150, 120));
        assert_eq!(rect, Rect::new(50, 50, 100, 70));

        assert_eq!(
            borders(rect, 2),
            BorderSet::Frame([
                Rect::new(50, 50, 100, 2),
                Rect::new(50, 118, 100, 2),
                Rect::new(50, 52, 2, 66),
                Rect::new(148, 52, 2, 66),
            ])
        );
    }

    #[test]
    fn thin_selection_is_solid() {
        let t = 3;
        for rect in [
            Rect::new(0, 0, 6, 100),
            Rect::new(0, 0, 100, 6),
            Rect::new(5, 5, 1, 1),
            Rect::new(5, 5, 0, 0),
        ] {
            assert_eq!(borders(rect, t), BorderSet::Solid(rect));
            assert_eq!(borders(rect, t).rects(), &[rect]);
        }
    }

    #[test]
    fn frame_tiles_without_overlap() {
        for t in 1..5u32 {
            for (w, h) in [(2 * t + 1, 2 * t + 1), (40, 9 + 2 * t), (17, 90)] {
                let rect = Rect::new(-7, 13, w, h);
                let set = borders(rect, t);
                let strips = set.rects();
                assert_eq!(strips.len(), 4);

                let area: u64 = strips.iter().map(Rect::area).sum();
                let expected = 2 * t as u64 * w as u64 + 2 * t as u64 * (h - 2 * t) as u64;
                assert_eq!(area, expected);

                for (i, a) in strips.iter().enumerate() {
                    for b in &strips[i + 1..] {
                        assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
                    }
                }
                assert_eq!(set.bounds(), rect);
            }
        }
    }
}
