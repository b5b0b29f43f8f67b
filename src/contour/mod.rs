//! Hand contour extraction from the binarized frame.
//!
//! The expected capture orientation puts the finger gaps of interest in the
//! left half of the frame, so boundary tracing is restricted to that half.
//! Every foreground region boundary is walked (Moore neighborhood, clockwise)
//! and the longest walk is kept as the hand contour; shorter boundaries are
//! holes or noise blobs.

use crate::image::BinaryImage;
use crate::util::{GeometryError, PalmcodeResult};

pub mod tangent;
pub mod valley;

/// Integer pixel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    /// Column, growing right.
    pub x: i64,
    /// Row, growing down.
    pub y: i64,
}

impl Point {
    /// Converts to floating-point coordinates.
    pub fn to_f(self) -> PointF {
        PointF {
            x: self.x as f64,
            y: self.y as f64,
        }
    }
}

/// Floating-point pixel coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointF {
    /// Column, growing right.
    pub x: f64,
    /// Row, growing down.
    pub y: f64,
}

impl PointF {
    /// Rounds to the nearest integer pixel.
    pub fn round(self) -> Point {
        Point {
            x: self.x.round() as i64,
            y: self.y.round() as i64,
        }
    }
}

/// Ordered cyclic boundary walk of a foreground region.
///
/// Insertion order is the walk order used by the curvature tests downstream;
/// adjacent points are always distinct.
#[derive(Clone, Debug)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    /// Builds a contour from an existing walk.
    ///
    /// The caller is responsible for the walk order; adjacent points must be
    /// distinct.
    pub fn from_points(points: Vec<Point>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0] != w[1]));
        Self { points }
    }

    /// Returns the walk as a slice.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the number of points on the contour.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the contour is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// Moore neighborhood in clockwise order, starting at west.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// Extracts the hand contour from the left half of a binary frame.
///
/// Fails with [`GeometryError::NoContour`] when no usable foreground boundary
/// exists.
pub fn trace_hand_contour(bin: &BinaryImage) -> PalmcodeResult<Contour> {
    let limit = bin.width() / 2;
    let contours = trace_boundaries(bin, limit);

    let best = contours
        .into_iter()
        .max_by_key(|c| c.len())
        .filter(|c| c.len() >= 3)
        .ok_or(GeometryError::NoContour)?;

    Ok(Contour { points: best })
}

/// Walks the boundary of every foreground region with `x < limit`.
fn trace_boundaries(bin: &BinaryImage, limit: usize) -> Vec<Vec<Point>> {
    let height = bin.height() as i64;
    let limit_i = limit as i64;
    let is_fg = |x: i64, y: i64| -> bool {
        x >= 0
            && y >= 0
            && x < limit_i
            && y < height
            && bin.is_foreground(x as usize, y as usize).unwrap_or(false)
    };

    let mut visited = vec![false; limit * bin.height()];
    let mut contours = Vec::new();

    for y in 0..height {
        for x in 0..limit_i {
            if !is_fg(x, y) || visited[y as usize * limit + x as usize] {
                continue;
            }
            // boundary walks start where the scan enters a region from background
            if is_fg(x - 1, y) {
                continue;
            }
            let max_steps = 4 * limit * bin.height();
            let walk = walk_boundary(Point { x, y }, &is_fg, max_steps, &mut |p: Point| {
                visited[p.y as usize * limit + p.x as usize] = true;
            });
            contours.push(walk);
        }
    }

    contours
}

fn walk_boundary<F, M>(start: Point, is_fg: &F, max_steps: usize, mark: &mut M) -> Vec<Point>
where
    F: Fn(i64, i64) -> bool,
    M: FnMut(Point),
{
    let mut points = vec![start];
    mark(start);

    let mut cur = start;
    // direction index pointing from the current pixel back toward the
    // previous one; the scan entered from the west
    let mut back = 0usize;
    let mut first_step: Option<(Point, usize)> = None;

    while points.len() <= max_steps {
        let mut next = None;
        for k in 1..=8 {
            let idx = (back + k) % 8;
            let (dx, dy) = NEIGHBORS[idx];
            if is_fg(cur.x + dx, cur.y + dy) {
                next = Some((
                    Point {
                        x: cur.x + dx,
                        y: cur.y + dy,
                    },
                    idx,
                ));
                break;
            }
        }

        let Some((p, idx)) = next else {
            break; // isolated pixel
        };
        // Jacob's stopping criterion: the walk is closed when the start
        // pixel is left again through the same first step; returning to the
        // start alone is not enough for one-pixel-wide spurs
        match first_step {
            None => first_step = Some((p, idx)),
            Some(first) if cur == start && first == (p, idx) => break,
            Some(_) => {}
        }

        back = (idx + 4) % 8;
        mark(p);
        points.push(p);
        cur = p;
    }

    // the closing arrival re-appends the start
    if points.len() > 1 && points.last() == points.first() {
        points.pop();
    }

    points
}
