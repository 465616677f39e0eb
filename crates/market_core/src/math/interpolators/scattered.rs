//! Linear interpolation over scattered 2D samples.
//!
//! The sample cloud is triangulated with [`spade`]'s Delaunay triangulation
//! and a query point is evaluated by barycentric weighting of the three
//! vertices of the triangle containing it. The triangulation covers exactly
//! the convex hull of the cloud; points outside it have no value.

use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation};

use crate::types::InterpolationError;

/// Barycentric tolerance for hull-boundary queries.
const INSIDE_TOLERANCE: f64 = 1e-10;

/// Triangulation vertex carrying its index into the merged sample list.
#[derive(Debug, Clone, Copy)]
struct Vertex {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for Vertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Piecewise-linear interpolant over a Delaunay triangulation.
///
/// Coincident sample locations are merged and their values averaged.
///
/// # Example
///
/// ```
/// use market_core::math::interpolators::ScatteredLinearInterpolator;
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
/// let values = [0.0, 1.0, 1.0, 2.0];
/// let interp = ScatteredLinearInterpolator::new(&points, &values).unwrap();
///
/// let z = interp.interpolate(0.5, 0.5).unwrap();
/// assert!((z - 1.0).abs() < 1e-12);
/// assert!(interp.interpolate(2.0, 2.0).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ScatteredLinearInterpolator {
    points: Vec<(f64, f64)>,
    values: Vec<f64>,
    triangles: Vec<[usize; 3]>,
}

impl ScatteredLinearInterpolator {
    /// Triangulate `points` carrying `values`.
    ///
    /// # Returns
    ///
    /// * `Err(InterpolationError::EmptyInput)` - No samples
    /// * `Err(InterpolationError::InvalidInput)` - Mismatched lengths or non-finite coordinates
    /// * `Err(InterpolationError::InsufficientData)` - Fewer than 3 distinct locations
    /// * `Err(InterpolationError::DegenerateGeometry)` - All locations collinear
    pub fn new(points: &[(f64, f64)], values: &[f64]) -> Result<Self, InterpolationError> {
        if points.len() != values.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "points and values must have same length: got {} and {}",
                points.len(),
                values.len()
            )));
        }
        if points.is_empty() {
            return Err(InterpolationError::EmptyInput);
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(InterpolationError::InvalidInput(
                "sample coordinates must be finite".to_string(),
            ));
        }

        let (points, values) = merge_coincident(points, values);
        if points.len() < 3 {
            return Err(InterpolationError::InsufficientData {
                got: points.len(),
                need: 3,
            });
        }

        let triangles = triangulate(&points)?;
        if triangles.is_empty() {
            return Err(InterpolationError::DegenerateGeometry(
                "sample locations are collinear".to_string(),
            ));
        }

        Ok(Self {
            points,
            values,
            triangles,
        })
    }

    /// Number of distinct sample locations.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no samples. Never true once constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of triangles in the triangulation.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Evaluate at `(x, y)`; `None` outside the convex hull.
    pub fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        self.triangles.iter().find_map(|tri| {
            let [l1, l2, l3] = self.barycentric(tri, (x, y))?;
            let inside = l1 >= -INSIDE_TOLERANCE
                && l2 >= -INSIDE_TOLERANCE
                && l3 >= -INSIDE_TOLERANCE;
            inside.then(|| {
                l1 * self.values[tri[0]] + l2 * self.values[tri[1]] + l3 * self.values[tri[2]]
            })
        })
    }

    fn barycentric(&self, tri: &[usize; 3], (px, py): (f64, f64)) -> Option<[f64; 3]> {
        let (ax, ay) = self.points[tri[0]];
        let (bx, by) = self.points[tri[1]];
        let (cx, cy) = self.points[tri[2]];

        let det = (by - cy) * (ax - cx) + (cx - bx) * (ay - cy);
        if det == 0.0 {
            return None;
        }
        let l1 = ((by - cy) * (px - cx) + (cx - bx) * (py - cy)) / det;
        let l2 = ((cy - ay) * (px - cx) + (ax - cx) * (py - cy)) / det;
        Some([l1, l2, 1.0 - l1 - l2])
    }
}

fn merge_coincident(points: &[(f64, f64)], values: &[f64]) -> (Vec<(f64, f64)>, Vec<f64>) {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .partial_cmp(&points[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut merged_pts: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    let mut sums: Vec<(f64, usize)> = Vec::with_capacity(points.len());
    for i in order {
        match merged_pts.last() {
            Some(last) if *last == points[i] => {
                if let Some(acc) = sums.last_mut() {
                    acc.0 += values[i];
                    acc.1 += 1;
                }
            }
            _ => {
                merged_pts.push(points[i]);
                sums.push((values[i], 1));
            }
        }
    }

    let merged_vals = sums.into_iter().map(|(s, n)| s / n as f64).collect();
    (merged_pts, merged_vals)
}

/// Delaunay triangulation. Returns index triples into `points`.
///
/// Empty when every point is collinear.
fn triangulate(points: &[(f64, f64)]) -> Result<Vec<[usize; 3]>, InterpolationError> {
    let vertices = points
        .iter()
        .enumerate()
        .map(|(index, &(x, y))| Vertex {
            position: Point2::new(x, y),
            index,
        })
        .collect();

    let triangulation: DelaunayTriangulation<Vertex> = DelaunayTriangulation::bulk_load(vertices)
        .map_err(|e| InterpolationError::InvalidInput(format!("cannot triangulate samples: {e:?}")))?;

    Ok(triangulation
        .inner_faces()
        .map(|face| face.vertices().map(|v| v.data().index))
        .collect())
}
