//! Per-sample evaluation inputs supplied by the (external) geometry engine.
//!
//! A sample is a clipped face inside an axis-aligned bounds box. The face is described by its
//! explicit edges plus signed winding counts for the four sides of the bounds; the counts stand in
//! for edges that were clipped onto the bounds and so never need to be stored.

use crate::foundation::core::{Point, Rect, ensure_finite, ensure_finite_point};
use crate::foundation::error::{GlintError, GlintResult};
use crate::program::RenderGradientAccuracy;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinearEdge {
    pub start: Point,
    pub end: Point,
}

impl LinearEdge {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// A clipped face: explicit edges plus count-weighted implicit edges along the bounds.
///
/// The implicit bound edges are oriented so that counts of `1` on all four sides (and no explicit
/// edges) describe the full bounds rectangle with positive area:
/// `min_y: (x0,y0)->(x1,y0)`, `max_x: (x1,y0)->(x1,y1)`, `max_y: (x1,y1)->(x0,y1)`,
/// `min_x: (x0,y1)->(x0,y0)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EdgedFace {
    pub edges: Vec<LinearEdge>,
    pub bounds: Rect,
    pub min_x_count: i32,
    pub min_y_count: i32,
    pub max_x_count: i32,
    pub max_y_count: i32,
}

impl EdgedFace {
    pub fn new(
        edges: Vec<LinearEdge>,
        bounds: Rect,
        min_x_count: i32,
        min_y_count: i32,
        max_x_count: i32,
        max_y_count: i32,
    ) -> GlintResult<Self> {
        ensure_finite_point(bounds.origin(), "face bounds")?;
        ensure_finite_point(Point::new(bounds.x1, bounds.y1), "face bounds")?;
        for e in &edges {
            ensure_finite_point(e.start, "face edge")?;
            ensure_finite_point(e.end, "face edge")?;
        }
        Ok(Self {
            edges,
            bounds,
            min_x_count,
            min_y_count,
            max_x_count,
            max_y_count,
        })
    }

    /// The whole bounds rectangle, expressed purely through bound counts.
    pub fn from_bounds(bounds: Rect) -> Self {
        Self {
            edges: Vec::new(),
            bounds,
            min_x_count: 1,
            min_y_count: 1,
            max_x_count: 1,
            max_y_count: 1,
        }
    }

    pub fn implicit_edges(&self) -> [(LinearEdge, i32); 4] {
        let b = self.bounds;
        let p = Point::new;
        [
            (
                LinearEdge::new(p(b.x0, b.y0), p(b.x1, b.y0)),
                self.min_y_count,
            ),
            (
                LinearEdge::new(p(b.x1, b.y0), p(b.x1, b.y1)),
                self.max_x_count,
            ),
            (
                LinearEdge::new(p(b.x1, b.y1), p(b.x0, b.y1)),
                self.max_y_count,
            ),
            (
                LinearEdge::new(p(b.x0, b.y1), p(b.x0, b.y0)),
                self.min_x_count,
            ),
        ]
    }

    fn weighted_edges(&self) -> impl Iterator<Item = (LinearEdge, f64)> + '_ {
        self.edges
            .iter()
            .map(|e| (*e, 1.0))
            .chain(
                self.implicit_edges()
                    .into_iter()
                    .filter(|(_, count)| *count != 0)
                    .map(|(e, count)| (e, f64::from(count))),
            )
    }

    /// Signed shoelace area.
    pub fn area(&self) -> f64 {
        0.5 * self
            .weighted_edges()
            .map(|(e, w)| w * cross(e))
            .sum::<f64>()
    }

    /// Area centroid, or `None` for a face with (numerically) zero area.
    pub fn centroid(&self) -> Option<Point> {
        let area = self.area();
        if area.abs() <= f64::EPSILON {
            return None;
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for (e, w) in self.weighted_edges() {
            let c = w * cross(e);
            cx += c * (e.start.x + e.end.x);
            cy += c * (e.start.y + e.end.y);
        }
        let k = 1.0 / (6.0 * area);
        Some(Point::new(cx * k, cy * k))
    }
}

fn cross(e: LinearEdge) -> f64 {
    e.start.x * e.end.y - e.end.x * e.start.y
}

/// Everything a program may read for one sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderEvaluationContext {
    pub face: Option<EdgedFace>,
    pub area: f64,
    pub centroid: Option<Point>,
    pub bounds: Rect,
    /// When false, executors hand back the unpremultiplied result.
    pub premultiplied_output: bool,
}

impl RenderEvaluationContext {
    /// Full coverage of `bounds` without centroid information.
    pub fn new(bounds: Rect) -> GlintResult<Self> {
        ensure_finite_point(bounds.origin(), "context bounds")?;
        ensure_finite_point(Point::new(bounds.x1, bounds.y1), "context bounds")?;
        Ok(Self {
            face: None,
            area: bounds.area(),
            centroid: None,
            bounds,
            premultiplied_output: true,
        })
    }

    /// The unit pixel at integer coordinates, fully covered, centroid at its center.
    pub fn full_pixel(x: i32, y: i32) -> Self {
        let bounds = Rect::new(
            f64::from(x),
            f64::from(y),
            f64::from(x) + 1.0,
            f64::from(y) + 1.0,
        );
        Self {
            face: None,
            area: 1.0,
            centroid: Some(bounds.center()),
            bounds,
            premultiplied_output: true,
        }
    }

    /// Area and centroid derived from the face.
    pub fn from_face(face: EdgedFace) -> GlintResult<Self> {
        let area = face.area();
        ensure_finite(area, "face area")?;
        let centroid = face.centroid();
        let bounds = face.bounds;
        Ok(Self {
            face: Some(face),
            area,
            centroid,
            bounds,
            premultiplied_output: true,
        })
    }

    pub fn with_centroid(mut self, centroid: Point) -> GlintResult<Self> {
        ensure_finite_point(centroid, "context centroid")?;
        self.centroid = Some(centroid);
        Ok(self)
    }

    pub fn with_area(mut self, area: f64) -> GlintResult<Self> {
        ensure_finite(area, "context area")?;
        if area < 0.0 {
            return Err(GlintError::validation("context area must be >= 0"));
        }
        self.area = area;
        Ok(self)
    }

    pub fn with_premultiplied_output(mut self, premultiplied: bool) -> Self {
        self.premultiplied_output = premultiplied;
        self
    }

    pub fn pixel_center(&self) -> Point {
        self.bounds.center()
    }

    /// The supplied centroid, else the face's own centroid, else the bounds center.
    ///
    /// Matches the GPU interpreter, which integrates the face when no centroid is uploaded.
    pub fn centroid_or_center(&self) -> Point {
        self.centroid
            .or_else(|| self.face.as_ref().and_then(EdgedFace::centroid))
            .unwrap_or_else(|| self.pixel_center())
    }

    pub fn is_full_area(&self) -> bool {
        (self.area - self.bounds.area()).abs() <= 1e-10 * self.bounds.area().max(1.0)
    }

    pub fn sample_point(&self, accuracy: RenderGradientAccuracy) -> Point {
        if accuracy.reads_centroid() {
            self.centroid_or_center()
        } else {
            self.pixel_center()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/context/context.rs"]
mod tests;
