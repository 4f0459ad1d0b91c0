//! Axis-aligned boxes and the box/triangle overlap test used by the BSP builder

use glam::Vec3;

/// Axis-aligned box with `min <= max` on every axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extent(&self) -> Vec3 {
        self.extent() * 0.5
    }

    /// Split at `at` along `axis` into the negative and positive halves
    pub fn split(&self, axis: usize, at: f32) -> (Self, Self) {
        let mut negative = *self;
        let mut positive = *self;
        negative.max[axis] = at;
        positive.min[axis] = at;
        (negative, positive)
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Componentwise min/max over `points`; `None` for an empty input
pub fn bounding_box<I>(points: I) -> Option<Aabb>
where
    I: IntoIterator<Item = Vec3>,
{
    let mut points = points.into_iter();
    let first = points.next()?;
    let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
    Some(Aabb::new(min, max))
}

fn project(points: &[Vec3], axis: Vec3) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Squared sine of the angle below which two directions count as parallel
const PARALLEL_EPSILON: f32 = 1e-10;

/// Separating-axis test between a box and a triangle. Touching counts as
/// overlapping.
pub fn aabb_triangle_overlap(aabb: &Aabb, triangle: &[Vec3; 3]) -> bool {
    let [v0, v1, v2] = *triangle;

    // Principal axes: triangle bounds against the box
    let tri_min = v0.min(v1).min(v2);
    let tri_max = v0.max(v1).max(v2);
    if tri_max.cmplt(aabb.min).any() || tri_min.cmpgt(aabb.max).any() {
        return false;
    }

    // Edge cross principal axis
    let corners = aabb.corners();
    let edges = [v1 - v0, v2 - v1, v0 - v2];
    for edge in edges {
        for unit in [Vec3::X, Vec3::Y, Vec3::Z] {
            let axis = edge.cross(unit);
            if axis.length_squared() <= PARALLEL_EPSILON * edge.length_squared() {
                continue;
            }

            let (box_lo, box_hi) = project(&corners, axis);
            let (tri_lo, tri_hi) = project(triangle, axis);
            if tri_hi < box_lo || tri_lo > box_hi {
                return false;
            }
        }
    }

    // Triangle plane against the box
    let normal = edges[0].cross(edges[1]);
    let scale = edges[0].length_squared() * edges[1].length_squared();
    if normal.length_squared() <= PARALLEL_EPSILON * scale {
        return true;
    }

    let d = normal.dot(v0);
    let mut near = aabb.max;
    let mut far = aabb.min;
    for i in 0..3 {
        if normal[i] > 0.0 {
            near[i] = aabb.min[i];
            far[i] = aabb.max[i];
        }
    }

    normal.dot(near) <= d && normal.dot(far) >= d
}
