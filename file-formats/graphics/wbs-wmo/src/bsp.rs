//! BSP collision tree for WMO groups
//!
//! Groups store collision data as a flat array of axis-aligned split nodes
//! (`MOBN`) and a shared array of triangle indices referenced by the leaves
//! (`MOBR`).
//!
//! # Construction
//!
//! 1. The root box is the bounding box of every vertex the input triangles use
//! 2. A set of at most `max_face_count` triangles becomes a leaf
//! 3. Otherwise the box is split at the midpoint of its longest axis. X wins
//!    only when strictly longest, then Y when strictly longer than Z, else Z
//! 4. Each half keeps every triangle that overlaps it, so triangles crossing
//!    the plane end up on both sides. An empty half is recorded as child -1
//! 5. A box without extent or the depth limit turns the node into an
//!    oversized leaf. A child that keeps every triangle of its parent counts
//!    as a stalled split, and a chain of `MAX_STALLED_SPLITS` of them ends in
//!    an oversized leaf as well. Long faces spanning the box on its longest
//!    axis stall until a shorter axis becomes the longest
//!
//! Nodes are numbered in preorder, so the root is always node 0.
//!
//! # Queries
//!
//! Point queries follow the split planes down to the candidate leaves. Z
//! planes visit both children so that every triangle above and below the
//! point is considered, then a ray cast in -Z picks the closest triangle.

use std::collections::HashMap;

use glam::Vec3;
use log::{debug, trace};
use wbs_data::math::C3Vector;

use crate::collision::{Aabb, aabb_triangle_overlap, bounding_box};
use crate::error::{Result, WmoError};
use crate::wmo_group_types::{BspNode, BspPlaneType};

/// Tuning for the BSP builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BspOptions {
    /// Largest triangle count a leaf may hold
    pub max_face_count: usize,
    /// Depth at which a node becomes a leaf regardless of its triangle count
    pub max_depth: usize,
}

impl Default for BspOptions {
    fn default() -> Self {
        Self {
            max_face_count: 30,
            max_depth: 48,
        }
    }
}

/// A built or decoded collision tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspTree {
    /// `MOBN`, root first
    pub nodes: Vec<BspNode>,
    /// `MOBR`, triangle indices referenced by the leaves
    pub faces: Vec<u16>,
}

/// Summary of a tree's shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BspStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub empty_leaf_count: usize,
    pub max_depth: usize,
    pub max_leaf_faces: usize,
    /// Face references across all leaves; exceeds the triangle count when
    /// triangles cross split planes
    pub face_references: usize,
}

/// Consecutive splits along one path that may keep every triangle of the
/// parent before the node is closed as a leaf
pub const MAX_STALLED_SPLITS: usize = 8;

struct PendingNode {
    parent: Option<(usize, usize)>,
    bounds: Aabb,
    faces: Vec<u16>,
    depth: usize,
    stalled: usize,
}

/// Axis with the largest extent. X only when strictly largest, then Y when
/// strictly larger than Z, otherwise Z.
fn split_axis(extent: Vec3) -> usize {
    if extent.x > extent.y && extent.x > extent.z {
        0
    } else if extent.y > extent.z {
        1
    } else {
        2
    }
}

impl BspTree {
    pub fn new(nodes: Vec<BspNode>, faces: Vec<u16>) -> Self {
        Self { nodes, faces }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Build a tree over every triangle of `indices`
    pub fn build(vertices: &[C3Vector], indices: &[u16], options: &BspOptions) -> Result<Self> {
        let triangle_count = indices.len() / 3;
        let faces = u16::try_from(triangle_count)
            .map(|count| (0..count).collect())
            .map_err(|_| {
                WmoError::BspLimitExceeded(format!(
                    "{triangle_count} triangles cannot be referenced by 16-bit face indices"
                ))
            })?;
        Self::build_with_faces(vertices, indices, faces, options)
    }

    /// Build a tree over the given triangles (indices into `indices / 3`)
    pub fn build_with_faces(
        vertices: &[C3Vector],
        indices: &[u16],
        faces: Vec<u16>,
        options: &BspOptions,
    ) -> Result<Self> {
        let triangle = |face: u16| -> Result<[Vec3; 3]> {
            let base = usize::from(face) * 3;
            let corners = indices.get(base..base + 3).ok_or_else(|| {
                WmoError::InvalidMesh(format!("triangle {face} is outside the index buffer"))
            })?;
            let mut out = [Vec3::ZERO; 3];
            for (slot, &index) in out.iter_mut().zip(corners) {
                *slot = vertices
                    .get(usize::from(index))
                    .ok_or_else(|| {
                        WmoError::InvalidMesh(format!(
                            "vertex {index} of triangle {face} does not exist"
                        ))
                    })?
                    .to_glam();
            }
            Ok(out)
        };

        let triangles = faces
            .iter()
            .map(|&face| triangle(face).map(|t| (face, t)))
            .collect::<Result<Vec<_>>>()?;
        let mut positions = HashMap::with_capacity(triangles.len());
        for (index, (face, _)) in triangles.iter().enumerate() {
            positions.insert(*face, index);
        }
        let corners_of = |face: u16| positions.get(&face).map(|&index| &triangles[index].1);

        let corners = triangles.iter().flat_map(|(_, t)| t.iter().copied());
        let Some(root_bounds) = bounding_box(corners) else {
            debug!("BSP input is empty, emitting a single empty leaf");
            return Ok(Self::new(vec![BspNode::leaf(0, 0)], Vec::new()));
        };

        let max_face_count = options.max_face_count.max(1);
        let mut nodes: Vec<BspNode> = Vec::new();
        let mut face_out: Vec<u16> = Vec::new();
        let mut stack = vec![PendingNode {
            parent: None,
            bounds: root_bounds,
            faces,
            depth: 0,
            stalled: 0,
        }];

        while let Some(pending) = stack.pop() {
            let index = nodes.len();
            let node_id = i16::try_from(index).map_err(|_| {
                WmoError::BspLimitExceeded(format!("more than {} nodes", i16::MAX))
            })?;
            if let Some((parent, side)) = pending.parent {
                nodes[parent].children[side] = node_id;
            }

            let extent = pending.bounds.extent();
            let must_be_leaf = pending.faces.len() <= max_face_count
                || pending.depth >= options.max_depth
                || pending.stalled >= MAX_STALLED_SPLITS
                || extent.max_element() <= 0.0;

            let split = if must_be_leaf {
                None
            } else {
                let axis = split_axis(extent);
                let distance = pending.bounds.center()[axis];
                let (negative_box, positive_box) = pending.bounds.split(axis, distance);

                let overlapping = |bounds: &Aabb| -> Vec<u16> {
                    pending
                        .faces
                        .iter()
                        .copied()
                        .filter(|&face| {
                            corners_of(face)
                                .is_some_and(|corners| aabb_triangle_overlap(bounds, corners))
                        })
                        .collect()
                };
                let negative = overlapping(&negative_box);
                let positive = overlapping(&positive_box);

                if negative.len() == pending.faces.len() && positive.len() == pending.faces.len() {
                    trace!(
                        "BSP split at depth {} keeps all {} triangles on both sides",
                        pending.depth,
                        pending.faces.len()
                    );
                }
                Some((axis, distance, negative_box, negative, positive_box, positive))
            };

            match split {
                None => {
                    let face_count = u16::try_from(pending.faces.len()).map_err(|_| {
                        WmoError::BspLimitExceeded(format!(
                            "leaf with {} triangles",
                            pending.faces.len()
                        ))
                    })?;
                    if pending.faces.len() > max_face_count {
                        debug!(
                            "BSP leaf {index} holds {} triangles (limit {max_face_count})",
                            pending.faces.len()
                        );
                    }
                    nodes.push(BspNode::leaf(face_out.len() as u32, face_count));
                    face_out.extend_from_slice(&pending.faces);
                }
                Some((axis, distance, negative_box, negative, positive_box, positive)) => {
                    nodes.push(BspNode::split(BspPlaneType::for_axis(axis), distance));
                    let parent_len = pending.faces.len();
                    let stalled = |child: &[u16]| {
                        if child.len() == parent_len {
                            pending.stalled + 1
                        } else {
                            0
                        }
                    };

                    // Positive pushed first so the negative subtree is numbered first
                    if !positive.is_empty() {
                        stack.push(PendingNode {
                            parent: Some((index, 1)),
                            bounds: positive_box,
                            stalled: stalled(&positive),
                            faces: positive,
                            depth: pending.depth + 1,
                        });
                    }
                    if !negative.is_empty() {
                        stack.push(PendingNode {
                            parent: Some((index, 0)),
                            bounds: negative_box,
                            stalled: stalled(&negative),
                            faces: negative,
                            depth: pending.depth + 1,
                        });
                    }
                }
            }
        }

        debug!(
            "Built BSP tree: {} nodes, {} face references",
            nodes.len(),
            face_out.len()
        );
        Ok(Self::new(nodes, face_out))
    }

    /// Node and leaf statistics
    pub fn stats(&self) -> BspStats {
        let mut stats = BspStats {
            node_count: self.nodes.len(),
            ..BspStats::default()
        };
        if self.nodes.is_empty() {
            return stats;
        }

        let mut stack = vec![(0_usize, 0_usize)];
        while let Some((index, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            stats.max_depth = stats.max_depth.max(depth);
            if node.is_leaf() {
                stats.leaf_count += 1;
                stats.face_references += usize::from(node.face_count);
                stats.max_leaf_faces = stats.max_leaf_faces.max(usize::from(node.face_count));
                if node.face_count == 0 {
                    stats.empty_leaf_count += 1;
                }
                continue;
            }
            for child in node.children {
                if child >= 0 {
                    stack.push((child as usize, depth + 1));
                }
            }
        }
        stats
    }

    /// Query the BSP tree to find all leaf nodes that might contain the point.
    ///
    /// Returns indices of leaf nodes that need to be checked for triangle intersection.
    pub fn query_point(&self, point: Vec3) -> Vec<usize> {
        let mut leaves = Vec::new();
        if !self.nodes.is_empty() {
            self.query_recursive(point, 0, &mut leaves);
        }
        leaves
    }

    fn query_recursive(&self, point: Vec3, node_index: i16, leaves: &mut Vec<usize>) {
        if node_index < 0 {
            return;
        }

        let idx = node_index as usize;
        let Some(node) = self.nodes.get(idx) else {
            return;
        };

        if node.is_leaf() {
            leaves.push(idx);
            return;
        }

        match node.kind().and_then(BspPlaneType::axis) {
            // Z planes: both sides, height queries need triangles above and below
            Some(2) => {
                self.query_recursive(point, node.negative_child(), leaves);
                self.query_recursive(point, node.positive_child(), leaves);
            }
            Some(axis) => {
                if point[axis] < node.distance {
                    self.query_recursive(point, node.negative_child(), leaves);
                } else {
                    self.query_recursive(point, node.positive_child(), leaves);
                }
            }
            None => {}
        }
    }

    /// Find the closest triangle below the given point using ray-triangle intersection.
    ///
    /// Returns the triangle index (not the `MOBR` position), or `None` if no
    /// triangle is below the point.
    pub fn pick_closest_tri_neg_z(
        &self,
        point: Vec3,
        vertices: &[C3Vector],
        indices: &[u16],
    ) -> Option<usize> {
        let mut closest_t = f32::INFINITY;
        let mut closest_tri = None;

        for leaf_idx in self.query_point(point) {
            let node = &self.nodes[leaf_idx];
            let start = node.first_face as usize;
            let end = start + usize::from(node.face_count);
            let Some(faces) = self.faces.get(start..end) else {
                continue;
            };

            for &face in faces {
                let tri_start = usize::from(face) * 3;
                let Some(corners) = indices.get(tri_start..tri_start + 3) else {
                    continue;
                };
                let Some(v0) = vertices.get(usize::from(corners[0])) else {
                    continue;
                };
                let Some(v1) = vertices.get(usize::from(corners[1])) else {
                    continue;
                };
                let Some(v2) = vertices.get(usize::from(corners[2])) else {
                    continue;
                };

                if let Some(t) =
                    ray_triangle_intersect_neg_z(point, v0.to_glam(), v1.to_glam(), v2.to_glam())
                {
                    if t < closest_t {
                        closest_t = t;
                        closest_tri = Some(usize::from(face));
                    }
                }
            }
        }

        closest_tri
    }
}

/// Ray-triangle intersection for a ray going in the negative Z direction.
///
/// Uses the Möller–Trumbore algorithm; returns the distance along the ray.
fn ray_triangle_intersect_neg_z(origin: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 0.000_001;
    let direction = Vec3::NEG_Z;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None; // Ray is parallel to triangle
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > EPSILON { Some(t) } else { None }
}

/// Check if a point lies above some collision triangle of a group
pub fn point_in_group(point: Vec3, bsp: &BspTree, vertices: &[C3Vector], indices: &[u16]) -> bool {
    bsp.pick_closest_tri_neg_z(point, vertices, indices).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A row of `count` unit quads along X, two triangles each
    fn quad_strip(count: usize) -> (Vec<C3Vector>, Vec<u16>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for i in 0..count {
            let base = vertices.len() as u16;
            let x = i as f32;
            vertices.extend([
                C3Vector::new(x, 0.0, 0.0),
                C3Vector::new(x + 1.0, 0.0, 0.0),
                C3Vector::new(x + 1.0, 1.0, 0.0),
                C3Vector::new(x, 1.0, 0.0),
            ]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        (vertices, indices)
    }

    #[test]
    fn test_split_axis_tie_break() {
        assert_eq!(split_axis(Vec3::new(2.0, 1.0, 1.0)), 0);
        assert_eq!(split_axis(Vec3::new(2.0, 2.0, 1.0)), 1);
        assert_eq!(split_axis(Vec3::new(2.0, 1.0, 2.0)), 2);
        assert_eq!(split_axis(Vec3::new(1.0, 1.0, 1.0)), 2);
        assert_eq!(split_axis(Vec3::new(0.0, 3.0, 3.0)), 2);
    }

    #[test]
    fn test_small_input_is_single_leaf() {
        let (vertices, indices) = quad_strip(2);
        let tree = BspTree::build(&vertices, &indices, &BspOptions::default()).unwrap();

        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_leaf());
        assert_eq!(tree.nodes[0].face_count, 4);
        assert_eq!(tree.nodes[0].children, [-1, -1]);
        assert_eq!(tree.faces, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_input() {
        let tree = BspTree::build(&[], &[], &BspOptions::default()).unwrap();
        assert_eq!(tree.nodes, vec![BspNode::leaf(0, 0)]);
        assert!(tree.faces.is_empty());
    }

    #[test]
    fn test_split_on_longest_axis() {
        let (vertices, indices) = quad_strip(4);
        let options = BspOptions {
            max_face_count: 4,
            ..BspOptions::default()
        };
        let tree = BspTree::build(&vertices, &indices, &options).unwrap();

        let root = tree.nodes[0];
        assert_eq!(root.kind(), Some(BspPlaneType::YzPlane));
        assert_eq!(root.distance, 2.0);
        assert_eq!(root.face_count, 0);
        // preorder: negative subtree directly after the root
        assert_eq!(root.children[0], 1);
        assert!(root.children[1] > 1);
    }

    #[test]
    fn test_every_triangle_reaches_a_leaf() {
        let (vertices, indices) = quad_strip(40);
        let options = BspOptions {
            max_face_count: 5,
            ..BspOptions::default()
        };
        let tree = BspTree::build(&vertices, &indices, &options).unwrap();

        let mut seen = vec![false; indices.len() / 3];
        for node in tree.nodes.iter().filter(|n| n.is_leaf()) {
            assert!(usize::from(node.face_count) <= options.max_face_count);
            let start = node.first_face as usize;
            for &face in &tree.faces[start..start + usize::from(node.face_count)] {
                seen[usize::from(face)] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_degenerate_input_terminates() {
        // Every triangle collapsed onto one point: the box has no extent
        let vertices = vec![C3Vector::new(1.0, 1.0, 1.0)];
        let indices = vec![0_u16; 3 * 50];
        let tree = BspTree::build(&vertices, &indices, &BspOptions::default()).unwrap();

        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].face_count, 50);
    }

    #[test]
    fn test_stacked_triangles_terminate() {
        // Identical large triangles: every child keeps all of them
        let vertices = vec![
            C3Vector::new(0.0, 0.0, 0.0),
            C3Vector::new(10.0, 0.0, 0.0),
            C3Vector::new(0.0, 10.0, 0.0),
        ];
        let indices: Vec<u16> = (0..40).flat_map(|_| [0, 1, 2]).collect();
        let tree = BspTree::build(&vertices, &indices, &BspOptions::default()).unwrap();

        let stats = tree.stats();
        assert!(stats.leaf_count >= 1);
        assert!(stats.max_depth <= MAX_STALLED_SPLITS);
        for node in tree.nodes.iter().filter(|n| n.is_leaf()) {
            assert_eq!(node.face_count, 40);
        }
    }

    #[test]
    fn test_long_strips_are_separated() {
        // Strips 100 long in X, 0.5 wide in Y, one unit apart: the first X
        // splits keep every strip until Y becomes the longest axis
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for row in 0..40 {
            let base = vertices.len() as u16;
            let y = row as f32;
            vertices.extend([
                C3Vector::new(0.0, y, 0.0),
                C3Vector::new(100.0, y, 0.0),
                C3Vector::new(0.0, y + 0.5, 0.0),
            ]);
            indices.extend([base, base + 1, base + 2]);
        }
        let options = BspOptions {
            max_face_count: 8,
            ..BspOptions::default()
        };
        let tree = BspTree::build(&vertices, &indices, &options).unwrap();

        let stats = tree.stats();
        assert!(stats.node_count > 1);
        assert!(stats.max_leaf_faces <= 8);
        let mut seen = vec![false; 40];
        for node in tree.nodes.iter().filter(|n| n.is_leaf()) {
            let start = node.first_face as usize;
            for &face in &tree.faces[start..start + usize::from(node.face_count)] {
                seen[usize::from(face)] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_build_with_subset() {
        let (vertices, indices) = quad_strip(3);
        let options = BspOptions::default();
        let tree = BspTree::build_with_faces(&vertices, &indices, vec![1, 4], &options).unwrap();
        assert_eq!(tree.faces, vec![1, 4]);

        let bad = BspTree::build_with_faces(&vertices, &indices, vec![9], &BspOptions::default());
        assert!(matches!(bad, Err(WmoError::InvalidMesh(_))));
    }

    #[test]
    fn test_query_point_follows_planes() {
        let (vertices, indices) = quad_strip(8);
        let options = BspOptions {
            max_face_count: 4,
            ..BspOptions::default()
        };
        let tree = BspTree::build(&vertices, &indices, &options).unwrap();

        let leaves = tree.query_point(Vec3::new(0.5, 0.5, 1.0));
        assert!(!leaves.is_empty());
        assert!(leaves.iter().all(|&leaf| tree.nodes[leaf].is_leaf()));

        let hit = tree.pick_closest_tri_neg_z(Vec3::new(0.75, 0.25, 3.0), &vertices, &indices);
        assert_eq!(hit, Some(0));
        assert!(point_in_group(Vec3::new(7.5, 0.5, 1.0), &tree, &vertices, &indices));
        assert!(!point_in_group(Vec3::new(7.5, 0.5, -1.0), &tree, &vertices, &indices));
    }

    #[test]
    fn test_ray_triangle_intersect() {
        let v0 = Vec3::new(-1.0, -1.0, 0.0);
        let v1 = Vec3::new(1.0, -1.0, 0.0);
        let v2 = Vec3::new(0.0, 1.0, 0.0);

        let hit = ray_triangle_intersect_neg_z(Vec3::new(0.0, 0.0, 5.0), v0, v1, v2);
        assert!((hit.unwrap() - 5.0).abs() < 0.001);

        assert!(ray_triangle_intersect_neg_z(Vec3::new(10.0, 10.0, 5.0), v0, v1, v2).is_none());
        assert!(ray_triangle_intersect_neg_z(Vec3::new(0.0, 0.0, -5.0), v0, v1, v2).is_none());
    }
}
