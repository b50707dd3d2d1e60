//! Hierarchical transform of a scene body.
//!
//! A [`TransformNode`] keeps three matrices and composes them on demand:
//!
//! ```text
//! model = origin · transform · self_rotation
//! ```
//!
//! `origin` is the parent frame, copied in explicitly each frame.
//! `transform` accumulates translations, orbital rotations, and scales.
//! `self_rotation` accumulates spin about the body's own axis, so spinning a
//! parent never drags its children along.

use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformNode {
    origin: Mat4,
    transform: Mat4,
    self_rotation: Mat4,
}

impl TransformNode {
    pub fn new() -> Self {
        Self {
            origin: Mat4::IDENTITY,
            transform: Mat4::IDENTITY,
            self_rotation: Mat4::IDENTITY,
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.transform *= Mat4::from_translation(Vec3::new(dx, dy, dz));
    }

    /// Rotate about `axis` through the local origin. In combination with
    /// translations this orbits the body around a point.
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        match rotation(angle_degrees, axis) {
            Some(r) => self.transform *= r,
            None => log::warn!("Ignoring rotation about zero-length axis"),
        }
    }

    /// Spin the body about its own `axis`, leaving children unaffected.
    pub fn rotate_self(&mut self, angle_degrees: f32, axis: Vec3) {
        match rotation(angle_degrees, axis) {
            Some(r) => self.self_rotation *= r,
            None => log::warn!("Ignoring self rotation about zero-length axis"),
        }
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.transform *= Mat4::from_scale(Vec3::new(sx, sy, sz));
    }

    /// Replace the accumulated transform with a single rotation.
    /// A zero-length axis resets it to identity.
    pub fn set_rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.transform = rotation(angle_degrees, axis).unwrap_or(Mat4::IDENTITY);
    }

    /// Use a copy of `parent` as this node's origin frame.
    pub fn apply_origin_transformation(&mut self, parent: Mat4) {
        self.origin = parent;
    }

    /// `origin · transform · self_rotation`, recomputed on every call.
    pub fn model_matrix(&self) -> Mat4 {
        self.origin * self.transform * self.self_rotation
    }

    /// The accumulated transform alone, without origin or self rotation.
    pub fn transformation_matrix(&self) -> Mat4 {
        self.transform
    }

    pub fn self_rotation_matrix(&self) -> Mat4 {
        self.self_rotation
    }

    pub fn origin_matrix(&self) -> Mat4 {
        self.origin
    }

    /// World-space position of the node's local origin.
    pub fn world_position(&self) -> Vec3 {
        self.model_matrix().transform_point3(Vec3::ZERO)
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new()
    }
}

fn rotation(angle_degrees: f32, axis: Vec3) -> Option<Mat4> {
    let axis = axis.try_normalize()?;
    Some(Mat4::from_axis_angle(axis, angle_degrees.to_radians()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_new_node_is_identity() {
        let node = TransformNode::new();
        assert_eq!(node.model_matrix(), Mat4::IDENTITY);
        assert_eq!(node.world_position(), Vec3::ZERO);
    }

    #[test]
    fn test_translations_accumulate() {
        let mut node = TransformNode::new();
        node.translate(1.0, 0.0, 0.0);
        node.translate(0.0, 2.0, -3.0);
        assert!(
            node.world_position()
                .abs_diff_eq(Vec3::new(1.0, 2.0, -3.0), EPS)
        );
    }

    #[test]
    fn test_set_rotate_discards_history() {
        let mut node = TransformNode::new();
        node.translate(1.0, 0.0, 0.0);
        node.set_rotate(90.0, Vec3::Y);
        let expected = Mat4::from_rotation_y(90f32.to_radians());
        assert!(node.model_matrix().abs_diff_eq(expected, EPS));
        assert!(node.world_position().abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn test_rotate_orbits_translated_point() {
        let mut node = TransformNode::new();
        node.translate(0.0, 0.0, 5.0);
        node.translate(0.0, 0.0, -5.0);
        node.rotate(90.0, Vec3::Y);
        node.translate(0.0, 0.0, 5.0);
        // +Z rotated 90° about +Y lands on +X.
        assert!(
            node.world_position()
                .abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPS)
        );
    }

    #[test]
    fn test_axis_is_normalized() {
        let mut a = TransformNode::new();
        let mut b = TransformNode::new();
        a.rotate(30.0, Vec3::new(0.0, 10.0, 0.0));
        b.rotate(30.0, Vec3::Y);
        assert!(a.model_matrix().abs_diff_eq(b.model_matrix(), EPS));
    }

    #[test]
    fn test_self_rotation_does_not_move_origin() {
        let mut node = TransformNode::new();
        node.translate(0.0, 0.0, 5.0);
        node.rotate_self(45.0, Vec3::Y);
        assert!(
            node.world_position()
                .abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), EPS)
        );
        assert_eq!(
            node.transformation_matrix(),
            Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0))
        );
        assert!(
            node.self_rotation_matrix()
                .abs_diff_eq(Mat4::from_rotation_y(45f32.to_radians()), EPS)
        );
    }

    #[test]
    fn test_model_composes_origin_transform_self_rotation() {
        let mut node = TransformNode::new();
        let parent = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        node.apply_origin_transformation(parent);
        node.translate(0.0, 1.0, 0.0);
        node.rotate_self(90.0, Vec3::Z);
        let expected = parent
            * Mat4::from_translation(Vec3::Y)
            * Mat4::from_rotation_z(90f32.to_radians());
        assert!(node.model_matrix().abs_diff_eq(expected, EPS));
        assert_eq!(node.origin_matrix(), parent);
    }

    #[test]
    fn test_origin_is_a_copy() {
        let mut parent = TransformNode::new();
        parent.translate(1.0, 0.0, 0.0);
        let mut child = TransformNode::new();
        child.apply_origin_transformation(parent.model_matrix());

        parent.translate(1.0, 0.0, 0.0);
        assert!(
            child
                .world_position()
                .abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS)
        );
    }

    #[test]
    fn test_scale_applies_after_translation() {
        let mut node = TransformNode::new();
        node.translate(1.0, 0.0, 0.0);
        node.scale(2.0, 2.0, 2.0);
        let p = node.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn test_zero_axis_is_ignored() {
        let mut node = TransformNode::new();
        node.translate(1.0, 0.0, 0.0);
        let before = node;
        node.rotate(45.0, Vec3::ZERO);
        node.rotate_self(45.0, Vec3::ZERO);
        assert_eq!(node, before);

        node.set_rotate(45.0, Vec3::ZERO);
        assert_eq!(node.transformation_matrix(), Mat4::IDENTITY);
    }
}
