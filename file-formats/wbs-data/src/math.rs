use crate::wow_record;

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct C2Vector {
        pub x: f32,
        pub y: f32,
    }
}

impl C2Vector {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_glam(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }

    pub fn from_glam(v: glam::Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct C3Vector {
        pub x: f32,
        pub y: f32,
        pub z: f32,
    }
}

impl C3Vector {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn to_glam(&self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.y, self.z)
    }

    pub fn from_glam(v: glam::Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for C3Vector {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<glam::Vec3> for C3Vector {
    fn from(value: glam::Vec3) -> Self {
        Self::from_glam(value)
    }
}

wow_record! {
    /// Nine packed floats, used for row-major 3x3 matrices
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct C9Vector {
        pub values: [f32; 9],
    }
}

impl C9Vector {
    pub fn identity() -> Self {
        Self {
            values: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn to_glam(&self) -> glam::Mat3 {
        glam::Mat3::from_cols_array(&self.values).transpose()
    }
}

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Quaternion {
        pub x: f32,
        pub y: f32,
        pub z: f32,
        pub w: f32,
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::from_glam(glam::Quat::IDENTITY)
    }
}

impl Quaternion {
    pub fn to_glam(&self) -> glam::Quat {
        glam::Quat::from_xyzw(self.x, self.y, self.z, self.w)
    }

    pub fn from_glam(q: glam::Quat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

#[inline]
pub fn i16_to_f32(value: i16) -> f32 {
    if value < 0 {
        (f32::from(value) + 32768.0) / 32767.0
    } else {
        (f32::from(value) - 32767.0) / 32767.0
    }
}

#[inline]
pub fn f32_to_i16(value: f32) -> i16 {
    let value = value.clamp(-1.0, 1.0);
    let raw = if value > 0.0 {
        value * 32767.0 - 32768.0
    } else {
        value * 32767.0 + 32767.0
    };
    raw.round() as i16
}

wow_record! {
    /// Compressed rotation used by M2 bone tracks
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Quaternion16 {
        pub x: i16,
        pub y: i16,
        pub z: i16,
        pub w: i16,
    }
}

impl Quaternion16 {
    pub fn identity() -> Self {
        Quaternion::default().into()
    }
}

impl From<Quaternion16> for Quaternion {
    fn from(value: Quaternion16) -> Self {
        Self {
            x: i16_to_f32(value.x),
            y: i16_to_f32(value.y),
            z: i16_to_f32(value.z),
            w: i16_to_f32(value.w),
        }
    }
}

impl From<Quaternion> for Quaternion16 {
    fn from(value: Quaternion) -> Self {
        Self {
            x: f32_to_i16(value.x),
            y: f32_to_i16(value.y),
            z: f32_to_i16(value.z),
            w: f32_to_i16(value.w),
        }
    }
}

wow_record! {
    /// Axis aligned box, `min` then `max`
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct BoundingBox {
        pub min: C3Vector,
        pub max: C3Vector,
    }
}

impl BoundingBox {
    pub fn new(min: C3Vector, max: C3Vector) -> Self {
        Self { min, max }
    }

    pub fn zero() -> Self {
        Self::new(C3Vector::origin(), C3Vector::origin())
    }

    /// Componentwise reduction over `points`. `None` when there are no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator,
        I::Item: Into<glam::Vec3>,
    {
        let mut iter = points.into_iter().map(Into::into);
        let first: glam::Vec3 = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::new(min.into(), max.into()))
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min.to_glam().min(other.min.to_glam()).into(),
            self.max.to_glam().max(other.max.to_glam()).into(),
        )
    }

    pub fn contains(&self, point: glam::Vec3) -> bool {
        point.cmpge(self.min.to_glam()).all() && point.cmple(self.max.to_glam()).all()
    }

    pub fn extent(&self) -> glam::Vec3 {
        self.max.to_glam() - self.min.to_glam()
    }

    pub fn center(&self) -> glam::Vec3 {
        (self.min.to_glam() + self.max.to_glam()) * 0.5
    }

    /// Radius of the sphere around `center()` that encloses the box
    pub fn radius(&self) -> f32 {
        self.extent().length() * 0.5
    }

    pub fn is_valid(&self) -> bool {
        self.min.to_glam().cmple(self.max.to_glam()).all()
    }
}

impl From<C3Vector> for glam::Vec3 {
    fn from(value: C3Vector) -> Self {
        value.to_glam()
    }
}

wow_record! {
    /// Bounding box plus the radius of the enclosing sphere
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct BoundingSphere {
        pub bounding_box: BoundingBox,
        pub radius: f32,
    }
}

impl BoundingSphere {
    pub fn from_box(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            radius: bounding_box.radius(),
        }
    }
}

wow_record! {
    /// 8-bit colour, stored as BGRA on disk
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Color {
        pub b: u8,
        pub g: u8,
        pub r: u8,
        pub a: u8,
    }
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 0xFF);
    pub const WHITE: Self = Self::rgba(0xFF, 0xFF, 0xFF, 0xFF);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Build from normalised float channels, clamped to `[0, 1]`
    pub fn from_f32(rgba: [f32; 4]) -> Self {
        let [r, g, b, a] = rgba.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        Self::rgba(r, g, b, a)
    }

    pub fn to_f32(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| f32::from(c) / 255.0)
    }
}

wow_record! {
    /// Plane `dot(normal, p) = distance`
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Plane {
        pub normal: C3Vector,
        pub distance: f32,
    }
}

impl Plane {
    /// Plane through three points with a counter-clockwise front side.
    /// `None` when the points are collinear.
    pub fn from_points(a: glam::Vec3, b: glam::Vec3, c: glam::Vec3) -> Option<Self> {
        let normal = (b - a).cross(c - a).try_normalize()?;
        Some(Self {
            normal: normal.into(),
            distance: normal.dot(a),
        })
    }

    pub fn signed_distance(&self, point: glam::Vec3) -> f32 {
        self.normal.to_glam().dot(point) - self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{WowReader, WowStruct, WowWriter};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_record_sizes() {
        assert_eq!(C2Vector::SIZE, 8);
        assert_eq!(C3Vector::SIZE, 12);
        assert_eq!(C9Vector::SIZE, 36);
        assert_eq!(Quaternion::SIZE, 16);
        assert_eq!(Quaternion16::SIZE, 8);
        assert_eq!(BoundingBox::SIZE, 24);
        assert_eq!(BoundingSphere::SIZE, 28);
        assert_eq!(Color::SIZE, 4);
        assert_eq!(Plane::SIZE, 16);
    }

    #[test]
    fn test_c3vector_parse() {
        let data = [
            0x00, 0x00, 0x80, 0x3F, // x = 1.0
            0x00, 0x00, 0x00, 0x40, // y = 2.0
            0x00, 0x00, 0x40, 0x40, // z = 3.0
        ];

        let mut cursor = Cursor::new(data);
        let vector: C3Vector = cursor.wow_read().unwrap();

        assert_eq!(vector, C3Vector::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_color_byte_order() {
        let mut data = Vec::new();
        data.wow_write(&Color::rgba(0x11, 0x22, 0x33, 0x44)).unwrap();
        assert_eq!(data, [0x33, 0x22, 0x11, 0x44]);
    }

    #[test]
    fn test_quaternion16_conversion() {
        assert_eq!(i16_to_f32(32767), 0.0);
        assert_eq!(i16_to_f32(-1), 1.0);
        assert_eq!(f32_to_i16(0.0), 32767);
        assert_eq!(f32_to_i16(1.0), -1);

        let identity = Quaternion::from(Quaternion16::identity());
        assert_eq!(identity, Quaternion::default());
    }

    #[test]
    fn test_quaternion16_negative_components() {
        let q = Quaternion16::from(Quaternion {
            x: -0.5,
            y: 0.5,
            z: -1.0,
            w: 0.25,
        });
        let back = Quaternion::from(q);
        assert!((back.x + 0.5).abs() < 1e-4);
        assert!((back.y - 0.5).abs() < 1e-4);
        assert!((back.z + 1.0).abs() < 1e-4);
        assert!((back.w - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_bounding_box_from_points() {
        let bbox = BoundingBox::from_points([
            C3Vector::new(1.0, -2.0, 3.0),
            C3Vector::new(-1.0, 4.0, 0.0),
        ])
        .unwrap();

        assert_eq!(bbox.min, C3Vector::new(-1.0, -2.0, 0.0));
        assert_eq!(bbox.max, C3Vector::new(1.0, 4.0, 3.0));
        assert!(bbox.is_valid());
        assert!(bbox.contains(glam::Vec3::ZERO));
        assert!(BoundingBox::from_points(Vec::<C3Vector>::new()).is_none());
    }

    #[test]
    fn test_bounding_box_union() {
        let a = BoundingBox::new(C3Vector::new(0.0, 0.0, 0.0), C3Vector::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(C3Vector::new(-1.0, 0.5, 0.5), C3Vector::new(0.5, 2.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, C3Vector::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, C3Vector::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(
            glam::Vec3::new(0.0, 0.0, 2.0),
            glam::Vec3::new(1.0, 0.0, 2.0),
            glam::Vec3::new(0.0, 1.0, 2.0),
        )
        .unwrap();
        assert_eq!(plane.normal, C3Vector::new(0.0, 0.0, 1.0));
        assert_eq!(plane.distance, 2.0);
        assert!(Plane::from_points(glam::Vec3::ZERO, glam::Vec3::X, glam::Vec3::X * 2.0).is_none());
    }
}
