use wbs_data::math::{C2Vector, C3Vector};
use wbs_data::wow_record;

wow_record! {
    /// A skinned model vertex, 48 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2Vertex {
        pub position: C3Vector,
        /// Weights of `bone_indices`, summing to 255
        pub bone_weights: [u8; 4],
        pub bone_indices: [u8; 4],
        pub normal: C3Vector,
        pub tex_coords: [C2Vector; 2],
    }
}

impl M2Vertex {
    /// A vertex bound entirely to `bone`
    pub fn rigid(position: C3Vector, normal: C3Vector, tex_coords: C2Vector, bone: u8) -> Self {
        Self {
            position,
            bone_weights: [255, 0, 0, 0],
            bone_indices: [bone, 0, 0, 0],
            normal,
            tex_coords: [tex_coords, C2Vector::default()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use wbs_data::types::{WowReader, WowStruct, WowWriter};

    #[test]
    fn test_vertex_layout() {
        assert_eq!(M2Vertex::SIZE, 48);

        let vertex = M2Vertex::rigid(
            C3Vector::new(1.0, 2.0, 3.0),
            C3Vector::new(0.0, 0.0, 1.0),
            C2Vector::new(0.5, 0.25),
            3,
        );
        let mut data = Vec::new();
        data.wow_write(&vertex).unwrap();
        assert_eq!(&data[12..20], &[255, 0, 0, 0, 3, 0, 0, 0]);

        let read: M2Vertex = Cursor::new(data).wow_read().unwrap();
        assert_eq!(read, vertex);
    }
}
