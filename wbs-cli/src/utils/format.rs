//! Formatting utilities

use humansize::{DECIMAL, format_size};
use wbs_data::math::{BoundingBox, C3Vector};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

pub fn format_vector(v: &C3Vector) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

/// `min .. max` of a box
pub fn format_bounds(bounds: &BoundingBox) -> String {
    format!(
        "{} .. {}",
        format_vector(&bounds.min),
        format_vector(&bounds.max)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(1048576), "1.05 MB");
    }

    #[test]
    fn test_format_bounds() {
        let bounds = BoundingBox::new(
            C3Vector::new(-1.0, 0.0, 0.5),
            C3Vector::new(2.0, 3.25, 4.0),
        );
        assert_eq!(
            format_bounds(&bounds),
            "(-1.00, 0.00, 0.50) .. (2.00, 3.25, 4.00)"
        );
    }
}
