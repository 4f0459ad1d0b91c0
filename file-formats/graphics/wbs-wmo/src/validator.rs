use std::fmt;

use wbs_data::math::BoundingBox;

use crate::file::WmoFile;
use crate::group::{MAX_GROUP_VERTICES, WmoGroupFile, derive_gating_flags};
use crate::root::{MAX_MATERIALS, WmoRootFile};
use crate::wmo_types::DISABLED_MATERIAL;

/// Validator for assembled or decoded WMO files
#[derive(Debug, Default)]
pub struct WmoValidator;

impl WmoValidator {
    /// Create a new WMO validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a root and its groups
    pub fn validate(&self, wmo: &WmoFile) -> ValidationReport {
        let mut report = ValidationReport::new();
        self.validate_root(&wmo.root, &mut report);

        if wmo.root.group_infos.len() != wmo.groups.len() {
            report.add_error(ValidationError::CountMismatch {
                field: "group_infos".to_string(),
                expected: wmo.groups.len(),
                actual: wmo.root.group_infos.len(),
            });
        }

        for (index, group) in wmo.groups.iter().enumerate() {
            self.validate_group(index, group, wmo.root.materials.len(), &mut report);
        }

        report
    }

    fn validate_root(&self, root: &WmoRootFile, report: &mut ValidationReport) {
        if root.materials.len() > MAX_MATERIALS {
            report.add_warning(ValidationWarning::LimitExceeded {
                field: "materials".to_string(),
                count: root.materials.len(),
                limit: MAX_MATERIALS,
            });
        }

        check_box(report, "root bounding box", &root.header.bounding_box);
        for (i, info) in root.group_infos.iter().enumerate() {
            check_box(report, &format!("group_info[{i}]"), &info.bounding_box);
        }

        let defs = root.doodad_defs.len();
        for (i, set) in root.doodad_sets.iter().enumerate() {
            let end = set.start_doodad as usize + set.n_doodads as usize;
            if end > defs {
                report.add_error(ValidationError::InvalidReference {
                    field: format!("doodad_set[{i}]"),
                    value: end,
                    limit: defs,
                });
            }
        }

        let portal_vertices = root.portal_vertices.len();
        for (i, portal) in root.portals.iter().enumerate() {
            let end = usize::from(portal.start_vertex) + usize::from(portal.vertex_count);
            if end > portal_vertices {
                report.add_error(ValidationError::InvalidReference {
                    field: format!("portal[{i}].vertices"),
                    value: end,
                    limit: portal_vertices,
                });
            }
        }

        for (i, relation) in root.portal_refs.iter().enumerate() {
            if usize::from(relation.portal_index) >= root.portals.len() {
                report.add_error(ValidationError::InvalidReference {
                    field: format!("portal_ref[{i}].portal_index"),
                    value: usize::from(relation.portal_index),
                    limit: root.portals.len(),
                });
            }
            if usize::from(relation.group_index) >= root.group_infos.len() {
                report.add_error(ValidationError::InvalidReference {
                    field: format!("portal_ref[{i}].group_index"),
                    value: usize::from(relation.group_index),
                    limit: root.group_infos.len(),
                });
            }
        }
    }

    fn validate_group(
        &self,
        index: usize,
        group: &WmoGroupFile,
        material_count: usize,
        report: &mut ValidationReport,
    ) {
        let name = |field: &str| format!("group[{index}].{field}");
        let vertex_count = group.vertices.len();
        let triangle_count = group.triangle_count();

        if vertex_count > MAX_GROUP_VERTICES {
            report.add_warning(ValidationWarning::LimitExceeded {
                field: name("vertices"),
                count: vertex_count,
                limit: MAX_GROUP_VERTICES,
            });
        }
        if vertex_count == 0 || triangle_count == 0 {
            report.add_warning(ValidationWarning::EmptyData {
                field: format!("group[{index}]"),
                explanation: "group has no geometry".to_string(),
            });
        }

        check_box(report, &name("bounding_box"), &group.header.bounding_box);

        if group.poly_materials.len() != triangle_count {
            report.add_error(ValidationError::CountMismatch {
                field: name("poly_materials"),
                expected: triangle_count,
                actual: group.poly_materials.len(),
            });
        }
        for (field, count) in [
            ("normals", group.normals.len()),
            ("tex_coords", group.tex_coords.len()),
        ] {
            if count != vertex_count {
                report.add_error(ValidationError::CountMismatch {
                    field: name(field),
                    expected: vertex_count,
                    actual: count,
                });
            }
        }

        if let Some(&bad) = group.indices.iter().find(|&&i| usize::from(i) >= vertex_count) {
            report.add_error(ValidationError::InvalidReference {
                field: name("indices"),
                value: usize::from(bad),
                limit: vertex_count,
            });
        }

        for (i, poly) in group.poly_materials.iter().enumerate() {
            if poly.material_id != DISABLED_MATERIAL
                && usize::from(poly.material_id) >= material_count
            {
                report.add_error(ValidationError::InvalidReference {
                    field: name(&format!("poly_material[{i}]")),
                    value: usize::from(poly.material_id),
                    limit: material_count,
                });
            }
        }

        for (i, batch) in group.batches.iter().enumerate() {
            let index_end = batch.start_index as usize + usize::from(batch.index_count);
            if index_end > group.indices.len() {
                report.add_error(ValidationError::InvalidReference {
                    field: name(&format!("batch[{i}].indices")),
                    value: index_end,
                    limit: group.indices.len(),
                });
            }
            if usize::from(batch.last_vertex) >= vertex_count
                || batch.start_vertex > batch.last_vertex
            {
                report.add_error(ValidationError::InvalidReference {
                    field: name(&format!("batch[{i}].vertices")),
                    value: usize::from(batch.last_vertex),
                    limit: vertex_count,
                });
            }
            if usize::from(batch.material_id) >= material_count {
                report.add_error(ValidationError::InvalidReference {
                    field: name(&format!("batch[{i}].material_id")),
                    value: usize::from(batch.material_id),
                    limit: material_count,
                });
            }
            if batch.index_count == 0 {
                report.add_warning(ValidationWarning::EmptyData {
                    field: name(&format!("batch[{i}]")),
                    explanation: "batch draws no triangles".to_string(),
                });
            }
        }

        let node_count = group.bsp.nodes.len();
        for (i, node) in group.bsp.nodes.iter().enumerate() {
            for child in node.children {
                if child >= 0 && child as usize >= node_count {
                    report.add_error(ValidationError::InvalidReference {
                        field: name(&format!("bsp_node[{i}].children")),
                        value: child as usize,
                        limit: node_count,
                    });
                }
            }
            if node.is_leaf() {
                let end = node.first_face as usize + usize::from(node.face_count);
                if end > group.bsp.faces.len() {
                    report.add_error(ValidationError::InvalidReference {
                        field: name(&format!("bsp_node[{i}].faces")),
                        value: end,
                        limit: group.bsp.faces.len(),
                    });
                }
            }
        }
        if let Some(&bad) = group
            .bsp
            .faces
            .iter()
            .find(|&&face| usize::from(face) >= triangle_count)
        {
            report.add_error(ValidationError::InvalidReference {
                field: name("bsp_faces"),
                value: usize::from(bad),
                limit: triangle_count,
            });
        }

        let implied = derive_gating_flags(group, group.header.flags);
        let disagreeing = implied.symmetric_difference(group.header.flags);
        if !disagreeing.is_empty() {
            report.add_error(ValidationError::FlagMismatch {
                field: name("flags"),
                flags: format!("{disagreeing:?}"),
            });
        }
    }
}

fn check_box(report: &mut ValidationReport, field: &str, bounding_box: &BoundingBox) {
    if !bounding_box.is_valid() {
        report.add_error(ValidationError::InvalidBoundingBox {
            field: field.to_string(),
            min: format!("{:?}", bounding_box.min.to_array()),
            max: format!("{:?}", bounding_box.max.to_array()),
        });
    }
}

/// Report of validation results
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Validation errors (severe issues)
    pub errors: Vec<ValidationError>,

    /// Validation warnings (potential issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two counts that must agree do not
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Index or range past the end of what it refers to
    InvalidReference {
        field: String,
        value: usize,
        limit: usize,
    },

    /// Bounding box with `min > max` on some axis
    InvalidBoundingBox {
        field: String,
        min: String,
        max: String,
    },

    /// Gating flags that disagree with the chunks present
    FlagMismatch { field: String, flags: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountMismatch {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Count mismatch for {field}: expected {expected}, found {actual}"
                )
            }
            Self::InvalidReference {
                field,
                value,
                limit,
            } => {
                write!(f, "Invalid reference in {field}: {value}, limit {limit}")
            }
            Self::InvalidBoundingBox { field, min, max } => {
                write!(f, "Invalid bounding box in {field}: min {min} exceeds max {max}")
            }
            Self::FlagMismatch { field, flags } => {
                write!(f, "{field} disagree with the group data: {flags}")
            }
        }
    }
}

/// Validation warning types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// More entries than the on-disk index width can address
    LimitExceeded {
        field: String,
        count: usize,
        limit: usize,
    },

    /// Empty data (non-critical)
    EmptyData { field: String, explanation: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitExceeded {
                field,
                count,
                limit,
            } => {
                write!(f, "{field} has {count} entries, the format allows {limit}")
            }
            Self::EmptyData { field, explanation } => {
                write!(f, "Empty data for {field}: {explanation}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::BspOptions;
    use crate::group::{BatchClass, MeshTriangle, WmoGroupMesh};
    use crate::wmo_group_types::{WmoGroupFlags, WmoPolyFlags};
    use crate::wmo_types::WmoMaterialDefinition;
    use wbs_data::math::{C2Vector, C3Vector};

    fn valid_file() -> WmoFile {
        let mut root = WmoRootFile::new();
        let material = root
            .add_material(&WmoMaterialDefinition {
                texture1: "wall.blp".to_string(),
                ..WmoMaterialDefinition::default()
            })
            .unwrap();

        let mesh = WmoGroupMesh {
            positions: vec![
                C3Vector::new(0.0, 0.0, 0.0),
                C3Vector::new(1.0, 0.0, 0.0),
                C3Vector::new(0.0, 1.0, 0.0),
            ],
            normals: vec![C3Vector::new(0.0, 0.0, 1.0); 3],
            tex_coords: vec![C2Vector::default(); 3],
            triangles: vec![MeshTriangle {
                indices: [0, 1, 2],
                material_id: material,
                flags: WmoPolyFlags::RENDER,
                batch_class: BatchClass::Exterior,
            }],
            ..WmoGroupMesh::default()
        };

        let index = root.add_group("Room", "", WmoGroupFlags::EXTERIOR, BoundingBox::zero());
        let header = root.group_header(index).unwrap();
        let group = WmoGroupFile::from_mesh(&mesh, header, &BspOptions::default()).unwrap();
        let groups = vec![group];
        root.finalize(&groups).unwrap();
        WmoFile::new(root, groups)
    }

    #[test]
    fn test_assembled_file_is_clean() {
        let report = WmoValidator::new().validate(&valid_file());
        assert!(!report.has_errors(), "{:?}", report.errors);
        assert!(!report.has_warnings(), "{:?}", report.warnings);
    }

    #[test]
    fn test_flag_disagreement() {
        let mut wmo = valid_file();
        wmo.groups[0].header.flags |= WmoGroupFlags::HAS_LIGHTS;

        let report = WmoValidator::new().validate(&wmo);
        assert!(matches!(
            report.errors.as_slice(),
            [ValidationError::FlagMismatch { .. }]
        ));
    }

    #[test]
    fn test_bad_references() {
        let mut wmo = valid_file();
        wmo.groups[0].batches[0].material_id = 9;
        wmo.groups[0].bsp.faces.push(40);
        wmo.root.add_portal_relation(3, 0, 1);

        let report = WmoValidator::new().validate(&wmo);
        assert_eq!(report.errors.len(), 3);
        assert!(
            report
                .errors
                .iter()
                .all(|e| matches!(e, ValidationError::InvalidReference { .. }))
        );
    }

    #[test]
    fn test_count_mismatches() {
        let mut wmo = valid_file();
        wmo.groups[0].normals.pop();
        wmo.groups[0].poly_materials.clear();
        wmo.root.group_infos.clear();

        let report = WmoValidator::new().validate(&wmo);
        assert_eq!(
            report
                .errors
                .iter()
                .filter(|e| matches!(e, ValidationError::CountMismatch { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_limits_are_warnings() {
        let mut wmo = valid_file();
        wmo.groups[0]
            .vertices
            .resize(MAX_GROUP_VERTICES + 1, C3Vector::default());

        let report = WmoValidator::new().validate(&wmo);
        assert!(report.warnings.iter().any(|w| matches!(
            w,
            ValidationWarning::LimitExceeded { count, .. } if *count == MAX_GROUP_VERTICES + 1
        )));
    }

    #[test]
    fn test_inverted_box() {
        let mut wmo = valid_file();
        wmo.groups[0].header.bounding_box.min.x = 5.0;

        let report = WmoValidator::new().validate(&wmo);
        assert!(
            report
                .errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidBoundingBox { .. }))
        );
    }
}
