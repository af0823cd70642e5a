//! Element groups: per-object containers of transform elements.

use glam::{Mat3, Mat4, Vec3};
use smallvec::SmallVec;

use crate::element::{ElementExt, TransformElement};

/// Precomputed adjacency for the slide modes, supplied by the selection
/// adapter at session build time. Edge slide reads the two candidate side
/// directions; vert slide reads the link coordinate list.
#[derive(Debug, Clone)]
pub struct SlideVert {
    /// Index of the element this record drives.
    pub element: usize,
    /// Candidate target directions toward the two adjacent edge loops.
    pub dir_side: [Vec3; 2],
    /// Length of this vertex's own slide edge, for "even" normalization.
    pub edge_len: f32,
    /// Original coordinates of linked vertices (vert slide targets).
    pub links: SmallVec<[Vec3; 4]>,
}

#[derive(Debug, Clone, Default)]
pub struct SlideTopology {
    pub verts: Vec<SlideVert>,
    /// Index into `verts` of the vertex nearest the cursor; drives the
    /// "even" reference length and the active link.
    pub active: usize,
    /// Active link index for vert slide.
    pub active_link: usize,
}

impl SlideTopology {
    pub fn has_edge_data(&self) -> bool {
        !self.verts.is_empty()
    }

    pub fn has_vert_data(&self) -> bool {
        self.verts.iter().any(|sv| !sv.links.is_empty())
    }
}

/// Groups the elements belonging to one logical object/data block.
///
/// Supports multi-object editing: a session holds one group per object,
/// each with its own object-to-global matrices and local pivot.
#[derive(Debug, Clone)]
pub struct ElementGroup {
    pub name: String,
    /// Object to global.
    pub mat: Mat4,
    /// Global to object.
    pub imat: Mat4,
    /// 3x3 of `mat`.
    pub mat3: Mat3,
    /// 3x3 of `imat`.
    pub imat3: Mat3,
    pub elements: Vec<TransformElement>,
    /// Parallel to `elements` when rotation/scale channels apply; empty
    /// otherwise.
    pub exts: Vec<ElementExt>,
    /// Adjacency for the slide modes, when the adapter could provide it.
    pub slide: Option<SlideTopology>,
}

impl ElementGroup {
    pub fn new(name: impl Into<String>, elements: Vec<TransformElement>) -> Self {
        Self {
            name: name.into(),
            mat: Mat4::IDENTITY,
            imat: Mat4::IDENTITY,
            mat3: Mat3::IDENTITY,
            imat3: Mat3::IDENTITY,
            elements,
            exts: Vec::new(),
            slide: None,
        }
    }

    pub fn with_matrix(mut self, mat: Mat4) -> Self {
        self.imat = mat.inverse();
        self.mat3 = Mat3::from_mat4(mat);
        self.imat3 = Mat3::from_mat4(self.imat);
        self.mat = mat;
        self
    }

    pub fn with_exts(mut self, exts: Vec<ElementExt>) -> Self {
        debug_assert_eq!(exts.len(), self.elements.len());
        self.exts = exts;
        self
    }

    pub fn with_slide(mut self, slide: SlideTopology) -> Self {
        self.slide = Some(slide);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|el| el.flags.is_selected())
            .count()
    }

    /// Object-space point to global space.
    pub fn to_global(&self, co: Vec3) -> Vec3 {
        self.mat.transform_point3(co)
    }

    /// Global-space point into object space.
    pub fn to_local(&self, co: Vec3) -> Vec3 {
        self.imat.transform_point3(co)
    }

    /// Restore every element (and extension) to its original state.
    pub fn restore(&mut self) {
        for el in &mut self.elements {
            el.restore();
        }
        for ext in &mut self.exts {
            ext.restore();
        }
    }

}
