//! Mode identifiers.

use std::fmt;

/// Every transform mode the engine dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Translate,
    Rotate,
    Trackball,
    Resize,
    SkinResize,
    Shear,
    Bend,
    ToSphere,
    ShrinkFatten,
    PushPull,
    Tilt,
    BevelWeight,
    Crease,
    CurveShrinkFatten,
    BoneEnvelope,
    BoneRoll,
    EdgeSlide,
    VertSlide,
    Mirror,
    Align,
}

impl ModeKind {
    pub const ALL: [ModeKind; 20] = [
        ModeKind::Translate,
        ModeKind::Rotate,
        ModeKind::Trackball,
        ModeKind::Resize,
        ModeKind::SkinResize,
        ModeKind::Shear,
        ModeKind::Bend,
        ModeKind::ToSphere,
        ModeKind::ShrinkFatten,
        ModeKind::PushPull,
        ModeKind::Tilt,
        ModeKind::BevelWeight,
        ModeKind::Crease,
        ModeKind::CurveShrinkFatten,
        ModeKind::BoneEnvelope,
        ModeKind::BoneRoll,
        ModeKind::EdgeSlide,
        ModeKind::VertSlide,
        ModeKind::Mirror,
        ModeKind::Align,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModeKind::Translate => "Move",
            ModeKind::Rotate => "Rotate",
            ModeKind::Trackball => "Trackball",
            ModeKind::Resize => "Resize",
            ModeKind::SkinResize => "Skin Resize",
            ModeKind::Shear => "Shear",
            ModeKind::Bend => "Bend",
            ModeKind::ToSphere => "To Sphere",
            ModeKind::ShrinkFatten => "Shrink/Fatten",
            ModeKind::PushPull => "Push/Pull",
            ModeKind::Tilt => "Tilt",
            ModeKind::BevelWeight => "Bevel Weight",
            ModeKind::Crease => "Crease",
            ModeKind::CurveShrinkFatten => "Curve Radius",
            ModeKind::BoneEnvelope => "Bone Envelope",
            ModeKind::BoneRoll => "Bone Roll",
            ModeKind::EdgeSlide => "Edge Slide",
            ModeKind::VertSlide => "Vertex Slide",
            ModeKind::Mirror => "Mirror",
            ModeKind::Align => "Align",
        }
    }

    /// Single-shot modes apply once and confirm; they take no live pointer
    /// input.
    pub fn is_single_shot(self) -> bool {
        matches!(self, ModeKind::Mirror | ModeKind::Align)
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
