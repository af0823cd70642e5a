//! The transform session.
//!
//! One value of [`TransformSession`] holds everything a modal transform
//! needs: the element groups built from the host selection, the pivot, the
//! view, the constraint/snap/input state and the live value vector the
//! active kernel consumes. The session is built once through
//! [`SessionBuilder`], driven by the controller crate, and dropped when the
//! operation confirms or cancels.

use std::fmt;

use glam::{Mat3, Vec2, Vec3};
use tracing::debug;

use crate::constraint::AxisConstraint;
use crate::element::TransformElement;
use crate::error::{Result, TransformError};
use crate::flags::{ModifierFlags, SessionFlags};
use crate::group::ElementGroup;
use crate::input::{InputMode, PointerInput};
use crate::mode::ModeKind;
use crate::numinput::NumericInput;
use crate::observer::Redraw;
use crate::prop::{self, Falloff, Lcg};
use crate::settings::{settings_handle, SettingsHandle, TransformSettings};
use crate::snap::{SnapContext, SnapQuery};
use crate::view::ViewParams;

/// Editor space a session is bound to. Some modes only exist in some
/// spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    View3d,
    ImageUv,
    GraphEditor,
    Sequencer,
}

impl fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpaceKind::View3d => "the 3D viewport",
            SpaceKind::ImageUv => "the UV editor",
            SpaceKind::GraphEditor => "the graph editor",
            SpaceKind::Sequencer => "the sequencer",
        };
        f.write_str(name)
    }
}

/// Lifecycle of the modal loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built but the first pointer sample has not arrived.
    Starting,
    Running,
    /// Confirm requested; the next controller step commits.
    Confirm,
    /// Cancel requested; the next controller step restores and discards.
    Cancel,
}

/// What the shared transform center is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotPoint {
    Median,
    BoundsCenter,
    Cursor,
    ActiveElement,
    /// Every element pivots around its own center.
    IndividualOrigins,
}

/// Whether elements are edit-data points or whole objects. Object sessions
/// compose rotation/scale channels; point sessions only move coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    EditPoints,
    Objects,
}

pub struct TransformSession {
    pub mode: ModeKind,
    pub state: SessionState,
    /// Strongest redraw request accumulated while handling one event.
    pub redraw: Redraw,
    pub flags: SessionFlags,
    pub modifiers: ModifierFlags,
    pub space: SpaceKind,
    pub target: TargetKind,
    pub pivot: PivotPoint,

    pub groups: Vec<ElementGroup>,
    /// Shared pivot in global space.
    pub center_global: Vec3,
    /// Shared pivot projected to window pixels.
    pub center2d: Vec2,
    /// Host cursor position, for the cursor pivot.
    pub cursor: Vec3,
    /// Active element as (group index, element index).
    pub active: Option<(usize, usize)>,

    pub view: ViewParams,
    /// Pointer position when the session was invoked.
    pub mval_start: Vec2,
    /// Last pointer position delivered to the controller.
    pub mval: Vec2,
    /// Orientation stack: slot 0 is global, further slots are host-defined
    /// bases cycled through with repeated axis presses.
    pub orientations: Vec<(String, Mat3)>,
    pub orientation_index: usize,

    pub con: AxisConstraint,
    pub snap: SnapContext,
    /// Host geometry oracle for scene snapping and surface projection.
    pub snap_query: Option<std::sync::Arc<dyn SnapQuery + Send + Sync>>,
    pub pointer: PointerInput,
    pub num: NumericInput,

    pub prop_size: f32,
    pub prop_falloff: Falloff,

    /// Raw values shaped from the pointer this event.
    pub values: [f32; 4],
    /// Values after constraint, snap and numeric overrides; what the
    /// kernel actually applies.
    pub values_final: [f32; 4],
    /// Mode axis (rotation axis, shear direction, mirror normal).
    pub axis: Vec3,
    pub axis_orig: Vec3,
    /// Mode-owned scratch vectors seeded at kernel init (bend warp frame,
    /// slide directions, ...).
    pub custom_vecs: [Vec3; 3],

    pub settings: SettingsHandle,
    pub rng: Lcg,
    /// Header text composed by the active kernel.
    pub header: String,
}

impl TransformSession {
    pub fn builder(mode: ModeKind) -> SessionBuilder {
        SessionBuilder::new(mode)
    }

    pub fn total_elements(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    pub fn selected_count(&self) -> usize {
        self.groups.iter().map(|g| g.selected_count()).sum()
    }

    pub fn prop_edit(&self) -> bool {
        self.flags.has(SessionFlags::PROP_EDIT)
    }

    /// Scale and value-channel modes pivot per element under individual
    /// origins; other pivots share `center_global`.
    pub fn use_local_center(&self) -> bool {
        self.pivot == PivotPoint::IndividualOrigins
    }

    /// Element center for kernels, honoring the pivot mode.
    pub fn element_center(&self, group: &ElementGroup, element: &TransformElement) -> Vec3 {
        if self.use_local_center() {
            element.center
        } else {
            group.to_local(self.center_global)
        }
    }

    /// Recompute the shared pivot from the current pivot mode, then
    /// reproject it for the pointer mapper.
    pub fn recalc_center(&mut self) {
        self.center_global = match self.pivot {
            PivotPoint::Cursor => self.cursor,
            PivotPoint::ActiveElement => self
                .active
                .and_then(|(g, e)| {
                    let group = self.groups.get(g)?;
                    let el = group.elements.get(e)?;
                    Some(group.to_global(el.center))
                })
                .unwrap_or_else(|| self.median_center()),
            PivotPoint::BoundsCenter => self.bounds_center(),
            PivotPoint::Median | PivotPoint::IndividualOrigins => self.median_center(),
        };
        self.center2d = self.view.project_or_center(self.center_global);
        self.pointer.rebase_center(self.center2d);
    }

    fn median_center(&self) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut count = 0usize;
        for group in &self.groups {
            for el in &group.elements {
                if el.flags.is_selected() {
                    sum += group.to_global(el.center);
                    count += 1;
                }
            }
        }
        if count == 0 {
            Vec3::ZERO
        } else {
            sum / count as f32
        }
    }

    fn bounds_center(&self) -> Vec3 {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut any = false;
        for group in &self.groups {
            for el in &group.elements {
                if el.flags.is_selected() {
                    let co = group.to_global(el.center);
                    min = min.min(co);
                    max = max.max(co);
                    any = true;
                }
            }
        }
        if any {
            (min + max) * 0.5
        } else {
            Vec3::ZERO
        }
    }

    /// Recompute proportional factors from the live radius and curve.
    pub fn recalc_prop_factors(&mut self) {
        if !self.prop_edit() {
            return;
        }
        let connected = self.flags.has(SessionFlags::PROP_CONNECTED);
        prop::calculate_factors(
            &mut self.groups,
            self.prop_falloff,
            self.prop_size,
            connected,
            &mut self.rng,
        );
    }

    /// Grow or shrink the proportional radius by one wheel step.
    pub fn resize_prop_radius(&mut self, grow: bool) {
        if !self.prop_edit() {
            return;
        }
        if grow {
            self.prop_size *= 1.1;
        } else {
            self.prop_size /= 1.1;
        }
        self.recalc_prop_factors();
        self.redraw = self.redraw.combine(Redraw::Hard);
    }

    /// Restore every working value to its original, bit-exact.
    pub fn restore_all(&mut self) {
        for group in &mut self.groups {
            group.restore();
        }
        self.values = [0.0; 4];
        self.values_final = [0.0; 4];
        self.axis = self.axis_orig;
    }

    /// Basis of the active orientation slot.
    pub fn orientation_basis(&self) -> Mat3 {
        self.orientations
            .get(self.orientation_index)
            .map(|(_, m)| *m)
            .unwrap_or(Mat3::IDENTITY)
    }

    pub fn orientation_name(&self) -> &str {
        self.orientations
            .get(self.orientation_index)
            .map(|(name, _)| name.as_str())
            .unwrap_or("global")
    }

    /// Advance to the next orientation slot, wrapping back to global.
    pub fn cycle_orientation(&mut self) {
        self.orientation_index = (self.orientation_index + 1) % self.orientations.len().max(1);
    }
}

impl fmt::Debug for TransformSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSession")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("groups", &self.groups.len())
            .field("elements", &self.total_elements())
            .finish_non_exhaustive()
    }
}

/// Builds a session from host data. The host adapter collects elements into
/// groups, sets the view and selection metadata, and lets `build()` run the
/// shared validation.
pub struct SessionBuilder {
    mode: ModeKind,
    space: SpaceKind,
    target: TargetKind,
    pivot: PivotPoint,
    flags: SessionFlags,
    groups: Vec<ElementGroup>,
    view: ViewParams,
    cursor: Vec3,
    active: Option<(usize, usize)>,
    orientations: Vec<(String, Mat3)>,
    settings: Option<SettingsHandle>,
    snap_query: Option<std::sync::Arc<dyn SnapQuery + Send + Sync>>,
    mval: Vec2,
}

impl SessionBuilder {
    pub fn new(mode: ModeKind) -> Self {
        Self {
            mode,
            space: SpaceKind::View3d,
            target: TargetKind::EditPoints,
            pivot: PivotPoint::Median,
            flags: SessionFlags::default(),
            groups: Vec::new(),
            view: ViewParams::default(),
            cursor: Vec3::ZERO,
            active: None,
            orientations: vec![("global".into(), Mat3::IDENTITY)],
            settings: None,
            snap_query: None,
            mval: Vec2::ZERO,
        }
    }

    pub fn space(mut self, space: SpaceKind) -> Self {
        self.space = space;
        self
    }

    pub fn target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    pub fn pivot(mut self, pivot: PivotPoint) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn flags(mut self, bits: u32) -> Self {
        self.flags.set(bits);
        self
    }

    pub fn group(mut self, group: ElementGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn view(mut self, view: ViewParams) -> Self {
        self.view = view;
        self
    }

    pub fn cursor(mut self, cursor: Vec3) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn active(mut self, group: usize, element: usize) -> Self {
        self.active = Some((group, element));
        self
    }

    /// Register a named orientation basis after the global slot.
    pub fn orientation(mut self, name: impl Into<String>, basis: Mat3) -> Self {
        self.orientations.push((name.into(), basis));
        self
    }

    pub fn settings(mut self, settings: SettingsHandle) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn snap_query(
        mut self,
        query: std::sync::Arc<dyn SnapQuery + Send + Sync>,
    ) -> Self {
        self.snap_query = Some(query);
        self
    }

    /// Pointer position at invocation, in window pixels.
    pub fn mval(mut self, mval: Vec2) -> Self {
        self.mval = mval;
        self
    }

    pub fn build(self) -> Result<TransformSession> {
        let transformable: usize = self
            .groups
            .iter()
            .flat_map(|g| g.elements.iter())
            .filter(|el| el.is_transformed())
            .count();
        if transformable == 0 {
            return Err(TransformError::NothingToTransform);
        }
        let selected: usize = self.groups.iter().map(|g| g.selected_count()).sum();
        if selected == 0 {
            // Proportional editing can move unselected elements, but only
            // around at least one selected seed.
            return Err(TransformError::NoSelectedElement);
        }

        let settings = self.settings.unwrap_or_else(|| {
            settings_handle(TransformSettings::default())
        });
        let (prop_size, prop_falloff, precision_scale, angle_scale, snap_interval) = {
            let s = settings.read();
            (
                s.prop_size,
                s.prop_falloff,
                s.linear_precision_scale,
                s.angle_precision_scale,
                s.snap_interval_ms,
            )
        };

        let mut session = TransformSession {
            mode: self.mode,
            state: SessionState::Starting,
            redraw: Redraw::Hard,
            flags: self.flags,
            modifiers: ModifierFlags::default(),
            space: self.space,
            target: self.target,
            pivot: self.pivot,
            groups: self.groups,
            center_global: Vec3::ZERO,
            center2d: Vec2::ZERO,
            cursor: self.cursor,
            active: self.active,
            view: self.view,
            mval_start: self.mval,
            mval: self.mval,
            orientations: self.orientations,
            orientation_index: 0,
            con: AxisConstraint::default(),
            snap: SnapContext::default()
                .with_interval(std::time::Duration::from_millis(snap_interval)),
            snap_query: self.snap_query,
            pointer: PointerInput::new(InputMode::None, Vec2::ZERO, self.mval)
                .with_precision_factor(precision_scale)
                .with_angle_precision_factor(angle_scale),
            num: NumericInput::default(),
            prop_size,
            prop_falloff,
            values: [0.0; 4],
            values_final: [0.0; 4],
            axis: Vec3::Z,
            axis_orig: Vec3::Z,
            custom_vecs: [Vec3::ZERO; 3],
            settings,
            rng: Lcg::default(),
            header: String::new(),
        };

        session.recalc_center();
        session.pointer = PointerInput::new(InputMode::None, session.center2d, self.mval)
            .with_precision_factor(precision_scale)
            .with_angle_precision_factor(angle_scale);
        session.recalc_prop_factors();

        debug!(
            mode = %session.mode,
            groups = session.groups.len(),
            elements = session.total_elements(),
            "transform session built"
        );
        Ok(session)
    }
}
