//! The modal loop.
//!
//! A [`ModalRunner`] owns one session and drives it with raw events until
//! the operation confirms or cancels. Event precedence per event: numeric
//! capture, then timer, then pointer motion, then keymap actions, then the
//! kernel's own keys.

use glam::Mat3;
use tracing::{debug, info};

use xformkit_core::constraint::{AxisConstraint, ConstraintCycle};
use xformkit_core::event::{ModalAction, RawEvent};
use xformkit_core::flags::{ModifierFlags, SessionFlags};
use xformkit_core::numinput::NumericInput;
use xformkit_core::observer::{ExitCode, Redraw, SessionObserver};
use xformkit_core::session::{SessionState, TransformSession};
use xformkit_core::{ModeKind, Result, TransformError};
use xformkit_modes::{kernel_for, ModeKernel};

/// Modes reachable by a mid-modal switch key.
const SWITCHABLE: [ModeKind; 6] = [
    ModeKind::Translate,
    ModeKind::Rotate,
    ModeKind::Trackball,
    ModeKind::Resize,
    ModeKind::EdgeSlide,
    ModeKind::VertSlide,
];

pub struct ModalRunner<O: SessionObserver> {
    session: TransformSession,
    kernel: &'static dyn ModeKernel,
    observer: O,
    /// Constraint key state: which axis key is cycling, whether it is a
    /// plane, and where in the cycle it sits.
    con_cycle: Option<(usize, bool, ConstraintCycle)>,
}

impl<O: SessionObserver> ModalRunner<O> {
    /// Bind a kernel to the session and run its init, falling back along
    /// the slide chain when topology is missing.
    pub fn new(mut session: TransformSession, observer: O) -> Result<Self> {
        let mode = session.mode;
        let kernel = init_with_fallback(&mut session, mode)?;
        let mut runner = Self {
            session,
            kernel,
            observer,
            con_cycle: None,
        };
        runner.bind_inputs();
        runner.seed_snap_source();
        if runner.session.mode.is_single_shot() {
            runner.reapply();
        }
        Ok(runner)
    }

    pub fn session(&self) -> &TransformSession {
        &self.session
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    fn bind_inputs(&mut self) {
        let t = &mut self.session;
        t.pointer.set_mode(self.kernel.input_mode(), t.mval);
        t.num = NumericInput::new(self.kernel.value_count(), self.kernel.num_flags())
            .with_unit(self.kernel.num_unit());
    }

    /// Feed one event through the loop. Returns `StillRunning` until a
    /// confirm or cancel lands.
    pub fn handle_event(&mut self, event: RawEvent) -> ExitCode {
        self.session.redraw = Redraw::Nothing;

        match event {
            RawEvent::Key(ch) => self.handle_key(ch),
            RawEvent::Timer => self.handle_timer(),
            RawEvent::Pointer(mval) => self.handle_pointer(mval),
            RawEvent::Modal(action) => self.handle_modal(action),
        }

        if self.session.redraw >= Redraw::Hard {
            self.observer.recalc(&self.session.groups);
        }
        if self.session.redraw >= Redraw::Soft {
            let header = self.session.header.clone();
            self.observer.report(&header);
        }

        match self.session.state {
            SessionState::Confirm => {
                self.finish();
                ExitCode::Finished
            }
            SessionState::Cancel => {
                self.abort();
                ExitCode::Cancelled
            }
            _ => ExitCode::StillRunning,
        }
    }

    fn handle_key(&mut self, ch: char) {
        // Numeric capture has first claim on unresolved keys.
        if self.session.num.handle_char(ch) {
            self.reapply();
            return;
        }
        let redraw = self.kernel.handle_event(&mut self.session, &RawEvent::Key(ch));
        if redraw > Redraw::Nothing {
            self.reapply();
            self.session.redraw = self.session.redraw.combine(redraw);
        }
    }

    fn handle_timer(&mut self) {
        // Re-run the scene snap with the pointer at rest; geometry may have
        // streamed in since the last query.
        if self.update_snap() {
            self.reapply();
        }
    }

    fn handle_pointer(&mut self, mval: glam::Vec2) {
        self.session.mval = mval;
        if self.session.state == SessionState::Starting {
            self.session.state = SessionState::Running;
        }
        self.update_snap();
        let view = self.session.view;
        self.session.values = {
            let shaped = self.session.pointer.apply(&view, mval);
            [shaped[0], shaped[1], shaped[2], 0.0]
        };
        self.reapply();
    }

    fn handle_modal(&mut self, action: ModalAction) {
        match action {
            ModalAction::Confirm => self.session.state = SessionState::Confirm,
            ModalAction::Cancel => self.session.state = SessionState::Cancel,
            ModalAction::AxisX => self.cycle_constraint(0, false),
            ModalAction::AxisY => self.cycle_constraint(1, false),
            ModalAction::AxisZ => self.cycle_constraint(2, false),
            ModalAction::PlaneX => self.cycle_constraint(0, true),
            ModalAction::PlaneY => self.cycle_constraint(1, true),
            ModalAction::PlaneZ => self.cycle_constraint(2, true),
            ModalAction::ClearConstraint => {
                self.session.con.clear();
                self.con_cycle = None;
                self.reapply();
            }
            ModalAction::SwitchTranslate => self.switch_mode(ModeKind::Translate),
            ModalAction::SwitchRotate => self.switch_mode(ModeKind::Rotate),
            ModalAction::SwitchResize => self.switch_mode(ModeKind::Resize),
            ModalAction::SwitchTrackball => self.switch_mode(ModeKind::Trackball),
            ModalAction::SnapToggle => {
                self.session.snap.enabled = !self.session.snap.enabled;
                self.reapply();
            }
            ModalAction::SnapInvertOn => {
                self.session.modifiers.set(ModifierFlags::SNAP_INVERT);
                self.update_snap();
                self.reapply();
            }
            ModalAction::SnapInvertOff => {
                self.session.modifiers.clear(ModifierFlags::SNAP_INVERT);
                self.reapply();
            }
            ModalAction::SnapAddPoint => {
                self.session.snap.add_point();
                self.reapply();
            }
            ModalAction::SnapRemovePoint => {
                self.session.snap.remove_point();
                self.reapply();
            }
            ModalAction::PrecisionOn => {
                self.session.modifiers.set(ModifierFlags::PRECISION);
                self.session.pointer.set_precision(true);
            }
            ModalAction::PrecisionOff => {
                self.session.modifiers.clear(ModifierFlags::PRECISION);
                self.session.pointer.set_precision(false);
            }
            ModalAction::PropSizeUp => {
                self.session.resize_prop_radius(true);
                self.reapply();
            }
            ModalAction::PropSizeDown => {
                self.session.resize_prop_radius(false);
                self.reapply();
            }
            ModalAction::AlternateToggle => {
                self.session.flags.toggle(SessionFlags::ALT_TRANSFORM);
                self.reapply();
            }
            ModalAction::CycleOrientation => {
                self.session.cycle_orientation();
                if self.session.con.applied {
                    let basis = self.session.orientation_basis();
                    self.session.con.set_basis(basis);
                }
                self.reapply();
            }
        }
    }

    /// Pick the snap source point on the selection per the source policy.
    fn seed_snap_source(&mut self) {
        use xformkit_core::snap::SnapSourcePolicy;
        let t = &mut self.session;
        let source = match t.snap.source_policy {
            SnapSourcePolicy::Active => t
                .active
                .and_then(|(g, e)| {
                    let group = t.groups.get(g)?;
                    let el = group.elements.get(e)?;
                    Some(group.to_global(el.center))
                })
                .unwrap_or(t.center_global),
            // Closest is refined against the target as it resolves; until
            // then the pivot stands in.
            SnapSourcePolicy::Closest
            | SnapSourcePolicy::Center
            | SnapSourcePolicy::Median => t.center_global,
        };
        t.snap.set_source(source);
    }

    fn update_snap(&mut self) -> bool {
        let Some(query) = self.session.snap_query.clone() else {
            return false;
        };
        let view = self.session.view;
        let mval = self.session.mval;
        let changed = self.session.snap.update(query.as_ref(), &view, mval);
        if changed {
            self.refine_snap_source();
        }
        changed
    }

    /// Under the closest policy, re-pick the source as the selected
    /// element nearest the resolved target.
    fn refine_snap_source(&mut self) {
        use xformkit_core::snap::SnapSourcePolicy;
        let t = &mut self.session;
        if t.snap.source_policy != SnapSourcePolicy::Closest {
            return;
        }
        let target = t.snap.target;
        let mut best: Option<(f32, glam::Vec3)> = None;
        for group in &t.groups {
            for el in &group.elements {
                if !el.flags.is_selected() {
                    continue;
                }
                let co = group.to_global(el.co_orig);
                let d = (co - target).length_squared();
                if best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, co));
                }
            }
        }
        if let Some((_, co)) = best {
            t.snap.set_source(co);
        }
    }

    fn reapply(&mut self) {
        self.kernel.apply(&mut self.session);
        self.session.redraw = self.session.redraw.combine(Redraw::Hard);
    }

    /// X/Y/Z (and shift variants): repeated presses walk the session's
    /// orientation slots in order, then local space, then release.
    fn cycle_constraint(&mut self, axis: usize, plane: bool) {
        if self.session.flags.has(SessionFlags::NO_CONSTRAINT) {
            return;
        }
        let slots = self.session.orientations.len().max(1);
        let cycle = match self.con_cycle {
            Some((a, p, c)) if a == axis && p == plane => c.next(slots),
            _ => ConstraintCycle::first(),
        };
        self.con_cycle = Some((axis, plane, cycle));

        let axis_name = ["X", "Y", "Z"][axis];
        match cycle {
            ConstraintCycle::Off => {
                self.session.con.clear();
                self.con_cycle = None;
            }
            ConstraintCycle::Orientation(slot) => {
                let (scope, basis) = self
                    .session
                    .orientations
                    .get(slot)
                    .map(|(name, m)| (name.clone(), *m))
                    .unwrap_or_else(|| ("global".into(), Mat3::IDENTITY));
                self.set_constraint(basis, axis, plane, &scope, axis_name);
                self.session.con.orientation_index = slot;
            }
            ConstraintCycle::Local => {
                let basis = self
                    .session
                    .groups
                    .first()
                    .map(|g| g.mat3)
                    .unwrap_or(Mat3::IDENTITY);
                self.set_constraint(basis, axis, plane, "local", axis_name);
                self.session.con.local = true;
            }
        }
        self.reapply();
    }

    fn set_constraint(&mut self, basis: Mat3, axis: usize, plane: bool, scope: &str, name: &str) {
        self.session.con = if plane {
            AxisConstraint::plane(basis, axis, format!("locking {scope} {name}"))
        } else {
            AxisConstraint::single_axis(basis, axis, format!("along {scope} {name}"))
        };
    }

    /// Restore everything and restart under another mode. Only the pointer
    /// position survives; constraints, numeric capture and mode flags are
    /// reset.
    pub fn switch_mode(&mut self, kind: ModeKind) {
        if kind == self.session.mode || !SWITCHABLE.contains(&kind) {
            return;
        }
        debug!(from = %self.session.mode, to = %kind, "mode switch");
        self.reset_for_mode(kind);
        match init_with_fallback(&mut self.session, kind) {
            Ok(kernel) => {
                self.kernel = kernel;
                self.bind_inputs();
                self.reapply();
            }
            Err(err) => {
                // Setup errors cannot happen on an already-built session;
                // stay in the current mode.
                debug!(%err, "mode switch rejected");
                let current = self.session.mode;
                self.reset_for_mode(current);
                if self.kernel.init(&mut self.session).is_ok() {
                    self.bind_inputs();
                    self.reapply();
                }
            }
        }
    }

    fn reset_for_mode(&mut self, kind: ModeKind) {
        let t = &mut self.session;
        t.restore_all();
        t.flags.reset_mode_restrictions();
        t.con.clear();
        t.num.reset();
        t.custom_vecs = [glam::Vec3::ZERO; 3];
        t.header.clear();
        self.con_cycle = None;
        t.mode = kind;
    }

    fn finish(&mut self) {
        info!(mode = %self.session.mode, "transform confirmed");
        self.observer.commit(&self.session.groups);
    }

    fn abort(&mut self) {
        info!(mode = %self.session.mode, "transform cancelled");
        self.session.restore_all();
        self.observer.recalc(&self.session.groups);
        self.observer.discard(&self.session.groups);
    }

    /// Consume the runner and hand the final session back to the host.
    pub fn into_session(self) -> TransformSession {
        self.session
    }
}

/// Run a kernel's init, walking the fallback chain (edge slide, vert
/// slide, translate) when the requested mode cannot start. The session is
/// fully reset between attempts.
fn init_with_fallback(
    session: &mut TransformSession,
    kind: ModeKind,
) -> Result<&'static dyn ModeKernel> {
    let mut attempt = kind;
    loop {
        session.mode = attempt;
        session.flags.reset_mode_restrictions();
        session.custom_vecs = [glam::Vec3::ZERO; 3];
        let kernel = kernel_for(attempt);
        match kernel.init(session) {
            Ok(()) => return Ok(kernel),
            Err(err) if err.is_mode_fallback() => {
                let Some(next) = fallback_of(attempt) else {
                    return Err(err);
                };
                debug!(from = %attempt, to = %next, %err, "mode fallback");
                attempt = next;
            }
            Err(err) => return Err(err),
        }
    }
}

fn fallback_of(kind: ModeKind) -> Option<ModeKind> {
    match kind {
        ModeKind::EdgeSlide => Some(ModeKind::VertSlide),
        ModeKind::VertSlide => Some(ModeKind::Translate),
        _ => None,
    }
}

/// Build a runner directly from a mode and a prepared session, mirroring
/// how hosts invoke a transform operator.
pub fn start<O: SessionObserver>(session: TransformSession, observer: O) -> Result<ModalRunner<O>> {
    if session.total_elements() == 0 {
        return Err(TransformError::NothingToTransform);
    }
    ModalRunner::new(session, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use xformkit_core::element::TransformElement;
    use xformkit_core::group::ElementGroup;
    use xformkit_core::observer::NullObserver;

    fn simple_session(mode: ModeKind) -> TransformSession {
        TransformSession::builder(mode)
            .group(ElementGroup::new(
                "obj",
                vec![TransformElement::at(Vec3::ZERO)],
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_slide_falls_back_to_translate() {
        let session = simple_session(ModeKind::EdgeSlide);
        let runner = ModalRunner::new(session, NullObserver).unwrap();
        assert_eq!(runner.session().mode, ModeKind::Translate);
    }

    #[test]
    fn test_constraint_cycle_global_local_off() {
        let session = simple_session(ModeKind::Translate);
        let mut runner = ModalRunner::new(session, NullObserver).unwrap();
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(runner.session().con.applied);
        assert!(runner.session().con.label.contains("global"));
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(runner.session().con.label.contains("local"));
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(!runner.session().con.applied);
    }

    #[test]
    fn test_constraint_cycle_walks_orientation_slots() {
        let session = TransformSession::builder(ModeKind::Translate)
            .orientation("view", Mat3::from_rotation_z(0.5))
            .orientation("normal", Mat3::from_rotation_x(0.5))
            .group(ElementGroup::new(
                "obj",
                vec![TransformElement::at(Vec3::ZERO)],
            ))
            .build()
            .unwrap();
        let mut runner = ModalRunner::new(session, NullObserver).unwrap();
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(runner.session().con.label.contains("global"));
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(runner.session().con.label.contains("view"));
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(runner.session().con.label.contains("normal"));
        assert_eq!(runner.session().con.orientation_index, 2);
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(runner.session().con.local);
        runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
        assert!(!runner.session().con.applied);
    }

    #[test]
    fn test_switch_resets_constraint_and_values() {
        let session = simple_session(ModeKind::Translate);
        let mut runner = ModalRunner::new(session, NullObserver).unwrap();
        runner.handle_event(RawEvent::Modal(ModalAction::AxisY));
        runner.handle_event(RawEvent::Pointer(Vec2::new(600.0, 400.0)));
        runner.handle_event(RawEvent::Modal(ModalAction::SwitchRotate));
        let t = runner.session();
        assert_eq!(t.mode, ModeKind::Rotate);
        assert!(!t.con.applied);
        assert_eq!(t.groups[0].elements[0].co, t.groups[0].elements[0].co_orig);
    }

    #[test]
    fn test_switch_to_unlisted_mode_ignored() {
        let session = simple_session(ModeKind::Translate);
        let mut runner = ModalRunner::new(session, NullObserver).unwrap();
        runner.switch_mode(ModeKind::Bend);
        assert_eq!(runner.session().mode, ModeKind::Translate);
    }
}
