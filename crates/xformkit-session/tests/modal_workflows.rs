//! End-to-end modal workflows: build a session from host-style data, feed
//! events through a runner and assert on what the observer sees.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use proptest::prelude::*;

use xformkit_core::element::TransformElement;
use xformkit_core::event::{ModalAction, RawEvent};
use xformkit_core::flags::{ElementFlags, SessionFlags};
use xformkit_core::group::ElementGroup;
use xformkit_core::observer::{ExitCode, SessionObserver};
use xformkit_core::session::TransformSession;
use xformkit_core::snap::{PointCloudSnapQuery, SnapModeSet};
use xformkit_core::ModeKind;
use xformkit_session::ModalRunner;

/// Observer that records every callback for later assertions.
#[derive(Debug, Default)]
struct RecordingObserver {
    recalcs: usize,
    reports: Vec<String>,
    committed: Option<Vec<Vec3>>,
    discarded: bool,
}

impl RecordingObserver {
    fn coords(groups: &[ElementGroup]) -> Vec<Vec3> {
        groups
            .iter()
            .flat_map(|g| g.elements.iter().map(|el| el.co))
            .collect()
    }
}

impl SessionObserver for RecordingObserver {
    fn recalc(&mut self, _groups: &[ElementGroup]) {
        self.recalcs += 1;
    }

    fn report(&mut self, text: &str) {
        self.reports.push(text.to_string());
    }

    fn commit(&mut self, groups: &[ElementGroup]) {
        self.committed = Some(Self::coords(groups));
    }

    fn discard(&mut self, _groups: &[ElementGroup]) {
        self.discarded = true;
    }
}

fn two_point_session(mode: ModeKind) -> TransformSession {
    // Median pivot lands on the origin.
    TransformSession::builder(mode)
        .group(ElementGroup::new(
            "obj",
            vec![
                TransformElement::at(Vec3::new(1.0, 0.0, 0.0)),
                TransformElement::at(Vec3::new(-1.0, 0.0, 0.0)),
            ],
        ))
        .build()
        .unwrap()
}

#[test]
fn test_typed_translate_commits_moved_coords() {
    let session = two_point_session(ModeKind::Translate);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    assert_eq!(runner.handle_event(RawEvent::Key('2')), ExitCode::StillRunning);
    assert_eq!(
        runner.handle_event(RawEvent::Modal(ModalAction::Confirm)),
        ExitCode::Finished
    );

    let committed = runner.observer().committed.as_ref().unwrap();
    assert!((committed[0] - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    assert!((committed[1] - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    assert!(!runner.observer().discarded);
}

#[test]
fn test_numeric_input_wins_over_pointer_motion() {
    let session = two_point_session(ModeKind::Translate);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    runner.handle_event(RawEvent::Key('1'));
    // A large pointer move must not displace the typed value.
    runner.handle_event(RawEvent::Pointer(Vec2::new(500.0, 0.0)));

    let el = &runner.session().groups[0].elements[0];
    assert!((el.co - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
}

#[test]
fn test_trackball_drag_accumulates_across_events() {
    let session = two_point_session(ModeKind::Trackball);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    runner.handle_event(RawEvent::Pointer(Vec2::new(100.0, 0.0)));
    assert!((runner.session().values_final[1] - 1.0).abs() < 1e-4);

    // One more pixel grows the rotation instead of replacing it.
    runner.handle_event(RawEvent::Pointer(Vec2::new(101.0, 0.0)));
    let angle = runner.session().values_final[1];
    assert!((angle - 1.01).abs() < 1e-4);

    let el = &runner.session().groups[0].elements[0];
    let expected = Vec3::new(angle.cos(), 0.0, -angle.sin());
    assert!((el.co - expected).length() < 1e-4);
}

#[test]
fn test_cancel_restores_bit_exact_and_discards() {
    let orig = Vec3::new(0.1234567, -9.87, 4.4);
    let session = TransformSession::builder(ModeKind::Translate)
        .group(ElementGroup::new("obj", vec![TransformElement::at(orig)]))
        .build()
        .unwrap();
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    runner.handle_event(RawEvent::Pointer(Vec2::new(77.0, -13.0)));
    assert_ne!(runner.session().groups[0].elements[0].co, orig);

    assert_eq!(
        runner.handle_event(RawEvent::Modal(ModalAction::Cancel)),
        ExitCode::Cancelled
    );
    assert_eq!(runner.session().groups[0].elements[0].co, orig);
    assert!(runner.observer().discarded);
    assert!(runner.observer().committed.is_none());
}

#[test]
fn test_header_reported_while_dragging() {
    let session = two_point_session(ModeKind::Translate);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    runner.handle_event(RawEvent::Pointer(Vec2::new(40.0, 0.0)));
    let reports = &runner.observer().reports;
    assert!(reports.iter().any(|r| r.starts_with("Move:")));
    assert!(runner.observer().recalcs > 0);
}

#[test]
fn test_precision_slows_pointer_motion() {
    let session = two_point_session(ModeKind::Translate);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    runner.handle_event(RawEvent::Modal(ModalAction::PrecisionOn));
    runner.handle_event(RawEvent::Pointer(Vec2::new(100.0, 0.0)));

    // Default precision scale is a tenth of raw travel.
    let el = &runner.session().groups[0].elements[0];
    assert!((el.co - Vec3::new(11.0, 0.0, 0.0)).length() < 1e-4);
}

#[test]
fn test_prop_radius_wheel_reweights_factors() {
    let mut group = ElementGroup::new(
        "obj",
        vec![
            TransformElement::at(Vec3::ZERO),
            TransformElement::at(Vec3::new(0.8, 0.0, 0.0)),
        ],
    );
    group.elements[1].flags.clear(ElementFlags::SELECTED);
    group.elements[1].dist = 0.8;
    group.elements[1].rdist = 0.8;

    let session = TransformSession::builder(ModeKind::Translate)
        .flags(SessionFlags::PROP_EDIT)
        .group(group)
        .build()
        .unwrap();
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    let factor_of = |runner: &ModalRunner<RecordingObserver>| {
        let g = &runner.session().groups[0];
        let idx = g
            .elements
            .iter()
            .position(|el| !el.flags.is_selected())
            .unwrap();
        g.elements[idx].factor
    };
    assert!(factor_of(&runner) > 0.0);

    // Three shrink steps take the radius below the element's distance.
    for _ in 0..3 {
        runner.handle_event(RawEvent::Modal(ModalAction::PropSizeDown));
    }
    assert_eq!(factor_of(&runner), 0.0);

    for _ in 0..3 {
        runner.handle_event(RawEvent::Modal(ModalAction::PropSizeUp));
    }
    assert!(factor_of(&runner) > 0.0);
}

#[test]
fn test_vertex_snap_carries_selection_onto_target() {
    let target = Vec3::new(5.0, 6.0, 0.0);
    let query = Arc::new(PointCloudSnapQuery::new(vec![target]));

    let mut session = TransformSession::builder(ModeKind::Translate)
        .group(ElementGroup::new("obj", vec![TransformElement::at(Vec3::ZERO)]))
        .snap_query(query)
        .build()
        .unwrap();
    session.snap.enabled = true;
    session.snap.modes.set(SnapModeSet::VERTEX);

    let screen = session.view.project(target).unwrap();
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();
    runner.handle_event(RawEvent::Pointer(screen));

    let el = &runner.session().groups[0].elements[0];
    assert!((el.co - target).length() < 1e-4);
}

#[test]
fn test_snap_toggle_releases_target() {
    let target = Vec3::new(5.0, 6.0, 0.0);
    let query = Arc::new(PointCloudSnapQuery::new(vec![target]));

    let mut session = TransformSession::builder(ModeKind::Translate)
        .group(ElementGroup::new("obj", vec![TransformElement::at(Vec3::ZERO)]))
        .snap_query(query)
        .build()
        .unwrap();
    session.snap.enabled = true;
    session.snap.modes.set(SnapModeSet::VERTEX);

    let screen = session.view.project(target).unwrap();
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();
    runner.handle_event(RawEvent::Pointer(screen));
    runner.handle_event(RawEvent::Modal(ModalAction::SnapToggle));

    // With snap off the element follows the raw pointer offset again.
    let expected = {
        let t = runner.session();
        t.view.delta_to_world(screen - t.mval_start)
    };
    let el = &runner.session().groups[0].elements[0];
    assert!((el.co - expected).length() < 1e-3);
}

#[test]
fn test_switch_to_resize_then_typed_scale() {
    let session = two_point_session(ModeKind::Translate);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    runner.handle_event(RawEvent::Modal(ModalAction::SwitchResize));
    assert_eq!(runner.session().mode, ModeKind::Resize);

    runner.handle_event(RawEvent::Key('2'));
    assert_eq!(
        runner.handle_event(RawEvent::Modal(ModalAction::Confirm)),
        ExitCode::Finished
    );

    let committed = runner.observer().committed.as_ref().unwrap();
    assert!((committed[0] - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-4);
    assert!((committed[1] - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-4);
}

#[test]
fn test_mirror_waits_for_axis_then_reflects() {
    let session = two_point_session(ModeKind::Mirror);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    // Without an axis the single-shot prompt leaves coordinates untouched.
    assert_eq!(
        runner.session().groups[0].elements[0].co,
        Vec3::new(1.0, 0.0, 0.0)
    );

    runner.handle_event(RawEvent::Modal(ModalAction::AxisX));
    let el = &runner.session().groups[0].elements[0];
    assert!((el.co - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);

    assert_eq!(
        runner.handle_event(RawEvent::Modal(ModalAction::Confirm)),
        ExitCode::Finished
    );
    assert!(runner.observer().committed.is_some());
}

#[test]
fn test_constrained_drag_moves_along_axis_only() {
    let session = two_point_session(ModeKind::Translate);
    let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();

    runner.handle_event(RawEvent::Modal(ModalAction::AxisY));
    runner.handle_event(RawEvent::Pointer(Vec2::new(30.0, 50.0)));

    let el = &runner.session().groups[0].elements[0];
    assert!((el.co.x - 1.0).abs() < 1e-5);
    assert!((el.co.y - 50.0).abs() < 1e-4);
    assert!(el.co.z.abs() < 1e-5);
}

proptest! {
    #[test]
    fn prop_cancel_always_restores_exactly(
        x in -100.0f32..100.0,
        y in -100.0f32..100.0,
        z in -100.0f32..100.0,
        px in -400.0f32..400.0,
        py in -400.0f32..400.0,
    ) {
        let orig = Vec3::new(x, y, z);
        let session = TransformSession::builder(ModeKind::Translate)
            .group(ElementGroup::new("obj", vec![TransformElement::at(orig)]))
            .build()
            .unwrap();
        let mut runner = ModalRunner::new(session, RecordingObserver::default()).unwrap();
        runner.handle_event(RawEvent::Pointer(Vec2::new(px, py)));
        prop_assert_eq!(
            runner.handle_event(RawEvent::Modal(ModalAction::Cancel)),
            ExitCode::Cancelled
        );
        prop_assert_eq!(runner.session().groups[0].elements[0].co, orig);
    }
}
