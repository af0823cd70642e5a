//! Snapping.
//!
//! Two layers share this module. Increment snapping quantizes mode values
//! and needs no scene access. Scene snapping resolves a source point on the
//! moving selection and a target point in the scene through a host-provided
//! `SnapQuery`, throttled so responsiveness never depends on scene size.

use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::view::ViewParams;

/// Which snap targets are considered, as a set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapModeSet(u32);

impl SnapModeSet {
    pub const INCREMENT: u32 = 1 << 0;
    pub const GRID: u32 = 1 << 1;
    pub const VERTEX: u32 = 1 << 2;
    pub const EDGE: u32 = 1 << 3;
    pub const FACE: u32 = 1 << 4;
    pub const VOLUME: u32 = 1 << 5;

    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u32) {
        self.0 |= bit;
    }

    /// Any mode that needs scene geometry queries.
    pub fn uses_scene(self) -> bool {
        self.has(Self::VERTEX | Self::EDGE | Self::FACE | Self::VOLUME)
    }
}

/// What the last scene query established.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapStatus(u32);

impl SnapStatus {
    pub const SOURCE_FOUND: u32 = 1 << 0;
    pub const TARGET_FOUND: u32 = 1 << 1;
    pub const MULTI_POINTS: u32 = 1 << 2;

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u32) {
        self.0 |= bit;
    }

    pub fn clear(&mut self, bit: u32) {
        self.0 &= !bit;
    }
}

/// How the source point on the moving selection is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapSourcePolicy {
    /// Selection point closest to the target.
    Closest,
    /// Bounding-box center of the selection.
    Center,
    /// Median of the selection.
    Median,
    /// The active element.
    Active,
}

/// Behavior for elements whose individual surface projection finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectMissPolicy {
    /// Element keeps its unprojected transformed position.
    KeepTransformed,
    /// Element snaps back to its original position.
    Skip,
}

/// One resolved scene point.
#[derive(Debug, Clone, Copy)]
pub struct SnapHit {
    pub co: Vec3,
    pub normal: Vec3,
}

/// Host-side geometry oracle. Queries run against the scene excluding the
/// moving selection.
pub trait SnapQuery {
    fn nearest_vertex(&self, view: &ViewParams, mval: Vec2) -> Option<SnapHit>;

    fn nearest_edge(&self, view: &ViewParams, mval: Vec2) -> Option<SnapHit> {
        let _ = (view, mval);
        None
    }

    fn nearest_face(&self, view: &ViewParams, mval: Vec2) -> Option<SnapHit> {
        let _ = (view, mval);
        None
    }

    /// Ray in world space, for individual projection.
    fn raycast(&self, origin: Vec3, dir: Vec3) -> Option<SnapHit>;
}

#[derive(Debug, Clone)]
pub struct SnapContext {
    pub enabled: bool,
    pub modes: SnapModeSet,
    pub status: SnapStatus,
    pub source_policy: SnapSourcePolicy,
    /// Point on the moving selection, at its original position.
    pub source: Vec3,
    /// Resolved scene point.
    pub target: Vec3,
    /// Surface normal at the target, for align-rotation.
    pub normal: Vec3,
    /// Extra targets accumulated for multi-point averaging.
    points: SmallVec<[Vec3; 8]>,
    last_query: Option<Instant>,
    interval: Duration,
}

impl Default for SnapContext {
    fn default() -> Self {
        Self {
            enabled: false,
            modes: SnapModeSet::new(SnapModeSet::INCREMENT),
            status: SnapStatus::default(),
            source_policy: SnapSourcePolicy::Closest,
            source: Vec3::ZERO,
            target: Vec3::ZERO,
            normal: Vec3::Z,
            points: SmallVec::new(),
            last_query: None,
            interval: Duration::from_millis(10),
        }
    }
}

impl SnapContext {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Geometric snap applies this event: a source plus either a live
    /// target or a recorded multi-point set.
    pub fn valid(&self) -> bool {
        if !self.enabled || !self.status.has(SnapStatus::SOURCE_FOUND) {
            return false;
        }
        self.status.has(SnapStatus::TARGET_FOUND) || self.status.has(SnapStatus::MULTI_POINTS)
    }

    pub fn set_source(&mut self, co: Vec3) {
        self.source = co;
        self.status.set(SnapStatus::SOURCE_FOUND);
    }

    /// Record the current target into the multi-point set.
    pub fn add_point(&mut self) {
        if self.status.has(SnapStatus::TARGET_FOUND) {
            self.points.push(self.target);
            self.status.set(SnapStatus::MULTI_POINTS);
        }
    }

    pub fn remove_point(&mut self) {
        self.points.pop();
        if self.points.is_empty() {
            self.status.clear(SnapStatus::MULTI_POINTS);
        }
    }

    /// Effective target this event. With recorded points, the running
    /// average of the set plus the live target.
    pub fn snap_point(&self) -> Vec3 {
        if self.points.is_empty() {
            return self.target;
        }
        let mut sum = self.target;
        for p in &self.points {
            sum += *p;
        }
        sum / (self.points.len() as f32 + 1.0)
    }

    /// Resolve a scene target under the pointer, at most once per interval.
    /// Returns true when the target changed.
    pub fn update(&mut self, query: &dyn SnapQuery, view: &ViewParams, mval: Vec2) -> bool {
        if !self.enabled || !self.modes.uses_scene() {
            return false;
        }
        if let Some(last) = self.last_query {
            if last.elapsed() < self.interval {
                return false;
            }
        }
        self.last_query = Some(Instant::now());

        let hit = if self.modes.has(SnapModeSet::VERTEX) {
            query.nearest_vertex(view, mval)
        } else {
            None
        }
        .or_else(|| {
            if self.modes.has(SnapModeSet::EDGE) {
                query.nearest_edge(view, mval)
            } else {
                None
            }
        })
        .or_else(|| {
            if self.modes.has(SnapModeSet::FACE) {
                query.nearest_face(view, mval)
            } else {
                None
            }
        });

        match hit {
            Some(hit) => {
                trace!(co = ?hit.co, "snap target resolved");
                self.target = hit.co;
                self.normal = hit.normal;
                self.status.set(SnapStatus::TARGET_FOUND);
                true
            }
            None => {
                self.status.clear(SnapStatus::TARGET_FOUND);
                false
            }
        }
    }

    /// Translation that carries the source onto the snap point.
    pub fn translation(&self) -> Vec3 {
        self.snap_point() - self.source
    }

    /// Scale factor that carries the source onto the snap point, measured
    /// from `center`. `None` when the source sits on the center, where no
    /// finite ratio exists.
    pub fn resize_factor(&self, center: Vec3) -> Option<f32> {
        let d_source = (self.source - center).length();
        if d_source < f32::EPSILON {
            return None;
        }
        Some((self.snap_point() - center).length() / d_source)
    }

    /// Signed angle around `axis` that carries the source onto the snap
    /// point, normalized to (-PI, PI].
    pub fn rotation_angle(&self, center: Vec3, axis: Vec3) -> Option<f32> {
        let a = (self.source - center).reject_from_normalized(axis);
        let b = (self.snap_point() - center).reject_from_normalized(axis);
        if a.length_squared() < f32::EPSILON || b.length_squared() < f32::EPSILON {
            return None;
        }
        let angle = crate::math::signed_angle_around_axis(a, b, axis);
        Some(crate::math::angle_wrap_signed(angle))
    }
}

/// Quantize a value to the nearest increment. Precision selects the fine
/// step. `aspect` rescales the grid for non-uniform pixel spaces.
pub fn increment_snap(value: f32, increment: f32, fine: f32, precision: bool, aspect: f32) -> f32 {
    let step = if precision { fine } else { increment } * aspect;
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Test oracle over a fixed point set.
#[derive(Debug, Default)]
pub struct PointCloudSnapQuery {
    pub points: Vec<Vec3>,
    /// Pixel radius within which a projected point counts as hit.
    pub radius: f32,
}

impl PointCloudSnapQuery {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self {
            points,
            radius: 30.0,
        }
    }
}

impl SnapQuery for PointCloudSnapQuery {
    fn nearest_vertex(&self, view: &ViewParams, mval: Vec2) -> Option<SnapHit> {
        let mut best: Option<(f32, Vec3)> = None;
        for &p in &self.points {
            let Some(screen) = view.project(p) else {
                continue;
            };
            let d = (screen - mval).length();
            if d <= self.radius && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, p));
            }
        }
        best.map(|(_, co)| SnapHit {
            co,
            normal: Vec3::Z,
        })
    }

    fn raycast(&self, origin: Vec3, dir: Vec3) -> Option<SnapHit> {
        // Nearest point within a tube around the ray.
        let mut best: Option<(f32, Vec3)> = None;
        for &p in &self.points {
            let t = (p - origin).dot(dir);
            if t < 0.0 {
                continue;
            }
            let d = (p - (origin + dir * t)).length();
            if d <= 0.5 && best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, p));
            }
        }
        best.map(|(_, co)| SnapHit {
            co,
            normal: Vec3::Z,
        })
    }
}
