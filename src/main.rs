//! Headless demo: drives a few modal transforms over a small point grid
//! and prints what a host editor would see.

use glam::{Vec2, Vec3};

use xformkit::{
    init_logging, ElementGroup, ExitCode, ModalAction, ModalRunner, ModeKind, RawEvent,
    SessionObserver, TransformElement, TransformSession,
};

/// Observer that mirrors the header line to the terminal, the way an
/// editor would draw it in its status bar.
#[derive(Default)]
struct ConsoleObserver {
    last_header: String,
}

impl SessionObserver for ConsoleObserver {
    fn report(&mut self, text: &str) {
        if text != self.last_header {
            println!("  [header] {text}");
            self.last_header = text.to_string();
        }
    }

    fn commit(&mut self, groups: &[ElementGroup]) {
        println!("  committed:");
        for group in groups {
            for el in &group.elements {
                println!("    {:>8.3} {:>8.3} {:>8.3}", el.co.x, el.co.y, el.co.z);
            }
        }
    }

    fn discard(&mut self, _groups: &[ElementGroup]) {
        println!("  cancelled, coordinates restored");
    }
}

fn grid() -> ElementGroup {
    let mut elements = Vec::new();
    for x in -1..=1 {
        for y in -1..=1 {
            elements.push(TransformElement::at(Vec3::new(x as f32, y as f32, 0.0)));
        }
    }
    ElementGroup::new("grid", elements)
}

fn run(name: &str, mode: ModeKind, events: &[RawEvent]) -> anyhow::Result<()> {
    println!("{name}");
    let session = TransformSession::builder(mode).group(grid()).build()?;
    let mut runner = ModalRunner::new(session, ConsoleObserver::default())?;
    for event in events {
        if runner.handle_event(*event) != ExitCode::StillRunning {
            break;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    run(
        "drag along Y, then confirm",
        ModeKind::Translate,
        &[
            RawEvent::Modal(ModalAction::AxisY),
            RawEvent::Pointer(Vec2::new(24.0, 60.0)),
            RawEvent::Modal(ModalAction::Confirm),
        ],
    )?;

    run(
        "typed rotation of 45 degrees",
        ModeKind::Rotate,
        &[
            RawEvent::Key('4'),
            RawEvent::Key('5'),
            RawEvent::Modal(ModalAction::Confirm),
        ],
    )?;

    run(
        "scale up, then think better of it",
        ModeKind::Resize,
        &[
            RawEvent::Key('2'),
            RawEvent::Modal(ModalAction::Cancel),
        ],
    )?;

    Ok(())
}
