// Copyright 2025 the Reva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A click counter rendered into an in-memory document.
//!
//! This example shows how to:
//! - write a component with local state and an event handler,
//! - drive the engine from a wall-clock idle scheduler,
//! - deliver events through the document and watch the resulting mutations.
//!
//! Run:
//! - `cargo run -p reva_demos --example counter`

use std::time::{Duration, Instant};

use reva::{
    Component, Deadline, Element, Engine, Event, Hooks, IdleScheduler, Props, children,
    create_element,
};
use reva_document::{Document, MutationKinds, NodeType};

/// Deadline at a fixed instant.
#[derive(Clone, Copy, Debug)]
struct WallClock {
    end: Instant,
}

impl Deadline for WallClock {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Hands out `frames` idle periods of `budget` each, back to back.
#[derive(Debug)]
struct Frames {
    budget: Duration,
    frames: usize,
}

impl IdleScheduler for Frames {
    type Deadline = WallClock;

    fn next_idle_period(&mut self) -> Option<WallClock> {
        self.frames = self.frames.checked_sub(1)?;
        Some(WallClock {
            end: Instant::now() + self.budget,
        })
    }
}

fn counter(_: &Props, hooks: &mut Hooks<'_>) -> Element {
    let (count, set_count) = hooks.use_state(1_i32);
    create_element(
        "h1",
        Props::new()
            .on("click", move |_| set_count.update(|c| c + 1))
            .with("style", "user-select: none;"),
        children!["Count: ", count],
    )
}

fn main() {
    let mut doc = Document::new();
    let container = doc.insert(None, NodeType::Element("root".into()));

    let mut engine = Engine::new();
    engine.render(
        Element::component(Component::new(counter), Props::new()),
        container,
    );

    let frame = || Frames {
        budget: Duration::from_millis(5),
        frames: 4,
    };
    engine.run(&mut doc, &mut frame());
    println!("mounted:  {}", doc.to_markup(container));

    for _ in 0..3 {
        let Some(h1) = doc.find_by_tag(container, "h1") else {
            break;
        };
        if let Err(err) = doc.dispatch_event(h1, &Event::new("click")) {
            println!("click failed: {err}");
            break;
        }
        doc.take_mutations();
        engine.run(&mut doc, &mut frame());

        let log = doc.take_mutations();
        println!(
            "clicked:  {}  ({} property changes, {} structural)",
            doc.text_content(container),
            log.count(MutationKinds::PROPERTIES),
            log.count(MutationKinds::STRUCTURE),
        );
    }

    let stats = engine.stats();
    println!(
        "{} units of work, {} commits, {} discarded passes",
        stats.units, stats.commits, stats.discarded
    );
}
