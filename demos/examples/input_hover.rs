// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover transitions as a mouse crosses a small scene.
//!
//! A sidebar and a panel sit side by side; the panel holds a button. Moving
//! from the sidebar onto the button exits the sidebar, then enters the panel
//! and the button, outermost first.
//!
//! Run:
//! - `cargo run -p understory_demos --example input_hover`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use understory_input::{EventContext, EventKind, Input, NodeId, SceneEvent, SceneTree, listener_fn};

fn main() {
    let mut scene = SceneTree::new(Rect::new(0.0, 0.0, 400.0, 300.0));
    let root = scene.root();
    let sidebar = scene.insert(root, Rect::new(0.0, 0.0, 100.0, 300.0)).unwrap();
    let panel = scene.insert(root, Rect::new(100.0, 0.0, 400.0, 300.0)).unwrap();
    let button = scene.insert(panel, Rect::new(150.0, 50.0, 250.0, 90.0)).unwrap();

    let names = [
        (root, "root"),
        (sidebar, "sidebar"),
        (panel, "panel"),
        (button, "button"),
    ];
    let name_of = move |node: Option<NodeId>| {
        names
            .iter()
            .find(|(id, _)| Some(*id) == node)
            .map_or("-", |(_, name)| *name)
    };

    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&log);
    let mut input = Input::new(scene);
    input.add_display_listener(listener_fn(
        move |kind, event: &mut SceneEvent<'_, NodeId>| {
            if kind != EventKind::Move {
                sink.borrow_mut()
                    .push(format!("{kind} {}", name_of(event.target())));
            }
        },
    ));

    input.mouse_move(Point::new(50.0, 150.0), &mut EventContext::new(0));
    println!("== Onto the sidebar ==");
    for line in log.borrow_mut().drain(..) {
        println!("  {line}");
    }

    input.mouse_move(Point::new(200.0, 70.0), &mut EventContext::new(16));
    let second: Vec<String> = log.borrow_mut().drain(..).collect();
    println!("== Onto the button ==");
    for line in &second {
        println!("  {line}");
    }

    assert_eq!(
        second,
        [
            "out sidebar",
            "exit sidebar",
            "enter panel",
            "enter button",
            "over button"
        ]
    );
}
