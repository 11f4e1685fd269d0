// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched touch input with a drag listener on the pointer.
//!
//! Raw events are queued through `batch_action`. The touch start flushes
//! immediately (it is a user gesture); the moves wait for the frame flush.
//! The slider attaches a drag listener to the touch pointer when it goes
//! down; that listener follows the contact until it ends.
//!
//! Run:
//! - `cargo run -p understory_demos --example input_touch`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use understory_input::{
    EventContext, EventKind, Input, InputAction, InputListener, NodeId, PointerKind, SceneEvent,
    SceneTree, listener_fn,
};

#[derive(Default)]
struct Drag {
    trail: Vec<Point>,
    interrupted: bool,
}

struct DragListener(Rc<RefCell<Drag>>);

impl InputListener<NodeId> for DragListener {
    fn on_pointer_event(
        &mut self,
        pointer: PointerKind,
        kind: EventKind,
        event: &mut SceneEvent<'_, NodeId>,
    ) {
        if pointer == PointerKind::Touch && kind == EventKind::Move {
            if let Some(point) = event.point() {
                self.0.borrow_mut().trail.push(point);
            }
        }
    }

    fn interrupt(&mut self) {
        self.0.borrow_mut().interrupted = true;
    }
}

fn main() {
    let mut scene = SceneTree::new(Rect::new(0.0, 0.0, 320.0, 480.0));
    let slider = scene
        .insert(scene.root(), Rect::new(20.0, 200.0, 300.0, 240.0))
        .unwrap();

    let drag = Rc::new(RefCell::new(Drag::default()));
    let mut input = Input::new(scene);
    input.connect_listeners();

    // Each touch that lands on the slider takes the drag along with it.
    let grab = Rc::clone(&drag);
    input.scene_mut().add_listener(
        slider,
        listener_fn(move |kind, event: &mut SceneEvent<'_, NodeId>| {
            if kind == EventKind::Down && event.pointer().kind() == PointerKind::Touch {
                event.add_pointer_listener(
                    Rc::new(RefCell::new(DragListener(Rc::clone(&grab)))),
                    true,
                );
            }
        }),
    );

    let batch = |input: &mut Input<NodeId, SceneTree>, action, ms| {
        input
            .batch_action(action, EventContext::new(ms))
            .expect("touch events carry a known pointer type");
    };

    let id = 11;
    batch(
        &mut input,
        InputAction::TouchStart {
            id,
            point: Point::new(40.0, 220.0),
        },
        0,
    );
    let handle = input.pointers().find_by_id(id).expect("touch is alive");
    let touch = input.pointers().get(handle).expect("touch is alive");
    assert!(touch.is_attached());

    for (step, x) in [80.0, 120.0, 160.0].into_iter().enumerate() {
        batch(
            &mut input,
            InputAction::TouchMove {
                id,
                point: Point::new(x, 220.0),
            },
            16 * (step as u64 + 1),
        );
    }
    println!("queued before flush: {}", input.batcher().len());
    input.flush();

    batch(
        &mut input,
        InputAction::TouchEnd {
            id,
            point: Point::new(160.0, 220.0),
        },
        64,
    );

    let drag = drag.borrow();
    println!("drag trail: {:?}", drag.trail);
    println!("pointers left: {}", input.pointers().len());
    assert_eq!(drag.trail.len(), 3);
    assert!(!drag.interrupted);
    assert!(input.pointers().is_empty());
}
