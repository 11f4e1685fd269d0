// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Held-key tracking alongside accessibility key events.
//!
//! Key events always update the key tracker. When an element of the
//! accessibility mirror has focus they are also dispatched along its scene path.
//! A window blur forgets every held key.
//!
//! Run:
//! - `cargo run -p understory_demos --example input_keyboard`

use kurbo::Rect;
use understory_input::{
    AccessibilityTree, ElementId, EventContext, EventKind, Input, NodeId, Path, SceneEvent,
    SceneTree, listener_fn,
};
use understory_keyboard::{KeyboardEvent, Modifiers, codes};

struct Mirror {
    field: Path<NodeId>,
}

impl AccessibilityTree<NodeId> for Mirror {
    fn trail_from_unique_id(&self, unique_id: &str) -> Option<Path<NodeId>> {
        (unique_id == "name-field").then(|| self.field.clone())
    }

    fn is_element_under_mirror(&self, element: ElementId) -> bool {
        element == ElementId(1)
    }
}

fn main() {
    let mut scene = SceneTree::new(Rect::new(0.0, 0.0, 200.0, 100.0));
    let field = scene
        .insert(scene.root(), Rect::new(10.0, 10.0, 190.0, 40.0))
        .unwrap();
    let field_path = scene.path_to_root(field).unwrap();
    scene.add_listener(
        field,
        listener_fn(|kind, event: &mut SceneEvent<'_, NodeId>| {
            if kind == EventKind::KeyDown {
                let code = event.context().keyboard.as_ref().map(|k| k.code.clone());
                println!("field saw {kind}: {code:?}");
            }
        }),
    );

    let mut input = Input::new(scene);
    input.set_accessibility_tree(Mirror { field: field_path });
    input
        .key_state_mut()
        .on_state_changed(|event| println!("key state changed by {:?}", event.map(|e| &e.code)));

    let shift_a = KeyboardEvent::new("KeyA", Modifiers::SHIFT);
    input.key_down(Some("name-field"), &shift_a, &mut EventContext::new(0));
    input.key_state_mut().step(120.0);

    let keys = input.key_state();
    println!("held: {:?}", keys.keys_down());
    assert!(keys.shift_down());
    assert!(keys.are_keys_down(&["KeyA", codes::SHIFT_LEFT]));
    assert_eq!(keys.time_down_for_key("KeyA"), 120.0);

    input.window_blur(&mut EventContext::new(130));
    println!("after blur: {:?}", input.key_state().keys_down());
    assert!(!input.key_state().keys_are_down());
}
