//! User Interaction
//!
//! Simulated user input. Each helper mutates the control the way a browser
//! would and dispatches the same events, in the same order.

use crate::{DomEvent, DomTree, NodeId};

/// Type `text` at the end of a text-like control, one `input` event per
/// character
pub fn type_text(tree: &mut DomTree, control: NodeId, text: &str) {
    for ch in text.chars() {
        let mut value = tree.value(control);
        value.push(ch);
        tree.set_value(control, &value);
        tree.dispatch_event(DomEvent::input(control));
    }
}

/// Click a checkbox: toggles checkedness, then fires `click`, `input` and
/// `change`
pub fn toggle_checkbox(tree: &mut DomTree, checkbox: NodeId) {
    let checked = tree.checked(checkbox);
    tree.set_checked(checkbox, !checked);
    tree.dispatch_event(DomEvent::click(checkbox));
    tree.dispatch_event(DomEvent::input(checkbox));
    tree.dispatch_event(DomEvent::change(checkbox));
}

/// Click a radio: checks it and unchecks the rest of its group. Events
/// fire only if the radio was not already checked.
pub fn pick_radio(tree: &mut DomTree, radio: NodeId) {
    tree.dispatch_event(DomEvent::click(radio));
    if tree.checked(radio) {
        return;
    }
    tree.check_radio(radio);
    tree.dispatch_event(DomEvent::input(radio));
    tree.dispatch_event(DomEvent::change(radio));
}

/// Choose an option of a select by value
pub fn choose_option(tree: &mut DomTree, select: NodeId, value: &str) {
    tree.set_value(select, value);
    tree.dispatch_event(DomEvent::input(select));
    tree.dispatch_event(DomEvent::change(select));
}

/// Script assignment to a hidden input's value. No event fires; only
/// attribute observers notice.
pub fn set_hidden_value(tree: &mut DomTree, hidden: NodeId, value: &str) {
    tree.set_value(hidden, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DomEventType, MutationRecord};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn control(tree: &mut DomTree, ty: &str, name: &str) -> NodeId {
        let id = tree.create_element("input");
        tree.set_attribute(id, "type", ty);
        tree.set_attribute(id, "name", name);
        tree.append_child(tree.root(), id);
        id
    }

    fn count(tree: &mut DomTree, node: NodeId, ty: DomEventType) -> Rc<RefCell<usize>> {
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        tree.add_event_listener(node, ty, Rc::new(move |_: &mut DomEvent, _: &DomTree| {
            *counter.borrow_mut() += 1;
        }));
        hits
    }

    #[test]
    fn test_type_text_fires_per_character() {
        let mut tree = DomTree::new();
        let input = control(&mut tree, "text", "t");
        let inputs = count(&mut tree, input, DomEventType::Input);

        type_text(&mut tree, input, "hello");
        assert_eq!(tree.value(input), "hello");
        assert_eq!(*inputs.borrow(), 5);
    }

    #[test]
    fn test_pick_radio_unchecks_group() {
        let mut tree = DomTree::new();
        let a = control(&mut tree, "radio", "g");
        let b = control(&mut tree, "radio", "g");
        let other = control(&mut tree, "radio", "h");
        tree.set_checked(other, true);
        let changes = count(&mut tree, b, DomEventType::Change);

        pick_radio(&mut tree, a);
        pick_radio(&mut tree, b);
        assert!(!tree.checked(a));
        assert!(tree.checked(b));
        assert!(tree.checked(other));
        assert_eq!(*changes.borrow(), 1);

        pick_radio(&mut tree, b);
        assert_eq!(*changes.borrow(), 1);
    }

    #[test]
    fn test_toggle_checkbox() {
        let mut tree = DomTree::new();
        let cb = control(&mut tree, "checkbox", "c");
        let changes = count(&mut tree, cb, DomEventType::Change);

        toggle_checkbox(&mut tree, cb);
        assert!(tree.checked(cb));
        toggle_checkbox(&mut tree, cb);
        assert!(!tree.checked(cb));
        assert_eq!(*changes.borrow(), 2);
    }

    #[test]
    fn test_hidden_value_only_notifies_observers() {
        let mut tree = DomTree::new();
        let hidden = control(&mut tree, "hidden", "h");
        let inputs = count(&mut tree, hidden, DomEventType::Input);
        let seen = Rc::new(RefCell::new(0));
        let counter = seen.clone();
        tree.observe(
            hidden,
            crate::MutationObserverInit::attributes(),
            Rc::new(move |_: &[MutationRecord], _: &DomTree| *counter.borrow_mut() += 1),
        );

        set_hidden_value(&mut tree, hidden, "v");
        assert_eq!(*inputs.borrow(), 0);
        assert_eq!(*seen.borrow(), 1);
    }
}
