//! Transform notifications
//!
//! Listeners are invoked in subscription order. A listener asks to be removed
//! by returning [`ListenerAction::Remove`]; removals are collected during the
//! dispatch loop and applied once it completes, so the list is never mutated
//! while it is being iterated.

use glam::Mat4;

/// Identifies a subscribed listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What a listener wants after being notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    /// Stay subscribed
    Keep,
    /// Unsubscribe after this dispatch
    Remove,
}

type Listener = Box<dyn FnMut(&Mat4) -> ListenerAction>;

/// A list of model matrix listeners
#[derive(Default)]
pub struct TransformEvent {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for TransformEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformEvent")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TransformEvent {
    /// Create an empty event
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener that stays until removed with [`Self::remove_listener`]
    pub fn add_listener(&mut self, mut listener: impl FnMut(&Mat4) + 'static) -> ListenerId {
        self.add_listener_with(move |matrix| {
            listener(matrix);
            ListenerAction::Keep
        })
    }

    /// Subscribe a listener that decides after each notification whether to stay
    pub fn add_listener_with(
        &mut self,
        listener: impl FnMut(&Mat4) -> ListenerAction + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe a listener. Returns false if it was not subscribed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Notify every listener
    pub fn raise(&mut self, matrix: &Mat4) {
        let mut to_remove = Vec::new();
        for (index, (_, listener)) in self.listeners.iter_mut().enumerate() {
            if listener(matrix) == ListenerAction::Remove {
                to_remove.push(index);
            }
        }
        // Indices are ascending; remove from the back so earlier ones stay valid.
        for index in to_remove.into_iter().rev() {
            self.listeners.remove(index);
        }
    }

    /// Number of subscribed listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;

    #[test]
    fn test_listeners_receive_matrix() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut event = TransformEvent::new();
        let sink = seen.clone();
        event.add_listener(move |m| sink.borrow_mut().push(m.w_axis.truncate()));

        event.raise(&Mat4::from_translation(Vec3::X));
        event.raise(&Mat4::from_translation(Vec3::Y));
        assert_eq!(*seen.borrow(), vec![Vec3::X, Vec3::Y]);
    }

    #[test]
    fn test_removal_is_deferred_to_end_of_dispatch() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut event = TransformEvent::new();

        for name in ["once", "always", "twice"] {
            let calls = calls.clone();
            let mut count = 0;
            event.add_listener_with(move |_| {
                count += 1;
                calls.borrow_mut().push(name);
                match (name, count) {
                    ("once", _) => ListenerAction::Remove,
                    ("twice", 2) => ListenerAction::Remove,
                    _ => ListenerAction::Keep,
                }
            });
        }

        event.raise(&Mat4::IDENTITY);
        assert_eq!(event.len(), 2);
        event.raise(&Mat4::IDENTITY);
        assert_eq!(event.len(), 1);
        event.raise(&Mat4::IDENTITY);

        assert_eq!(
            *calls.borrow(),
            vec!["once", "always", "twice", "always", "twice", "always"]
        );
    }

    #[test]
    fn test_remove_listener_by_id() {
        let mut event = TransformEvent::new();
        let a = event.add_listener(|_| {});
        let b = event.add_listener(|_| {});
        assert!(event.remove_listener(a));
        assert!(!event.remove_listener(a));
        assert_eq!(event.len(), 1);
        assert!(event.remove_listener(b));
        assert!(event.is_empty());
    }
}
