//! Backend-neutral input events and overlay routing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Space,
    Return,
    Backspace,
    Tab,
    Left,
    Right,
    Up,
    Down,
    /// Printable key, lowercased
    Char(char),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonKind {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    KeyUp(Key),
    MouseMove {
        x: i32,
        y: i32,
    },
    MouseDown {
        x: i32,
        y: i32,
        button: MouseButtonKind,
    },
    MouseUp {
        x: i32,
        y: i32,
        button: MouseButtonKind,
    },
}

/// Something drawn above the scene that may consume input first.
pub trait Overlay {
    /// Return true to consume the event so the application never sees it
    fn claims(&mut self, event: &InputEvent) -> bool;
}

/// Offer every event to `overlay` and return the ones it left alone,
/// in their original order.
pub fn route_events<O>(
    events: impl IntoIterator<Item = InputEvent>,
    overlay: &mut O,
) -> Vec<InputEvent>
where
    O: Overlay + ?Sized,
{
    events.into_iter().filter(|e| !overlay.claims(e)).collect()
}
