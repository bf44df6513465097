use crate::display::Display;

/// Host-side hooks, called synchronously at the end of
/// [`Interpreter::tick_with`](crate::Interpreter::tick_with).
///
/// Both methods default to doing nothing, so a host only implements what it
/// consumes. Hosts that prefer polling can ignore this trait and use
/// `should_present_frame` and `is_sound_active` instead.
pub trait Frontend {
    /// A draw happened during the tick.
    fn frame_ready(&mut self, _display: &Display) {}

    /// The buzzer switched on or off during the tick.
    fn sound_state_changed(&mut self, _active: bool) {}
}

/// Discards every notification.
pub struct Headless;

impl Frontend for Headless {}
