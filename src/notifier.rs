use crate::*;

/// Observer for the engine's two outward effects.
///
/// `highlight_changed` always carries the full current highlight set, never a
/// delta. `state_changed` carries nothing; the host re-reads whatever public
/// state it renders. Callbacks must not call back into the engine.
pub trait Notifier {
    fn highlight_changed(&mut self, cells: &[Cell]);
    fn state_changed(&mut self);
}

/// Notifier that ignores every event, for headless hosts and tests.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn highlight_changed(&mut self, _cells: &[Cell]) {}

    fn state_changed(&mut self) {}
}
