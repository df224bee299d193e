#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    CreatingHook(usize),
    Loading,
    Computing(usize),
    /// The string with this number scored zero: nothing dark was reachable
    /// from the current hook.
    Saturated(usize),
}

pub trait Verboser {
    fn verbose(&mut self, message: Message);
}

pub struct Silent;

impl Verboser for Silent {
    fn verbose(&mut self, _: Message) {}
}

/// Keeps every message, mostly useful in tests.
#[derive(Default, Debug)]
pub struct Recorder(pub Vec<Message>);

impl Verboser for Recorder {
    fn verbose(&mut self, message: Message) {
        self.0.push(message);
    }
}
