use tracing::{error, info, trace};

/// Busy indicator frames, advanced once per poll
pub const THROBBER_FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Receives the user-visible signals of a session.
///
/// `info` and `alert` are each called at most once per finished run; `busy` is
/// cosmetic and may be ignored.
pub trait Notifier: Send + Sync {
    fn busy(&self, _indicator: &str) {}

    fn info(&self, message: &str);

    fn alert(&self, message: &str);
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn busy(&self, indicator: &str) {
        trace!("{}", indicator);
    }

    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn alert(&self, message: &str) {
        error!("{}", message);
    }
}

/// Cycles through [`THROBBER_FRAMES`]
#[derive(Debug, Default)]
pub struct Throbber {
    index: usize,
}

impl Throbber {
    pub fn tick(&mut self) -> String {
        let frame = THROBBER_FRAMES[self.index];
        self.index = (self.index + 1) % THROBBER_FRAMES.len();
        format!("{}: Busy {}", crate::utils::MESSAGE_PREFIX, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throbber_cycles() {
        let mut throbber = Throbber::default();
        let frames: Vec<String> = (0..5).map(|_| throbber.tick()).collect();

        assert!(frames[0].ends_with('◐'));
        assert!(frames[3].ends_with('◒'));
        assert_eq!(frames[0], frames[4]);
    }
}
