use crate::driver::host::{PageHost, SettleTimings};
use crate::error::Result;
use std::time::Duration;

/// How a bounded wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Signalled,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitLimits {
    pub ceiling: Duration,
    pub interval: Duration,
}

impl WaitLimits {
    pub fn new(ceiling: Duration, interval: Duration) -> Self {
        // A zero interval would never advance the clock
        let interval = interval.max(Duration::from_millis(1));
        Self { ceiling, interval }
    }
}

impl From<SettleTimings> for WaitLimits {
    fn from(timings: SettleTimings) -> Self {
        Self::new(timings.change_ceiling, timings.poll_interval)
    }
}

/// Poll `signal` until it fires or the ceiling is reached.
///
/// Elapsed time is the sum of the pauses taken, so the outcome depends only on
/// how many polls the signal needs and not on wall-clock jitter. Host errors
/// raised by the signal end the wait.
pub fn wait_for_signal<H, F>(host: &mut H, limits: WaitLimits, mut signal: F) -> Result<WaitOutcome>
where
    H: PageHost + ?Sized,
    F: FnMut(&H) -> Result<bool>,
{
    let mut waited = Duration::ZERO;

    loop {
        if signal(&*host)? {
            return Ok(WaitOutcome::Signalled);
        }

        if waited >= limits.ceiling {
            return Ok(WaitOutcome::TimedOut);
        }

        host.pause(limits.interval);
        waited += limits.interval;
    }
}

/// Signal that fires once the page HTML differs from `baseline`
pub fn content_changed<H>(baseline: String) -> impl FnMut(&H) -> Result<bool>
where
    H: PageHost + ?Sized,
{
    move |host: &H| Ok(host.content()? != baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSelector;
    use crate::error::BrowserError;

    /// Page whose content flips to "changed" after a number of pauses
    struct Flipping {
        pauses: u32,
        flip_after: Option<u32>,
        paused_for: Duration,
    }

    impl Flipping {
        fn new(flip_after: Option<u32>) -> Self {
            Self {
                pauses: 0,
                flip_after,
                paused_for: Duration::ZERO,
            }
        }
    }

    impl PageHost for Flipping {
        fn location(&self) -> Result<String> {
            Ok("https://chatgpt.com/codex/tasks/task_1".to_string())
        }

        fn content(&self) -> Result<String> {
            match self.flip_after {
                Some(n) if self.pauses >= n => Ok("changed".to_string()),
                _ => Ok("original".to_string()),
            }
        }

        fn activate(&mut self, _selector: &ElementSelector) -> Result<()> {
            Ok(())
        }

        fn pause(&mut self, duration: Duration) {
            self.pauses += 1;
            self.paused_for += duration;
        }
    }

    fn limits() -> WaitLimits {
        WaitLimits::new(Duration::from_millis(500), Duration::from_millis(100))
    }

    #[test]
    fn test_signal_fires_after_some_polls() {
        let mut host = Flipping::new(Some(3));

        let outcome = wait_for_signal(&mut host, limits(), content_changed("original".to_string())).unwrap();

        assert_eq!(outcome, WaitOutcome::Signalled);
        assert_eq!(host.pauses, 3);
    }

    #[test]
    fn test_immediate_signal_never_pauses() {
        let mut host = Flipping::new(Some(0));

        let outcome = wait_for_signal(&mut host, limits(), content_changed("original".to_string())).unwrap();

        assert_eq!(outcome, WaitOutcome::Signalled);
        assert_eq!(host.pauses, 0);
    }

    #[test]
    fn test_times_out_at_ceiling() {
        let mut host = Flipping::new(None);

        let outcome = wait_for_signal(&mut host, limits(), content_changed("original".to_string())).unwrap();

        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert_eq!(host.paused_for, Duration::from_millis(500));
    }

    #[test]
    fn test_zero_ceiling_checks_once() {
        let mut host = Flipping::new(None);
        let limits = WaitLimits::new(Duration::ZERO, Duration::ZERO);

        let outcome = wait_for_signal(&mut host, limits, |_: &Flipping| Ok(false)).unwrap();

        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert_eq!(host.pauses, 0);
    }

    #[test]
    fn test_signal_error_ends_wait() {
        let mut host = Flipping::new(None);

        let result = wait_for_signal(&mut host, limits(), |_: &Flipping| {
            Err(BrowserError::HostCommunication("tab closed".to_string()))
        });

        assert!(matches!(result, Err(BrowserError::HostCommunication(_))));
    }

    #[test]
    fn test_limits_from_timings() {
        let limits = WaitLimits::from(SettleTimings::default());
        assert_eq!(limits.ceiling, Duration::from_millis(2000));
        assert_eq!(limits.interval, Duration::from_millis(100));
    }
}
