use crate::core::profile::PollPolicy;
use std::path::Path;
use std::time::Instant;

/// Blocks until `path` exists as a file or the policy's deadline elapses.
///
/// Returns `true` if the file appeared. Checks are spaced by the policy's
/// interval growing geometrically, so a long deadline does not hammer a
/// network filesystem.
pub fn poll_until_present<P>(path: &P, policy: &PollPolicy) -> bool
where
    P: AsRef<Path>,
{
    let deadline = Instant::now() + policy.get_timeout();
    let mut interval = policy.get_interval();
    loop {
        if path.as_ref().is_file() == true {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep(interval.min(deadline - now));
        interval = interval.mul_f32(policy.get_backoff());
    }
}

/// Removes a file if it exists; absence is not an error.
pub fn remove_if_exists<P>(path: &P)
where
    P: AsRef<Path>,
{
    let _ = std::fs::remove_file(path.as_ref());
}
