//! Copies the live window of the particle pool into GPU-visible memory.

use crate::particle::Particle;
use crate::ring::LiveWindow;

/// Copies the live particles of `pool` into `dst`, oldest first.
///
/// `dst` must hold exactly `window.len()` records (the mapped region of the
/// structured buffer). A contiguous window is one copy; a wrapped window is
/// two: `[first_alive, capacity)` to the front of `dst`, then
/// `[0, first_dead)` right after it. Cost is O(live), never O(capacity).
///
/// Returns the number of records written.
pub fn stage_live(pool: &[Particle], window: &LiveWindow, dst: &mut [Particle]) -> usize {
    debug_assert_eq!(pool.len(), window.capacity());
    debug_assert_eq!(dst.len(), window.len());

    let (head, tail) = window.segments();
    let split = head.len();

    dst[..split].copy_from_slice(&pool[head]);
    dst[split..].copy_from_slice(&pool[tail]);

    window.len()
}
