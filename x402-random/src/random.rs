//! Uniform integer draws.

use rand::Rng;

use crate::request::Range;

/// Draw one integer uniformly from `range`, bounds included.
///
/// `Rng::random_range` samples by rejection, so every value in the range is
/// equally likely whatever its width.
pub fn draw<R: Rng>(rng: &mut R, range: Range) -> i64 {
    rng.random_range(range.min()..=range.max())
}

/// [`draw`] with the thread-local generator.
pub fn draw_thread_local(range: Range) -> i64 {
    draw(&mut rand::rng(), range)
}
