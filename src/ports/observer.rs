//! Observer port for self-play runs.

use crate::{Result, selfplay::Episode};

/// Observer of batch self-play (generation and evaluation).
///
/// Every method has a no-op default, so observers only implement the
/// events they care about. Call order is `on_run_start`, then
/// `on_episode_end` once per episode, then `on_run_end`.
///
/// # Examples
///
/// ```no_run
/// use noughts::{ports::Observer, selfplay::Episode};
///
/// struct EpisodeCounter {
///     episodes: usize,
/// }
///
/// impl Observer for EpisodeCounter {
///     fn on_episode_end(&mut self, _index: usize, _episode: &Episode) -> noughts::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_run_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each finished episode. `index` counts from zero.
    fn on_episode_end(&mut self, _index: usize, _episode: &Episode) -> Result<()> {
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        Ok(())
    }
}
