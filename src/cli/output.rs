//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Result,
    ports::Observer,
    selfplay::{Episode, Seat},
};

/// Create a progress bar counting `unit`s
pub fn create_progress(total: u64, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {unit} ({{msg}})"
            ))
            .expect("Invalid progress bar template")
            .progress_chars("=>-"),
    );
    pb
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format `count` out of `total` with a percentage
pub fn format_share(count: usize, total: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    };
    format!("{} ({pct:.1}%)", format_number(count))
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Progress bar over self-play episodes, tallying results by seat
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            first_wins: 0,
            second_wins: 0,
            draws: 0,
        }
    }

    fn tally(&self) -> String {
        format!(
            "1st:{} 2nd:{} D:{}",
            self.first_wins, self.second_wins, self.draws
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, total_episodes: usize) -> Result<()> {
        self.progress_bar = Some(create_progress(total_episodes as u64, "episodes"));
        Ok(())
    }

    fn on_episode_end(&mut self, index: usize, episode: &Episode) -> Result<()> {
        match episode.winner {
            Some(Seat::First) => self.first_wins += 1,
            Some(Seat::Second) => self.second_wins += 1,
            None => self.draws += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(index as u64 + 1);
            pb.set_message(self.tally());
        }
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.tally());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(1, 4), "1 (25.0%)");
        assert_eq!(format_share(0, 0), "0 (0.0%)");
    }

    #[test]
    fn test_observer_tallies_seats() {
        let mut observer = ProgressObserver::new();
        let win = Episode::from_moves(&[0, 3, 1, 4, 2]).unwrap();
        let draw = Episode::from_moves(&[0, 1, 2, 4, 3, 5, 7, 6, 8]).unwrap();

        observer.on_episode_end(0, &win).unwrap();
        observer.on_episode_end(1, &draw).unwrap();
        assert_eq!(observer.tally(), "1st:1 2nd:0 D:1");
    }
}
