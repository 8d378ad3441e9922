use crate::evaluation::FitnessInfo;
use crate::evolution::ComplexityMode;

use serde::{Deserialize, Serialize};

use std::collections::VecDeque;
use std::fmt;

/// A fixed-window moving average.
#[derive(Clone, Debug)]
pub struct MovingAverage {
    window: VecDeque<f64>,
    capacity: usize,
}

impl MovingAverage {
    pub fn new(capacity: usize) -> MovingAverage {
        MovingAverage {
            window: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    pub fn mean(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.window.iter().sum::<f64>() / self.window.len() as f64
        }
    }
}

/// A snapshot of one generation, taken after evaluation and speciation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best_fitness: FitnessInfo,
    pub mean_fitness: f64,
    pub best_complexity: f64,
    pub mean_complexity: f64,
    pub max_complexity: f64,
    pub species_sizes: Vec<usize>,
    pub mode: ComplexityMode,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gen {:>4}  best {:>9.4}  mean {:>9.4}  complexity {:>6.2} (best {:>5.1})  species {:?}  {:?}",
            self.generation,
            self.best_fitness.primary,
            self.mean_fitness,
            self.mean_complexity,
            self.best_complexity,
            self.species_sizes,
            self.mode,
        )
    }
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug, Default)]
pub struct EvolutionLogger {
    logs: Vec<GenerationStats>,
}

impl EvolutionLogger {
    pub fn new() -> EvolutionLogger {
        EvolutionLogger::default()
    }

    /// Stores a generation snapshot.
    pub fn log(&mut self, stats: GenerationStats) {
        self.logs.push(stats);
    }

    /// Iterates over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &GenerationStats> {
        self.logs.iter()
    }

    pub fn latest(&self) -> Option<&GenerationStats> {
        self.logs.last()
    }
}

/// Basic statistical summary of a sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Summarises the numbers in a sequence.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::evolution::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: f64::NAN,
                minimum: f64::NAN,
                mean: f64::NAN,
                median: f64::NAN,
            };
        }
        let (mut max, mut min, mut sum) = (f64::MIN, f64::MAX, 0.0);
        for d in &data {
            max = d.max(max);
            min = d.min(min);
            sum += d;
        }
        data.sort_unstable_by(|a, b| a.total_cmp(b));
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: max,
            minimum: min,
            mean: sum / data.len() as f64,
            median,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_average_drops_old_values() {
        let mut average = MovingAverage::new(2);
        average.push(1.0);
        average.push(3.0);
        assert_eq!(average.mean(), 2.0);
        average.push(5.0);
        assert_eq!(average.mean(), 4.0);
    }

    #[test]
    fn empty_moving_average_is_zero() {
        assert_eq!(MovingAverage::new(3).mean(), 0.0);
    }

    #[test]
    fn stats_of_even_length_sequence() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].into_iter());
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.maximum, 4.0);
        assert_eq!(stats.minimum, 1.0);
    }
}
