use crate::evolution::MovingAverage;

use serde::{Deserialize, Serialize};

/// Whether reproduction is currently allowed to grow network structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityMode {
    Complexifying,
    Simplifying,
}

/// Complexity-regulation strategy. A closed set, so a tagged variant rather
/// than a trait.
///
/// `Absolute` treats `complexity_ceiling` as a fixed mean-complexity bound;
/// `Relative` re-bases the ceiling after every simplification phase to the
/// then-current mean complexity plus `complexity_ceiling`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum ComplexityRegulationSettings {
    Absolute {
        #[serde(rename = "complexityceiling")]
        complexity_ceiling: f64,
        #[serde(rename = "minsimplificationgenerations", default = "default_min_generations")]
        min_simplification_generations: u32,
    },
    Relative {
        #[serde(rename = "complexityceiling")]
        complexity_ceiling: f64,
        #[serde(rename = "minsimplificationgenerations", default = "default_min_generations")]
        min_simplification_generations: u32,
    },
}

fn default_min_generations() -> u32 {
    10
}

impl Default for ComplexityRegulationSettings {
    fn default() -> ComplexityRegulationSettings {
        ComplexityRegulationSettings::Relative {
            complexity_ceiling: 30.0,
            min_simplification_generations: 10,
        }
    }
}

/// Runtime state of the complexity-regulation strategy.
///
/// The strategy switches to simplifying when mean population complexity
/// crosses the current ceiling, and back to complexifying once the minimum number of
/// simplification generations has passed and the complexity moving average
/// has stopped falling.
#[derive(Clone, Debug)]
pub struct ComplexityRegulation {
    settings: ComplexityRegulationSettings,
    mode: ComplexityMode,
    current_ceiling: f64,
    generations_simplifying: u32,
    previous_moving_average: f64,
}

impl ComplexityRegulation {
    pub fn new(settings: ComplexityRegulationSettings) -> ComplexityRegulation {
        let ceiling = match settings {
            ComplexityRegulationSettings::Absolute {
                complexity_ceiling, ..
            }
            | ComplexityRegulationSettings::Relative {
                complexity_ceiling, ..
            } => complexity_ceiling,
        };
        ComplexityRegulation {
            settings,
            mode: ComplexityMode::Complexifying,
            current_ceiling: ceiling,
            generations_simplifying: 0,
            previous_moving_average: 0.0,
        }
    }

    pub fn mode(&self) -> ComplexityMode {
        self.mode
    }

    pub fn ceiling(&self) -> f64 {
        self.current_ceiling
    }

    /// Advances the strategy by one generation.
    pub fn update(&mut self, mean_complexity: f64, complexity_average: &MovingAverage) {
        match self.mode {
            ComplexityMode::Complexifying => {
                if mean_complexity > self.current_ceiling {
                    self.mode = ComplexityMode::Simplifying;
                    self.generations_simplifying = 0;
                    self.previous_moving_average = complexity_average.mean();
                }
            }
            ComplexityMode::Simplifying => {
                self.generations_simplifying += 1;
                let average = complexity_average.mean();
                let still_falling = average < self.previous_moving_average;
                self.previous_moving_average = average;

                let (min_generations, relative) = match self.settings {
                    ComplexityRegulationSettings::Absolute {
                        min_simplification_generations,
                        ..
                    } => (min_simplification_generations, false),
                    ComplexityRegulationSettings::Relative {
                        min_simplification_generations,
                        ..
                    } => (min_simplification_generations, true),
                };
                if self.generations_simplifying >= min_generations && !still_falling {
                    self.mode = ComplexityMode::Complexifying;
                    if relative {
                        let offset = match self.settings {
                            ComplexityRegulationSettings::Relative {
                                complexity_ceiling, ..
                            } => complexity_ceiling,
                            ComplexityRegulationSettings::Absolute { .. } => unreachable!(),
                        };
                        self.current_ceiling = mean_complexity + offset;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absolute(ceiling: f64, min_generations: u32) -> ComplexityRegulation {
        ComplexityRegulation::new(ComplexityRegulationSettings::Absolute {
            complexity_ceiling: ceiling,
            min_simplification_generations: min_generations,
        })
    }

    #[test]
    fn switches_to_simplifying_above_ceiling() {
        let mut regulation = absolute(10.0, 2);
        let mut average = MovingAverage::new(5);

        average.push(5.0);
        regulation.update(5.0, &average);
        assert_eq!(regulation.mode(), ComplexityMode::Complexifying);

        average.push(11.0);
        regulation.update(11.0, &average);
        assert_eq!(regulation.mode(), ComplexityMode::Simplifying);
    }

    #[test]
    fn leaves_simplify_after_min_generations_once_average_plateaus() {
        let mut regulation = absolute(10.0, 2);
        let mut average = MovingAverage::new(3);
        average.push(12.0);
        regulation.update(12.0, &average);
        assert_eq!(regulation.mode(), ComplexityMode::Simplifying);

        // Average still falling: stays simplifying.
        average.push(8.0);
        regulation.update(8.0, &average);
        average.push(6.0);
        regulation.update(6.0, &average);
        assert_eq!(regulation.mode(), ComplexityMode::Simplifying);

        // Plateau with the minimum phase length served: back to growth.
        regulation.update(6.0, &average);
        assert_eq!(regulation.mode(), ComplexityMode::Complexifying);
    }

    #[test]
    fn relative_strategy_rebases_ceiling() {
        let mut regulation = ComplexityRegulation::new(ComplexityRegulationSettings::Relative {
            complexity_ceiling: 10.0,
            min_simplification_generations: 1,
        });
        let mut average = MovingAverage::new(2);

        average.push(11.0);
        regulation.update(11.0, &average);
        assert_eq!(regulation.mode(), ComplexityMode::Simplifying);

        average.push(11.0);
        average.push(11.0);
        regulation.update(8.0, &average);
        assert_eq!(regulation.mode(), ComplexityMode::Complexifying);
        assert_eq!(regulation.ceiling(), 18.0);
    }
}
