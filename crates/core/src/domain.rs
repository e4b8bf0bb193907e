//! Job identity: cause, scenario, measure, draw

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of draws produced per cause/scenario/measure.
pub const DRAW_COUNT: u16 = 100;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown cause: {0}. Valid options: malaria, dengue")]
    UnknownCause(String),

    #[error("Unknown scenario id: {0}. Valid ids: 0, 75, 76")]
    UnknownScenario(u16),

    #[error("Unknown measure: {0}. Valid options: death, incidence, yll, yld")]
    UnknownMeasure(String),

    #[error("Draw {0} out of range (0..{max})", max = DRAW_COUNT)]
    DrawOutOfRange(u16),

    #[error("Draw must be a number in 0..{max}, got '{0}'", max = DRAW_COUNT)]
    InvalidDraw(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Cause {
    Malaria,
    Dengue,
}

impl Cause {
    pub const ALL: [Cause; 2] = [Cause::Malaria, Cause::Dengue];

    pub fn as_str(self) -> &'static str {
        match self {
            Cause::Malaria => "malaria",
            Cause::Dengue => "dengue",
        }
    }

    /// File name of the admin-1 forecast bundle for this cause.
    pub fn forecast_file_name(self) -> &'static str {
        match self {
            Cause::Malaria => "malaria.bin",
            Cause::Dengue => "ntd_dengue.bin",
        }
    }

    /// Malaria deliverables carry a DAH scenario segment in their directory
    /// names; dengue deliverables do not.
    pub fn dah_segment(self) -> Option<&'static str> {
        match self {
            Cause::Malaria => Some("dah_scenario_Baseline"),
            Cause::Dengue => None,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cause {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "malaria" => Ok(Cause::Malaria),
            "dengue" => Ok(Cause::Dengue),
            other => Err(DomainError::UnknownCause(other.to_string())),
        }
    }
}

/// Climate scenario. The numeric ids are the upstream forecasting scenario
/// ids; the SSP labels are what the admin-2 deliverable directories use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Scenario 0, RCP 4.5 reference.
    Ssp245,
    /// Scenario 75, RCP 2.6.
    Ssp126,
    /// Scenario 76, RCP 8.5.
    Ssp585,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Ssp245, Scenario::Ssp126, Scenario::Ssp585];

    pub fn id(self) -> u16 {
        match self {
            Scenario::Ssp245 => 0,
            Scenario::Ssp126 => 75,
            Scenario::Ssp585 => 76,
        }
    }

    pub fn from_id(id: u16) -> Result<Self, DomainError> {
        match id {
            0 => Ok(Scenario::Ssp245),
            75 => Ok(Scenario::Ssp126),
            76 => Ok(Scenario::Ssp585),
            other => Err(DomainError::UnknownScenario(other)),
        }
    }

    pub fn ssp_label(self) -> &'static str {
        match self {
            Scenario::Ssp245 => "ssp245",
            Scenario::Ssp126 => "ssp126",
            Scenario::Ssp585 => "ssp585",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ssp_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Death,
    Incidence,
    Yll,
    Yld,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::Death,
        Measure::Incidence,
        Measure::Yll,
        Measure::Yld,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Measure::Death => "death",
            Measure::Incidence => "incidence",
            Measure::Yll => "yll",
            Measure::Yld => "yld",
        }
    }

    /// Label used in deliverable directory names. Deaths are published as
    /// "mortality"; the other measures keep their own name.
    pub fn count_label(self) -> &'static str {
        match self {
            Measure::Death => "mortality",
            Measure::Incidence => "incidence",
            Measure::Yll => "yll",
            Measure::Yld => "yld",
        }
    }

    /// Admin-2 predictions only exist per measure family: mortality-derived
    /// measures rake against the mortality predictions, incidence-derived
    /// measures against the incidence predictions.
    pub fn predicted_family(self) -> &'static str {
        match self {
            Measure::Death | Measure::Yll => "mortality",
            Measure::Incidence | Measure::Yld => "incidence",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Measure {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "death" => Ok(Measure::Death),
            "incidence" => Ok(Measure::Incidence),
            "yll" => Ok(Measure::Yll),
            "yld" => Ok(Measure::Yld),
            other => Err(DomainError::UnknownMeasure(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draw(u16);

impl Draw {
    pub fn new(value: u16) -> Result<Self, DomainError> {
        if value >= DRAW_COUNT {
            return Err(DomainError::DrawOutOfRange(value));
        }
        Ok(Draw(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Draw> {
        (0..DRAW_COUNT).map(Draw)
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draw_{}", self.0)
    }
}

impl FromStr for Draw {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u16 = s
            .parse()
            .map_err(|_| DomainError::InvalidDraw(s.to_string()))?;
        Draw::new(value)
    }
}

/// One unit of raking work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RakingJob {
    pub cause: Cause,
    pub scenario: Scenario,
    pub measure: Measure,
    pub draw: Draw,
}

impl fmt::Display for RakingJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.cause, self.scenario, self.measure, self.draw
        )
    }
}

/// Cross product of job coordinates, optionally restricted per axis.
#[derive(Debug, Clone, Default)]
pub struct JobGrid {
    causes: Option<Vec<Cause>>,
    scenarios: Option<Vec<Scenario>>,
    measures: Option<Vec<Measure>>,
    draws: Option<Vec<Draw>>,
}

impl JobGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn causes(mut self, causes: Vec<Cause>) -> Self {
        self.causes = Some(causes);
        self
    }

    pub fn scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = Some(scenarios);
        self
    }

    pub fn measures(mut self, measures: Vec<Measure>) -> Self {
        self.measures = Some(measures);
        self
    }

    pub fn draws(mut self, draws: Vec<Draw>) -> Self {
        self.draws = Some(draws);
        self
    }

    /// Expand to the full job list, ordered by cause, scenario, measure,
    /// draw ascending.
    pub fn expand(&self) -> Vec<RakingJob> {
        let causes = self
            .causes
            .clone()
            .unwrap_or_else(|| Cause::ALL.to_vec());
        let scenarios = self
            .scenarios
            .clone()
            .unwrap_or_else(|| Scenario::ALL.to_vec());
        let measures = self
            .measures
            .clone()
            .unwrap_or_else(|| Measure::ALL.to_vec());
        let draws = self
            .draws
            .clone()
            .unwrap_or_else(|| Draw::all().collect());

        let mut jobs =
            Vec::with_capacity(causes.len() * scenarios.len() * measures.len() * draws.len());
        for &cause in &causes {
            for &scenario in &scenarios {
                for &measure in &measures {
                    for &draw in &draws {
                        jobs.push(RakingJob {
                            cause,
                            scenario,
                            measure,
                            draw,
                        });
                    }
                }
            }
        }
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_grid_is_exhaustive_and_unique() {
        let jobs = JobGrid::new().expand();
        assert_eq!(jobs.len(), 2 * 3 * 4 * DRAW_COUNT as usize);

        let unique: std::collections::HashSet<_> = jobs.iter().collect();
        assert_eq!(unique.len(), jobs.len());
    }

    #[test]
    fn restricted_grid() {
        let jobs = JobGrid::new()
            .causes(vec![Cause::Dengue])
            .measures(vec![Measure::Death, Measure::Yll])
            .draws(vec![Draw::new(3).unwrap()])
            .expand();
        assert_eq!(jobs.len(), 6);
        assert!(jobs.iter().all(|j| j.cause == Cause::Dengue));
    }

    #[test]
    fn scenario_ids_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(Scenario::from_id(scenario.id()).unwrap(), scenario);
        }
        assert!(Scenario::from_id(42).is_err());
    }

    #[test]
    fn draw_bounds() {
        assert!(Draw::new(0).is_ok());
        assert!(Draw::new(99).is_ok());
        assert!(Draw::new(100).is_err());
    }

    #[test]
    fn job_display() {
        let job = RakingJob {
            cause: Cause::Malaria,
            scenario: Scenario::Ssp245,
            measure: Measure::Death,
            draw: Draw::new(0).unwrap(),
        };
        assert_eq!(job.to_string(), "malaria/ssp245/death/draw_0");
    }

    #[test]
    fn measure_labels() {
        assert_eq!(Measure::Death.count_label(), "mortality");
        assert_eq!(Measure::Death.predicted_family(), "mortality");
        assert_eq!(Measure::Yll.predicted_family(), "mortality");
        assert_eq!(Measure::Yld.predicted_family(), "incidence");
    }
}
