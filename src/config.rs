use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::linearity::{analyze, characterize, ideal_levels, Characterization, LinearityReport};
use crate::transfer::{reconstruct, Reconstruction};
use crate::{Code, Result};

/// A set of analysis runs, usually parsed from TOML text
///
/// ```toml
/// [[measured]]
/// name = "3-bit DAC"
/// lsb = 0.1
/// actual = [-0.01, 0.105, 0.195, 0.28, 0.37, 0.48, 0.6, 0.75]
///
/// [[reconstruction]]
/// name = "3-bit ADC"
/// dnl = [0.0, -0.5, 0.0, 0.5, -1.0, 0.5, 0.5, 0.0]
/// offset_error = 0.5
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub measured: Vec<MeasuredRun>,
    #[serde(default)]
    pub reconstruction: Vec<ReconstructionRun>,
}

impl Config {
    /// Parse a run description held in memory
    ///
    /// # Errors
    /// Returns [`crate::LinearityError::Config`] if `text` is not a valid description.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        info!(
            "loaded {} measured and {} reconstruction runs",
            config.measured.len(),
            config.reconstruction.len()
        );
        Ok(config)
    }
}

/// Measured output levels of a converter, one per code
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MeasuredRun {
    pub name: String,
    /// Ideal step between adjacent codes, in volts
    pub lsb: f64,
    pub actual: Vec<f64>,
    /// Ideal output levels, `k * lsb` when omitted
    #[serde(default)]
    pub ideal: Option<Vec<f64>>,
    #[serde(default = "enabled")]
    pub endpoint_correction: bool,
}

const fn enabled() -> bool {
    true
}

pub enum MeasuredOutcome {
    Corrected(Characterization<f64>),
    Direct(LinearityReport<f64>),
}

impl MeasuredRun {
    /// # Errors
    /// Returns [`crate::LinearityError::InvalidInput`] if the ideal ladder has to be generated
    /// and `lsb` is not strictly positive.
    pub fn ideal_levels(&self) -> Result<Array1<f64>> {
        self.ideal.as_ref().map_or_else(
            || ideal_levels(self.actual.len(), self.lsb),
            |ideal| Ok(Array1::from(ideal.clone())),
        )
    }

    /// Characterise the run, with end-point correction unless it was switched off
    ///
    /// # Errors
    /// Propagates any failure of the underlying analysis.
    pub fn run(&self) -> Result<MeasuredOutcome> {
        info!("characterising {}", self.name);
        let ideal = self.ideal_levels()?;
        let actual = Array1::from(self.actual.clone());
        let outcome = if self.endpoint_correction {
            MeasuredOutcome::Corrected(characterize(ideal.view(), actual.view(), self.lsb)?)
        } else {
            MeasuredOutcome::Direct(analyze(actual.view(), ideal.view(), self.lsb)?)
        };
        Ok(outcome)
    }
}

/// Input range over which a transfer curve is tabulated, in LSB
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct Sweep {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl Sweep {
    /// Half an LSB beyond either rail of an ideal converter with `num_codes` codes
    #[allow(clippy::cast_precision_loss)]
    pub fn around(num_codes: usize) -> Self {
        Self {
            start: -0.5,
            end: num_codes as f64 + 0.5,
            points: 1000,
        }
    }
}

/// A DNL profile from which the converter's transitions are rebuilt
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ReconstructionRun {
    pub name: String,
    pub dnl: Vec<f64>,
    /// Offset error of the first transition, in LSB
    pub offset_error: f64,
    #[serde(default)]
    pub sweep: Option<Sweep>,
}

impl ReconstructionRun {
    pub fn sweep(&self) -> Sweep {
        self.sweep.unwrap_or_else(|| Sweep::around(self.dnl.len()))
    }

    /// # Errors
    /// Returns [`crate::LinearityError::InvalidInput`] if the DNL profile is empty.
    pub fn run(&self) -> Result<Reconstruction<f64>> {
        info!("reconstructing {}", self.name);
        reconstruct(Array1::from(self.dnl.clone()).view(), self.offset_error)
    }

    /// Tabulate the actual and ideal transfer curves of `reconstruction` over the run's sweep
    ///
    /// # Errors
    /// Returns [`crate::LinearityError::InvalidInput`] if the sweep is empty or unordered.
    pub fn sample_curves(
        &self,
        reconstruction: &Reconstruction<f64>,
    ) -> Result<(Vec<(f64, Code)>, Vec<(f64, Code)>)> {
        let Sweep { start, end, points } = self.sweep();
        Ok((
            reconstruction.curve().sample(start, end, points)?,
            reconstruction.ideal_curve().sample(start, end, points)?,
        ))
    }
}
