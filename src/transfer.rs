use std::iter;

use log::{debug, warn};
use ndarray::{s, Array1, ArrayView1};
use num_traits::Float;

use crate::math::{code_ramp, ensure_min_codes, max_abs};
use crate::{Code, LinearityError, Result};

/// Decision boundaries of a quantiser with `N` codes, in LSB
///
/// Holds `N + 1` levels. Entry zero is the lower rail, entry `N` the upper rail and entry `k`
/// the boundary between code `k - 1` and code `k`. Levels need not increase: a zero or negative
/// width step is valid measurement data.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSeries<E>(Array1<E>);

impl<E: Float> TransitionSeries<E> {
    /// Wrap a set of boundary levels, the first being the lower rail and the last the upper rail
    ///
    /// # Errors
    /// Returns [`LinearityError::InvalidInput`] if fewer than two levels (one code) are given.
    pub fn from_levels(levels: Array1<E>) -> Result<Self> {
        ensure_min_codes(levels.len(), 2, "transition levels")?;
        Ok(Self(levels))
    }

    pub const fn levels(&self) -> &Array1<E> {
        &self.0
    }

    pub fn num_codes(&self) -> usize {
        self.0.len() - 1
    }

    pub fn lower_rail(&self) -> E {
        self.0[0]
    }

    pub fn upper_rail(&self) -> E {
        self.0[self.num_codes()]
    }
}

/// Reconstruct the transition levels of a converter with `num_codes` codes from its DNL profile
///
/// The lower rail sits at zero and the first transition absorbs the whole `offset_error` on top
/// of one nominal step. Every later transition lies one step of `1 + DNL[k - 1]` above the
/// previous one, so an error in a single DNL entry moves every transition after it. The final
/// DNL entry shapes no boundary below the upper rail and is not used.
///
/// # Errors
/// Returns [`LinearityError::InvalidInput`] if `num_codes` is zero or `dnl` does not hold exactly
/// `num_codes` entries.
///
/// # Examples
///
/// ```
/// use adc_linearity::transfer::build_transitions;
/// use ndarray::arr1;
///
/// let transitions = build_transitions(arr1(&[0.0, 0.5, 0.0]).view(), 0.25, 3).unwrap();
/// assert_eq!(transitions.levels(), &arr1(&[0.0, 1.25, 2.25, 3.75]));
/// ```
pub fn build_transitions<E: Float>(
    dnl: ArrayView1<E>,
    offset_error: E,
    num_codes: usize,
) -> Result<TransitionSeries<E>> {
    ensure_min_codes(num_codes, 1, "transition reconstruction")?;
    if dnl.len() != num_codes {
        return Err(LinearityError::invalid(format!(
            "transition reconstruction: expected {num_codes} DNL entries, got {}",
            dnl.len()
        )));
    }

    let first = E::one() + offset_error;
    let steps = dnl.iter().take(num_codes - 1).scan(first, |level, dnl| {
        *level = *level + (E::one() + *dnl);
        Some(*level)
    });
    let levels: Array1<E> = iter::once(E::zero())
        .chain(iter::once(first))
        .chain(steps)
        .collect();

    debug!(
        "reconstructed {num_codes} codes, upper rail at {} LSB",
        levels[num_codes].to_f64().unwrap_or(f64::NAN)
    );

    Ok(TransitionSeries(levels))
}

/// Transition levels of an ideal converter, `[0, 1, ..., num_codes]`
///
/// # Errors
/// Returns [`LinearityError::InvalidInput`] if `num_codes` is zero.
pub fn ideal_transitions<E: Float>(num_codes: usize) -> Result<TransitionSeries<E>> {
    build_transitions(Array1::zeros(num_codes).view(), E::zero(), num_codes)
}

/// Per-code INL of reconstructed transitions against the offset ideal ladder `k + offset_error`
///
/// The upper rail is not a code and is left out, so one value is returned per code.
pub fn inl_from_transitions<E: Float>(
    transitions: &TransitionSeries<E>,
    offset_error: E,
) -> Array1<E> {
    let num_codes = transitions.num_codes();
    let ideal = code_ramp::<E>(num_codes).mapv(|code| code + offset_error);
    &transitions.levels().slice(s![..num_codes]) - &ideal
}

/// The output code of the converter for a continuous `input` in LSB
///
/// Returns the smallest code `k` with `input < transitions[k + 1]`, so lower boundaries are
/// inclusive and upper ones exclusive. Inputs below the lower rail give code zero and inputs at
/// or above the upper rail saturate at the top code, as does a NaN input.
pub fn evaluate<E: Float>(transitions: &TransitionSeries<E>, input: E) -> Code {
    transitions
        .levels()
        .iter()
        .skip(1)
        .position(|boundary| input < *boundary)
        .unwrap_or(transitions.num_codes() - 1)
}

/// Step function from continuous input to output code
#[derive(Clone, Debug, PartialEq)]
pub struct TransferCurve<E> {
    transitions: TransitionSeries<E>,
}

impl<E: Float> TransferCurve<E> {
    pub const fn from_transitions(transitions: TransitionSeries<E>) -> Self {
        Self { transitions }
    }

    /// The curve of an ideal converter without offset, for comparison
    ///
    /// # Errors
    /// Returns [`LinearityError::InvalidInput`] if `num_codes` is zero.
    pub fn ideal(num_codes: usize) -> Result<Self> {
        Ok(Self::from_transitions(ideal_transitions(num_codes)?))
    }

    pub const fn transitions(&self) -> &TransitionSeries<E> {
        &self.transitions
    }

    pub fn code_at(&self, input: E) -> Code {
        evaluate(&self.transitions, input)
    }

    /// Evaluate the curve at `points` evenly spaced inputs from `start` to `end` inclusive
    ///
    /// # Errors
    /// Returns [`LinearityError::InvalidInput`] if `points` is zero, either bound is not finite
    /// or `start` lies above `end`.
    pub fn sample(&self, start: E, end: E, points: usize) -> Result<Vec<(E, Code)>> {
        if points == 0 || !start.is_finite() || !end.is_finite() || start > end {
            return Err(LinearityError::invalid(
                "transfer curve sampling needs at least one point over a finite, ordered range",
            ));
        }
        Ok(Array1::linspace(start, end, points)
            .iter()
            .map(|input| (*input, self.code_at(*input)))
            .collect())
    }
}

/// Everything derived from a DNL profile in the reconstruction direction
#[derive(Clone, Debug)]
pub struct Reconstruction<E> {
    dnl: Array1<E>,
    offset_error: E,
    inl: Array1<E>,
    max_abs_inl: E,
    curve: TransferCurve<E>,
    ideal_curve: TransferCurve<E>,
}

impl<E: Float> Reconstruction<E> {
    pub const fn dnl(&self) -> &Array1<E> {
        &self.dnl
    }

    pub const fn offset_error(&self) -> E {
        self.offset_error
    }

    pub const fn transitions(&self) -> &TransitionSeries<E> {
        &self.curve.transitions
    }

    pub const fn inl(&self) -> &Array1<E> {
        &self.inl
    }

    pub const fn max_abs_inl(&self) -> E {
        self.max_abs_inl
    }

    pub const fn curve(&self) -> &TransferCurve<E> {
        &self.curve
    }

    pub const fn ideal_curve(&self) -> &TransferCurve<E> {
        &self.ideal_curve
    }

    pub fn num_codes(&self) -> usize {
        self.dnl.len()
    }
}

/// Rebuild transitions, INL and transfer curves from a DNL profile and offset error
///
/// # Errors
/// Returns [`LinearityError::InvalidInput`] if `dnl` is empty.
pub fn reconstruct<E: Float>(
    dnl: ArrayView1<E>,
    offset_error: E,
) -> Result<Reconstruction<E>> {
    let num_codes = dnl.len();
    let transitions = build_transitions(dnl, offset_error, num_codes)?;
    let inl = inl_from_transitions(&transitions, offset_error);

    if dnl.iter().skip(1).any(|dnl| *dnl <= -E::one()) {
        warn!("DNL profile holds zero or negative width steps, some codes are never produced");
    }

    Ok(Reconstruction {
        dnl: dnl.to_owned(),
        offset_error,
        max_abs_inl: max_abs(inl.view()),
        inl,
        curve: TransferCurve::from_transitions(transitions),
        ideal_curve: TransferCurve::ideal(num_codes)?,
    })
}
