use std::iter;

use itertools::Itertools;
use log::warn;
use ndarray::{Array1, ArrayView1, ScalarOperand};
use num_traits::Float;

use crate::endpoint::{correct, EndpointCorrection};
use crate::math::{code_ramp, ensure_min_codes, ensure_positive_lsb, ensure_same_len, max_abs};
use crate::{Code, Result};

/// The ideal output ladder `k * lsb` for codes `0..num_codes`
///
/// # Errors
/// Returns [`crate::LinearityError::InvalidInput`] if `lsb` is not strictly positive.
pub fn ideal_levels<E: Float + ScalarOperand>(num_codes: usize, lsb: E) -> Result<Array1<E>> {
    ensure_positive_lsb(lsb)?;
    Ok(code_ramp::<E>(num_codes) * lsb)
}

/// Express output levels in units of `lsb`
///
/// # Errors
/// Returns [`crate::LinearityError::InvalidInput`] if `lsb` is not strictly positive or `levels`
/// is empty.
pub fn corrected_codes<E: Float + ScalarOperand>(
    levels: ArrayView1<E>,
    lsb: E,
) -> Result<Array1<E>> {
    ensure_positive_lsb(lsb)?;
    ensure_min_codes(levels.len(), 1, "code conversion")?;
    Ok(levels.mapv(|level| level / lsb))
}

/// Differential non-linearity of each code, in LSB
///
/// Each entry is the measured step from the previous code minus the ideal one-LSB step. Code zero
/// has no preceding step and is zero.
///
/// # Errors
/// Returns [`crate::LinearityError::InvalidInput`] if `lsb` is not strictly positive or `levels`
/// is empty.
///
/// # Examples
///
/// ```
/// use adc_linearity::linearity::dnl;
/// use ndarray::arr1;
///
/// let dnl = dnl(arr1(&[0.0, 1.0, 3.0, 3.5]).view(), 1.0).unwrap();
/// assert_eq!(dnl, arr1(&[0.0, 0.0, 1.0, -0.5]));
/// ```
pub fn dnl<E: Float + ScalarOperand>(levels: ArrayView1<E>, lsb: E) -> Result<Array1<E>> {
    let codes = corrected_codes(levels, lsb)?;
    Ok(dnl_from_codes(codes.view()))
}

/// Integral non-linearity of each code, in LSB
///
/// The deviation of each corrected code position from its ideal integer position. `ideal` fixes
/// the code range the levels must cover.
///
/// # Errors
/// Returns [`crate::LinearityError::InvalidInput`] if `lsb` is not strictly positive, `levels` is
/// empty or the two series differ in length.
pub fn inl<E: Float + ScalarOperand>(
    levels: ArrayView1<E>,
    ideal: ArrayView1<E>,
    lsb: E,
) -> Result<Array1<E>> {
    ensure_same_len(levels, ideal, "integral non-linearity")?;
    let codes = corrected_codes(levels, lsb)?;
    Ok(inl_from_codes(codes.view()))
}

fn dnl_from_codes<E: Float>(codes: ArrayView1<E>) -> Array1<E> {
    iter::once(E::zero())
        .chain(
            codes
                .iter()
                .tuple_windows()
                .map(|(previous, current)| (*current - *previous) - E::one()),
        )
        .collect()
}

fn inl_from_codes<E: Float>(codes: ArrayView1<E>) -> Array1<E> {
    &codes - &code_ramp::<E>(codes.len())
}

/// Per-code non-linearity of a set of output levels, with its summary extrema
#[derive(Clone, Debug)]
pub struct LinearityReport<E> {
    corrected_codes: Array1<E>,
    dnl: Array1<E>,
    inl: Array1<E>,
    max_abs_dnl: E,
    max_abs_inl: E,
}

impl<E: Float> LinearityReport<E> {
    pub const fn corrected_codes(&self) -> &Array1<E> {
        &self.corrected_codes
    }

    pub const fn dnl(&self) -> &Array1<E> {
        &self.dnl
    }

    pub const fn inl(&self) -> &Array1<E> {
        &self.inl
    }

    pub const fn max_abs_dnl(&self) -> E {
        self.max_abs_dnl
    }

    pub const fn max_abs_inl(&self) -> E {
        self.max_abs_inl
    }

    pub fn num_codes(&self) -> usize {
        self.dnl.len()
    }

    /// Codes whose step is flat or negative, so the converter never settles on the code before
    pub fn missing_codes(&self) -> Vec<Code> {
        self.dnl
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, dnl)| **dnl <= -E::one())
            .map(|(code, _)| code)
            .collect()
    }

    /// True when every step is wider than zero, `DNL[k] > -1` for all codes
    pub fn is_monotonic(&self) -> bool {
        self.missing_codes().is_empty()
    }
}

/// Compute DNL, INL and their extrema for `levels` without any end-point correction
///
/// # Errors
/// Returns [`crate::LinearityError::InvalidInput`] if `lsb` is not strictly positive, `levels` is
/// empty or the two series differ in length.
pub fn analyze<E: Float + ScalarOperand>(
    levels: ArrayView1<E>,
    ideal: ArrayView1<E>,
    lsb: E,
) -> Result<LinearityReport<E>> {
    ensure_same_len(levels, ideal, "linearity analysis")?;
    let corrected_codes = corrected_codes(levels, lsb)?;
    let dnl = dnl_from_codes(corrected_codes.view());
    let inl = inl_from_codes(corrected_codes.view());

    let report = LinearityReport {
        max_abs_dnl: max_abs(dnl.view()),
        max_abs_inl: max_abs(inl.view()),
        corrected_codes,
        dnl,
        inl,
    };

    let missing = report.missing_codes();
    if !missing.is_empty() {
        warn!("non-monotonic steps, codes {missing:?} have DNL at or below -1 LSB");
    }

    Ok(report)
}

/// End-point correction followed by linearity analysis of the corrected levels
#[derive(Clone, Debug)]
pub struct Characterization<E> {
    correction: EndpointCorrection<E>,
    linearity: LinearityReport<E>,
}

impl<E> Characterization<E> {
    pub const fn correction(&self) -> &EndpointCorrection<E> {
        &self.correction
    }

    pub const fn linearity(&self) -> &LinearityReport<E> {
        &self.linearity
    }
}

/// Characterise a converter from its `ideal` and measured `actual` output levels
///
/// # Errors
/// - [`crate::LinearityError::InvalidInput`] for misaligned series, fewer than two codes or a
///   non-positive `lsb`
/// - [`crate::LinearityError::DivisionByZero`] if the converter has no dynamic range
pub fn characterize<E: Float + ScalarOperand>(
    ideal: ArrayView1<E>,
    actual: ArrayView1<E>,
    lsb: E,
) -> Result<Characterization<E>> {
    ensure_positive_lsb(lsb)?;
    let correction = correct(ideal, actual)?;
    let linearity = analyze(correction.corrected().view(), ideal, lsb)?;

    Ok(Characterization {
        correction,
        linearity,
    })
}
