//! Plain-text tables of computed results
//!
//! Nothing here derives a value, every number printed comes from the analysis types.

use std::fmt::{self, Display, Formatter};

use itertools::izip;
use num_traits::Float;

use crate::config::MeasuredOutcome;
use crate::linearity::{Characterization, LinearityReport};
use crate::transfer::Reconstruction;

const RULE: &str = "------------------------------------------------------------";

fn write_extrema<E: Float + Display>(
    f: &mut Formatter<'_>,
    report: &LinearityReport<E>,
) -> fmt::Result {
    writeln!(f, "{RULE}")?;
    writeln!(f, "max |DNL| = {:.4} LSB", report.max_abs_dnl())?;
    writeln!(f, "max |INL| = {:.4} LSB", report.max_abs_inl())?;
    if report.is_monotonic() {
        writeln!(f, "monotonic, no missing codes")
    } else {
        writeln!(f, "missing codes: {:?}", report.missing_codes())
    }
}

impl<E: Float + Display> Display for LinearityReport<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4} {:>12} {:>10} {:>10}", "code", "level (LSB)", "DNL", "INL")?;
        for (code, (level, dnl, inl)) in
            izip!(self.corrected_codes(), self.dnl(), self.inl()).enumerate()
        {
            writeln!(f, "{code:>4} {level:>12.5} {dnl:>10.5} {inl:>10.5}")?;
        }
        write_extrema(f, self)
    }
}

impl<E: Float + Display> Display for Characterization<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let correction = self.correction();
        let linearity = self.linearity();
        writeln!(
            f,
            "offset = {:.5} V, gain = {:.5}",
            correction.errors().offset(),
            correction.errors().gain()
        )?;
        writeln!(
            f,
            "{:>4} {:>12} {:>12} {:>12} {:>10} {:>10}",
            "code", "offset-corr", "corrected", "code (LSB)", "DNL", "INL"
        )?;
        for (code, (offset_corrected, corrected, level, dnl, inl)) in izip!(
            correction.offset_corrected(),
            correction.corrected(),
            linearity.corrected_codes(),
            linearity.dnl(),
            linearity.inl()
        )
        .enumerate()
        {
            writeln!(
                f,
                "{code:>4} {offset_corrected:>12.5} {corrected:>12.5} {level:>12.5} {dnl:>10.5} {inl:>10.5}"
            )?;
        }
        write_extrema(f, linearity)
    }
}

impl Display for MeasuredOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrected(characterization) => Display::fmt(characterization, f),
            Self::Direct(report) => Display::fmt(report, f),
        }
    }
}

impl<E: Float + Display> Display for Reconstruction<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "offset error = {:.3} LSB", self.offset_error())?;
        writeln!(
            f,
            "{:>4} {:>10} {:>16} {:>10}",
            "code", "DNL", "transition (LSB)", "INL"
        )?;
        let transitions = self.transitions().levels();
        for (code, (dnl, transition, inl)) in
            izip!(self.dnl(), transitions, self.inl()).enumerate()
        {
            writeln!(f, "{code:>4} {dnl:>10.3} {transition:>16.3} {inl:>10.3}")?;
        }
        writeln!(
            f,
            "{:>4} {:>10} {:>16.3}",
            "rail",
            "",
            self.transitions().upper_rail()
        )?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "max |INL| = {:.3} LSB", self.max_abs_inl())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::arr1;

    use crate::linearity::{analyze, characterize, ideal_levels};
    use crate::transfer::reconstruct;
    use crate::Result;

    #[test]
    fn characterisation_table_has_a_row_per_code() -> Result<()> {
        let ideal = ideal_levels(8, 0.1)?;
        let actual = arr1(&[-0.01, 0.105, 0.195, 0.28, 0.37, 0.48, 0.6, 0.75]);
        let table = characterize(ideal.view(), actual.view(), 0.1)?.to_string();

        assert!(table.starts_with("offset = -0.01000 V, gain = 0.92105"));
        assert!(table.contains("max |DNL| = 0.3816 LSB"));
        assert!(table.contains("max |INL| = 0.5000 LSB"));
        assert!(table.contains("monotonic, no missing codes"));
        // header, eight codes, rule, two extrema, monotonicity
        assert_eq!(table.lines().count(), 1 + 1 + 8 + 1 + 2 + 1);
        Ok(())
    }

    #[test]
    fn missing_codes_are_listed() -> Result<()> {
        let levels = arr1(&[0.0, 1.0, 1.0, 2.0]);
        let ideal = ideal_levels(4, 1.0)?;
        let table = analyze(levels.view(), ideal.view(), 1.0)?.to_string();
        assert!(table.contains("missing codes: [2]"));
        Ok(())
    }

    #[test]
    fn reconstruction_table_ends_at_the_upper_rail() -> Result<()> {
        let dnl = arr1(&[0., -0.5, 0., 0.5, -1., 0.5, 0.5, 0.]);
        let table = reconstruct(dnl.view(), 0.5)?.to_string();

        assert!(table.contains("   6      0.500            5.500     -1.000"));
        assert!(table.contains("rail                       8.500"));
        assert!(table.ends_with("max |INL| = 1.000 LSB\n"));
        Ok(())
    }
}
