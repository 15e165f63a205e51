//! Print linearity tables for the bundled sample converters
//!
//! Runs end-point correction with DNL/INL analysis on a measured 3-bit DAC, and rebuilds the
//! transitions and transfer curve of a 3-bit ADC from its DNL profile.
//!
//! Usage:
//! ```text
//! RUST_LOG=debug cargo run --bin linearity_report
//! ```

use itertools::Itertools;
use log::info;

use adc_linearity::config::Config;
use adc_linearity::Result;

const SAMPLE_RUNS: &str = r#"
[[measured]]
name = "3-bit DAC, measured output levels"
lsb = 0.1
actual = [-0.01, 0.105, 0.195, 0.28, 0.37, 0.48, 0.6, 0.75]

[[reconstruction]]
name = "3-bit ADC, DNL profile"
dnl = [0.0, -0.5, 0.0, 0.5, -1.0, 0.5, 0.5, 0.0]
offset_error = 0.5
"#;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_toml_str(SAMPLE_RUNS)?;

    for run in &config.measured {
        println!("\n{}\n{}", run.name, run.run()?);
    }

    for run in &config.reconstruction {
        let reconstruction = run.run()?;
        println!("\n{}\n{reconstruction}", run.name);

        let (actual, ideal) = run.sample_curves(&reconstruction)?;
        info!("sampled transfer curves at {} inputs", actual.len());
        for (label, curve) in [("actual", actual), ("ideal", ideal)] {
            let steps = curve
                .iter()
                .dedup_by(|a, b| a.1 == b.1)
                .map(|(input, code)| format!("{code}@{input:.2}"))
                .join(" ");
            println!("{label:>6} transfer curve: {steps}");
        }
    }

    Ok(())
}
