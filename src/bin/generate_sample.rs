//! Writes synthetic OceanView-style absorbance exports plus a `group.json`
//! describing them, for trying out the viewer:
//!
//! ```text
//! cargo run --bin generate_sample -- [output-dir]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

use rusty_spectra::data::read_spec::DEFAULT_SENTINEL;

const RUNS: usize = 6;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_spectrum(
    wavelengths: &[f64],
    peaks: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    wavelengths
        .iter()
        .map(|&wl| {
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wl, mu, sigma, amp))
                .sum();
            signal + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Metadata block, sentinel, then tab-separated `wavelength value` rows.
fn render_export(run: usize, wavelengths: &[f64], values: &[f64]) -> String {
    let mut text = format!(
        "Data from Abs_Dye_Water_Scan_{run:04}.txt Node\n\
         Spectrometer: USB4F00000\n\
         Integration Time (sec): 1.000000E-1\n\
         Scans to average: 10\n\
         Number of Pixels in Spectrum: {}\n\
         {DEFAULT_SENTINEL}\n",
        wavelengths.len()
    );
    for (wl, v) in wavelengths.iter().zip(values) {
        text.push_str(&format!("{wl:.2}\t{v:.5}\n"));
    }
    text
}

fn write_group(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir.join("output")).context("creating output directory")?;

    let mut rng = SimpleRng::new(42);
    let peaks = [(450.0, 25.0, 0.9), (520.0, 15.0, 0.4), (610.0, 40.0, 0.25)];

    for run in 1..=RUNS {
        // Later runs start a few pixels in, so the group only overlaps on
        // the common range.
        let start = 400.0 + 0.5 * (run - 1) as f64;
        let wavelengths: Vec<f64> = (0..600).map(|i| start + i as f64 * 0.5).collect();
        let drift = 1.0 + 0.03 * (run as f64 - RUNS as f64 / 2.0);
        let scaled: Vec<(f64, f64, f64)> = peaks
            .iter()
            .map(|&(mu, sigma, amp)| (mu, sigma, amp * drift))
            .collect();
        let values = generate_spectrum(&wavelengths, &scaled, 0.01, &mut rng);

        let path = dir.join(format!("Abs_Dye_Water_Scan_{run:04}.txt"));
        fs::write(&path, render_export(run, &wavelengths, &values))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let definition = json!({
        "readDict": {
            "delim": "\t",
            "begin_line": format!("{DEFAULT_SENTINEL}\n"),
            "col_names": ["Wavelength", "Absorbance"]
        },
        "scans": {
            "sourceFile": "Abs_Dye_Water_Scan_{:04}.txt",
            "outputPath": "output",
            "name": "Scan {}",
            "range": [1, RUNS]
        }
    });
    let def_path = dir.join("group.json");
    let text = serde_json::to_string_pretty(&definition).context("serialising group definition")?;
    fs::write(&def_path, text).with_context(|| format!("writing {}", def_path.display()))?;

    println!(
        "Wrote {RUNS} spectra and {} to {}",
        def_path.display(),
        dir.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_group"));
    write_group(&dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_spectra::data::read_spec::ReadSpec;
    use rusty_spectra::data::Record;

    #[test]
    fn export_reads_back_as_a_record() {
        let text = render_export(12, &[400.0, 400.5], &[0.1, 0.2]);
        let mut record = Record::new();
        record
            .load_from_reader(text.as_bytes(), &ReadSpec::default())
            .unwrap();
        assert_eq!(record.metadata_lines().len(), 5);
        assert_eq!(record.metadata_lines()[0], "Data from Abs_Dye_Water_Scan_0012.txt Node\n");
        assert_eq!(record.keys().unwrap(), [400.0, 400.5]);
    }
}
