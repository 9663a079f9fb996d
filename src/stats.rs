use serde::{Deserialize, Serialize};

/// Running mean and variance (Welford) plus extremes.
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;

        self.min = self.min.min(val);
        self.max = self.max.max(val);
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
            min: if self.n_vals > 0 { self.min } else { f64::NAN },
            max: if self.n_vals > 0 { self.max } else { f64::NAN },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_two_pass_estimates() {
        let vals = [4.0, 7.0, 13.0, 16.0];
        let mut acc = Accumulator::new();
        for val in vals {
            acc.add(val);
        }
        let report = acc.report();
        assert_eq!(report.n_vals, 4);
        assert!((report.mean - 10.0).abs() < 1e-12);
        assert!((report.std_dev - 30.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(report.min, 4.0);
        assert_eq!(report.max, 16.0);
    }

    #[test]
    fn empty_report_is_nan() {
        let report = Accumulator::new().report();
        assert!(report.mean.is_nan());
        assert!(report.std_dev.is_nan());
    }
}
