//! Recovery statistics aggregated per trial-count threshold.
//!
//! For each threshold: agent counts, per-parameter and combined mean squared
//! error with the standard error of that mean across agents, and the Pearson
//! correlation between true and recovered values.
//!
//! Failed fits (no estimate) are excluded from every error statistic and
//! counted in `num_failed` / `failure_rate`. Undefined statistics (no
//! converged agents, or fewer than two for a standard error) are NaN, which
//! serializes to JSON `null` and to CSV `NaN`.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{RecoveryError, Result};
use crate::types::RecoveryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorStats {
    pub mse: f64,
    /// Standard error of the mean squared error across agents.
    pub sem: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSummary {
    pub num_trials: usize,
    pub num_agents: usize,
    pub num_converged: usize,
    pub num_failed: usize,
    pub failure_rate: f64,
    pub alpha: ErrorStats,
    pub beta: ErrorStats,
    pub mu: ErrorStats,
    /// Per agent: mean of the three squared errors.
    pub combined: ErrorStats,
    /// Pearson r between true and recovered α, β, μ.
    pub correlation: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoverySummary {
    pub seed: u64,
    pub population: String,
    pub num_agents: usize,
    pub thresholds: Vec<ThresholdSummary>,
}

/// Sample mean and standard error of the mean (n-1 denominator).
pub fn mean_and_sem(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, f64::NAN);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, (var / n as f64).sqrt())
}

/// Pearson correlation; NaN when undefined (n < 2 or zero variance).
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = xs[..n].iter().sum::<f64>() / n as f64;
    let my = ys[..n].iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

fn error_stats(values: &[f64]) -> ErrorStats {
    let (mse, sem) = mean_and_sem(values);
    ErrorStats { mse, sem }
}

/// Summarize the records of one threshold.
pub fn summarize_threshold(num_trials: usize, records: &[&RecoveryRecord]) -> ThresholdSummary {
    let num_agents = records.len();
    let mut squared: [Vec<f64>; 3] = Default::default();
    let mut combined = Vec::with_capacity(num_agents);
    let mut truths: [Vec<f64>; 3] = Default::default();
    let mut fits: [Vec<f64>; 3] = Default::default();

    for rec in records {
        let (Some(se), Some(est)) = (rec.squared_errors(), rec.fit.estimate) else {
            continue;
        };
        let truth = rec.truth.to_array();
        let est = est.to_array();
        for k in 0..3 {
            squared[k].push(se[k]);
            truths[k].push(truth[k]);
            fits[k].push(est[k]);
        }
        combined.push(se.iter().sum::<f64>() / 3.0);
    }

    let num_converged = combined.len();
    let num_failed = num_agents - num_converged;
    ThresholdSummary {
        num_trials,
        num_agents,
        num_converged,
        num_failed,
        failure_rate: if num_agents == 0 {
            f64::NAN
        } else {
            num_failed as f64 / num_agents as f64
        },
        alpha: error_stats(&squared[0]),
        beta: error_stats(&squared[1]),
        mu: error_stats(&squared[2]),
        combined: error_stats(&combined),
        correlation: [
            pearson(&truths[0], &fits[0]),
            pearson(&truths[1], &fits[1]),
            pearson(&truths[2], &fits[2]),
        ],
    }
}

/// Group records by threshold and summarize each, in `thresholds` order.
pub fn aggregate_recovery(records: &[RecoveryRecord], thresholds: &[usize]) -> Vec<ThresholdSummary> {
    thresholds
        .iter()
        .map(|&t| {
            let group: Vec<&RecoveryRecord> =
                records.iter().filter(|r| r.num_trials == t).collect();
            summarize_threshold(t, &group)
        })
        .collect()
}

/// Thresholds whose combined MSE rose over the previous threshold by more
/// than `k` times the two combined SEMs added together.
///
/// More trials should never make recovery worse beyond sampling noise;
/// each entry is `(previous num_trials, num_trials)`.
pub fn trend_violations(summaries: &[ThresholdSummary], k: f64) -> Vec<(usize, usize)> {
    summaries
        .windows(2)
        .filter_map(|w| {
            let (prev, next) = (&w[0], &w[1]);
            let slack = k * (zero_if_nan(prev.combined.sem) + zero_if_nan(next.combined.sem));
            (next.combined.mse > prev.combined.mse + slack)
                .then_some((prev.num_trials, next.num_trials))
        })
        .collect()
}

fn zero_if_nan(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x
    }
}

/// Write the summary as pretty-printed JSON, creating parent directories.
pub fn save_summary_json(summary: &RecoverySummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RecoveryError::io(format!("create {}", parent.display()), e))?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).map_err(|e| RecoveryError::io(format!("write {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentParameters, FitResult};
    use approx::assert_abs_diff_eq;

    fn record(agent: usize, n: usize, truth: [f64; 3], est: Option<[f64; 3]>) -> RecoveryRecord {
        RecoveryRecord {
            agent,
            num_trials: n,
            truth: AgentParameters::from_array(truth),
            fit: match est {
                Some(e) => FitResult {
                    estimate: Some(AgentParameters::from_array(e)),
                    converged: true,
                    neg_log_likelihood: 10.0,
                    iterations: 50,
                },
                None => FitResult::failed(12.0, 1000),
            },
        }
    }

    fn summary(n: usize, mse: f64, sem: f64) -> ThresholdSummary {
        let e = ErrorStats { mse, sem };
        ThresholdSummary {
            num_trials: n,
            num_agents: 10,
            num_converged: 10,
            num_failed: 0,
            failure_rate: 0.0,
            alpha: e,
            beta: e,
            mu: e,
            combined: e,
            correlation: [1.0; 3],
        }
    }

    #[test]
    fn test_mean_and_sem() {
        let (m, s) = mean_and_sem(&[1.0, 2.0, 3.0, 4.0]);
        assert_abs_diff_eq!(m, 2.5, epsilon = 1e-12);
        // sample var = 5/3, sem = sqrt(5/3 / 4)
        assert_abs_diff_eq!(s, (5.0f64 / 12.0).sqrt(), epsilon = 1e-12);
        assert!(mean_and_sem(&[]).0.is_nan());
        let (m1, s1) = mean_and_sem(&[2.0]);
        assert_eq!(m1, 2.0);
        assert!(s1.is_nan());
    }

    #[test]
    fn test_pearson() {
        assert_abs_diff_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0, epsilon = 1e-12);
        assert!(pearson(&[1.0, 1.0], &[1.0, 2.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_failed_fits_excluded_and_counted() {
        let recs = [
            record(0, 100, [0.5, 0.5, 5.0], Some([0.6, 0.5, 5.0])),
            record(1, 100, [0.5, 0.5, 5.0], Some([0.5, 0.3, 6.0])),
            record(2, 100, [0.5, 0.5, 5.0], None),
        ];
        let refs: Vec<&RecoveryRecord> = recs.iter().collect();
        let s = summarize_threshold(100, &refs);
        assert_eq!(s.num_agents, 3);
        assert_eq!(s.num_converged, 2);
        assert_eq!(s.num_failed, 1);
        assert_abs_diff_eq!(s.failure_rate, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.alpha.mse, 0.005, epsilon = 1e-12);
        assert_abs_diff_eq!(s.beta.mse, 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(s.mu.mse, 0.5, epsilon = 1e-12);
        // combined per agent: (0.01 + 0 + 0)/3 and (0 + 0.04 + 1)/3
        assert_abs_diff_eq!(s.combined.mse, (0.01 / 3.0 + 1.04 / 3.0) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_failed_threshold_is_nan() {
        let recs = [record(0, 100, [0.5, 0.5, 5.0], None)];
        let refs: Vec<&RecoveryRecord> = recs.iter().collect();
        let s = summarize_threshold(100, &refs);
        assert_eq!(s.num_failed, 1);
        assert_eq!(s.failure_rate, 1.0);
        assert!(s.combined.mse.is_nan());
    }

    #[test]
    fn test_aggregate_groups_by_threshold() {
        let recs = [
            record(0, 100, [0.5, 0.5, 5.0], Some([0.7, 0.5, 5.0])),
            record(0, 200, [0.5, 0.5, 5.0], Some([0.6, 0.5, 5.0])),
            record(1, 100, [0.5, 0.5, 5.0], Some([0.3, 0.5, 5.0])),
            record(1, 200, [0.5, 0.5, 5.0], None),
        ];
        let s = aggregate_recovery(&recs, &[100, 200]);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].num_trials, 100);
        assert_eq!(s[0].num_converged, 2);
        assert_abs_diff_eq!(s[0].alpha.mse, 0.04, epsilon = 1e-12);
        assert_eq!(s[1].num_failed, 1);
        assert_abs_diff_eq!(s[1].alpha.mse, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_save_summary_json() {
        let summary = RecoverySummary {
            seed: 42,
            population: "truncated-gaussian".to_string(),
            num_agents: 10,
            thresholds: vec![summary(100, 1.0, f64::NAN)],
        };
        let path = std::env::temp_dir()
            .join(format!("prospect_recovery_summary_{}", std::process::id()))
            .join("summary.json");
        save_summary_json(&summary, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["seed"], 42);
        assert_eq!(parsed["thresholds"][0]["num_trials"], 100);
        assert!(parsed["thresholds"][0]["combined"]["sem"].is_null());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_trend_violations() {
        let s = [summary(100, 1.0, 0.1), summary(200, 0.8, 0.1), summary(400, 1.5, 0.1)];
        assert_eq!(trend_violations(&s, 2.0), vec![(200, 400)]);
        let within_noise = [summary(100, 1.0, 0.1), summary(200, 1.2, 0.1)];
        assert!(trend_violations(&within_noise, 2.0).is_empty());
    }
}
