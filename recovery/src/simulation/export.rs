//! CSV export of simulated trials, per-fit records and threshold summaries.
//!
//! Headers are fixed constants. Missing estimates and undefined statistics
//! are written as `NaN`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{RecoveryError, Result};
use crate::types::RecoveryRecord;

use super::agent::AgentRun;
use super::statistics::ThresholdSummary;

pub const TRIALS_HEADER: &str =
    "agent,trial,alpha,beta,mu,probability_risky,reward_risky,reward_certain,choice";

pub const RECORDS_HEADER: &str = "agent,num_trials,true_alpha,true_beta,true_mu,\
fit_alpha,fit_beta,fit_mu,converged,neg_log_likelihood,iterations";

pub const SUMMARY_HEADER: &str = "num_trials,num_agents,num_converged,num_failed,failure_rate,\
mse_alpha,sem_alpha,mse_beta,sem_beta,mse_mu,sem_mu,mse_combined,sem_combined,\
r_alpha,r_beta,r_mu";

pub fn write_trials<W: Write>(w: &mut W, runs: &[AgentRun]) -> io::Result<()> {
    writeln!(w, "{TRIALS_HEADER}")?;
    for run in runs {
        let p = run.truth;
        for (i, o) in run.dataset.iter().enumerate() {
            writeln!(
                w,
                "{},{},{},{},{},{},{},{},{}",
                run.agent,
                i,
                p.alpha,
                p.beta,
                p.mu,
                o.trial.probability_risky(),
                o.trial.reward_risky(),
                o.trial.reward_certain(),
                o.choice.as_indicator()
            )?;
        }
    }
    Ok(())
}

pub fn write_records<W: Write>(w: &mut W, records: &[RecoveryRecord]) -> io::Result<()> {
    writeln!(w, "{RECORDS_HEADER}")?;
    for r in records {
        let [fa, fb, fm] = r.fit.estimate_or_nan();
        writeln!(
            w,
            "{},{},{},{},{},{},{},{},{},{},{}",
            r.agent,
            r.num_trials,
            r.truth.alpha,
            r.truth.beta,
            r.truth.mu,
            fa,
            fb,
            fm,
            u8::from(r.fit.converged),
            r.fit.neg_log_likelihood,
            r.fit.iterations
        )?;
    }
    Ok(())
}

pub fn write_summaries<W: Write>(w: &mut W, summaries: &[ThresholdSummary]) -> io::Result<()> {
    writeln!(w, "{SUMMARY_HEADER}")?;
    for s in summaries {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            s.num_trials,
            s.num_agents,
            s.num_converged,
            s.num_failed,
            s.failure_rate,
            s.alpha.mse,
            s.alpha.sem,
            s.beta.mse,
            s.beta.sem,
            s.mu.mse,
            s.mu.sem,
            s.combined.mse,
            s.combined.sem,
            s.correlation[0],
            s.correlation[1],
            s.correlation[2]
        )?;
    }
    Ok(())
}

/// Create `path` (and its parent directories) and fill it with `body`.
fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let context = || format!("write {}", path.display());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RecoveryError::io(format!("create {}", parent.display()), e))?;
    }
    let file = File::create(path).map_err(|e| RecoveryError::io(context(), e))?;
    let mut w = BufWriter::new(file);
    body(&mut w)
        .and_then(|_| w.flush())
        .map_err(|e| RecoveryError::io(context(), e))
}

pub fn save_trials_csv(runs: &[AgentRun], path: &Path) -> Result<()> {
    write_file(path, |w| write_trials(w, runs))
}

pub fn save_records_csv(records: &[RecoveryRecord], path: &Path) -> Result<()> {
    write_file(path, |w| write_records(w, records))
}

pub fn save_summary_csv(summaries: &[ThresholdSummary], path: &Path) -> Result<()> {
    write_file(path, |w| write_summaries(w, summaries))
}
