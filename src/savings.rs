//! 401(k) pre-tax and post-tax savings.
//!
//! The optimizer looks for a schedule of per-paycheck contribution percents that contributes just
//! over the cap for the year, ideally by one cent. The final paycheck contributions are clamped to
//! the cap so the year never goes over.
//!
//! The schedule changes at most twice, across three windows:
//!
//! - start: from the first paycheck until the salary increase (plus `increase_shift` paychecks).
//! - increase: from the salary increase until today, including paychecks within
//!   `tweak_limit_days` of today which are too close to change.
//! - tweak: all remaining paychecks, the last of which may sweep to a different percent.
//!
//! Each change across a boundary is limited to `change` percent to keep net pay smooth. The
//! optimizer can be rerun as the year progresses to rebalance.

use crate::config::{Config, PercentPolicy};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::Income;
use crate::Result;
use anyhow::{anyhow, bail};
use chrono::{Days, NaiveDate};
use std::ops::RangeInclusive;
use tracing::debug;

/// The number of paychecks in each contribution window.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Windows {
    pub(crate) start: usize,
    pub(crate) increase: usize,
    pub(crate) tweak: usize,
}

impl Windows {
    /// Splits the salary `dates` into windows. `shift` moves that many paychecks after the raise
    /// into the start window.
    pub(crate) fn new(
        dates: &[NaiveDate],
        increase_start: NaiveDate,
        tweak_date: NaiveDate,
        shift: usize,
    ) -> Res<Self> {
        let mut start = 0;
        let mut increase = 0;
        let mut tweak = 0;
        let mut shifted = 0;
        for &date in dates {
            if date < increase_start {
                start += 1;
            } else if shifted < shift {
                shifted += 1;
            } else if date >= tweak_date {
                tweak += 1;
            } else {
                increase += 1;
            }
        }
        if shifted < shift {
            bail!(
                "increase_shift {shift} exceeds the {shifted} paychecks after the salary increase"
            );
        }
        Ok(Self {
            start: start + shifted,
            increase,
            tweak,
        })
    }

    pub(crate) fn total(&self) -> usize {
        self.start + self.increase + self.tweak
    }
}

/// Finds the contribution percents for each salary paycheck, given each paycheck's `gross`.
///
/// A manual list in `policy` is returned as is. Otherwise every candidate schedule is scored by
/// its unclamped total contribution and the lowest score strictly over `cap` wins. Ties keep the
/// first candidate found.
pub(crate) fn optimize(
    gross: &[f64],
    windows: Windows,
    policy: &PercentPolicy,
    cap: f64,
    change: u32,
) -> Result<Vec<u32>> {
    if policy.is_manual() {
        if policy.manual.len() != gross.len() {
            return Err(anyhow!(
                "manual list wrong length, expected {} found {}",
                gross.len(),
                policy.manual.len()
            ))
            .pub_result(ErrorType::Config);
        }
        return Ok(policy.manual.clone());
    }
    if windows.total() != gross.len() {
        return Err(anyhow!(
            "wrong paycheck count, {} in windows and {} salaried",
            windows.total(),
            gross.len()
        ))
        .pub_result(ErrorType::Invariant);
    }
    let seeds = seeds(gross, policy, cap, change).pub_result(ErrorType::Config)?;
    let change = i64::from(change);
    let increase_range = |start: i64| -> RangeInclusive<i64> {
        if policy.increase == 0 {
            start - change..=start + change
        } else {
            let increase = i64::from(policy.increase);
            increase..=increase
        }
    };

    let rest = windows.total() - windows.start;
    let mut best: Option<(Vec<u32>, f64)> = None;
    for seed in seeds {
        for start in seed {
            for increase in increase_range(start) {
                for tweak in increase - change..=increase + change {
                    if start < 0 || increase < 0 || tweak < 0 {
                        continue;
                    }
                    for count in 0..=windows.tweak {
                        let schedule = schedule(
                            windows.start,
                            rest,
                            count,
                            [start, increase, tweak].map(|p| p as u32),
                        );
                        let score = score(gross, &schedule);
                        if score > cap && best.as_ref().map_or(true, |(_, b)| score < *b) {
                            best = Some((schedule, score));
                        }
                    }
                }
            }
        }
    }
    match best {
        Some((schedule, score)) => {
            debug!("Best schedule contributes {score:.2} against a cap of {cap:.2}");
            Ok(schedule)
        }
        None => Err(anyhow!("no contribution schedule reaches the cap {cap:.2}"))
            .pub_result(ErrorType::Optimizer),
    }
}

/// The ranges of start percents to search.
fn seeds(
    gross: &[f64],
    policy: &PercentPolicy,
    cap: f64,
    change: u32,
) -> Res<Vec<RangeInclusive<i64>>> {
    let change = i64::from(change);
    if policy.start != 0 {
        let start = i64::from(policy.start);
        return Ok(vec![start..=start]);
    }
    if policy.increase != 0 {
        bail!("invalid auto-config start and increase");
    }
    // A conservative guess assumes no salary increase.
    let first = gross.first().copied().unwrap_or_default();
    let no_increase = first * gross.len() as f64;
    if no_increase <= 0.0 {
        bail!("no salaried gross pay to contribute from");
    }
    let estimate = cap / no_increase * 100.0;
    Ok([estimate.floor(), estimate.ceil()]
        .into_iter()
        .map(|p| {
            let p = p as i64;
            p - change..=p + change
        })
        .collect())
}

fn schedule(
    start_count: usize,
    rest: usize,
    tweak_count: usize,
    [start, increase, tweak]: [u32; 3],
) -> Vec<u32> {
    let mut schedule = Vec::with_capacity(start_count + rest);
    schedule.extend(std::iter::repeat(start).take(start_count));
    schedule.extend(std::iter::repeat(increase).take(rest - tweak_count));
    schedule.extend(std::iter::repeat(tweak).take(tweak_count));
    schedule
}

fn score(gross: &[f64], schedule: &[u32]) -> f64 {
    gross
        .iter()
        .zip(schedule)
        .map(|(g, p)| g * (f64::from(*p) / 100.0))
        .sum()
}

/// Computes pre-tax contributions with the employer match, then post-tax contributions, for the
/// salary events in `income`. Pre-tax must come first since the match reduces the post-tax cap.
pub(crate) fn apply(config: &Config, income: &mut [Income], today: NaiveDate) -> Result<()> {
    let save = config.save();
    let dates: Vec<NaiveDate> = income
        .iter()
        .filter(|i| i.is_salary())
        .map(|i| i.date)
        .collect();
    let gross: Vec<f64> = income
        .iter()
        .filter(|i| i.is_salary())
        .map(|i| i.gross)
        .collect();
    let tweak_date = today
        .checked_add_days(Days::new(u64::from(save.tweak_limit_days)))
        .unwrap_or(NaiveDate::MAX);
    let windows = Windows::new(
        &dates,
        config.increase_start(),
        tweak_date,
        save.increase_shift as usize,
    )
    .pub_result(ErrorType::Config)?;
    debug!("401(k) windows {windows:?}");

    let cap_pre = save.cap_pre.as_f64();
    let pre = optimize(&gross, windows, &save.percent_pre, cap_pre, save.change)?;
    debug!("401(k) best pre-tax: {}", join(&pre));
    let percent_match = save.percent_match / 100.0;
    let mut remaining = cap_pre;
    let mut total_match = 0.0;
    for (income, percent) in salary_mut(income).zip(&pre) {
        let gross = income.gross;
        if let Some(details) = income.salary_details_mut() {
            details.percent_401k = f64::from(*percent) / 100.0;
            details.contrib_401k = (gross * details.percent_401k).min(remaining).max(0.0);
            remaining -= details.contrib_401k;
            details.contrib_401k_match = (gross * percent_match).min(details.contrib_401k);
            total_match += details.contrib_401k_match;
        }
    }

    let cap_post = save.cap.as_f64() - cap_pre - total_match;
    let post = optimize(&gross, windows, &save.percent_post, cap_post, save.change)?;
    debug!("401(k) best post-tax: {}", join(&post));
    let mut remaining = cap_post;
    for (income, percent) in salary_mut(income).zip(&post) {
        let gross = income.gross;
        if let Some(details) = income.salary_details_mut() {
            details.percent_401k_post = f64::from(*percent) / 100.0;
            details.contrib_401k_post =
                (gross * details.percent_401k_post).min(remaining).max(0.0);
            remaining -= details.contrib_401k_post;
        }
    }

    stamp_ytd(income);
    Ok(())
}

fn salary_mut(income: &mut [Income]) -> impl Iterator<Item = &mut Income> {
    income.iter_mut().filter(|i| i.is_salary())
}

fn join(schedule: &[u32]) -> String {
    schedule
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Adds the running 401(k) totals to salaried paychecks.
fn stamp_ytd(income: &mut [Income]) {
    let (mut pre, mut matched, mut post) = (0.0, 0.0, 0.0);
    for income in salary_mut(income) {
        pre += income.contrib_401k();
        matched += income.contrib_401k_match();
        post += income.contrib_401k_post();
        income.ytd.contrib_401k = pre;
        income.ytd.contrib_401k_match = matched;
        income.ytd.contrib_401k_post = post;
        income.ytd.contrib_401k_total = pre + matched + post;
    }
}
