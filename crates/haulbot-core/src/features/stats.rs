//! Statistics menus and export triggers.
//!
//! Fixed periods resolve to a concrete date range here; what the numbers
//! look like is the renderer's business.

use chrono::{Datelike, Days, Months, NaiveDate, Utc};

use crate::{
    command::{StatsCommand, StatsPeriod},
    domain::MessageId,
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    steps,
    Result,
};

use super::{advance, render_into};

/// Inclusive date range for a fixed reporting period, relative to `today`.
pub fn period_range(period: StatsPeriod, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        StatsPeriod::Today => (today, today),
        StatsPeriod::Yesterday => {
            let d = today - Days::new(1);
            (d, d)
        }
        StatsPeriod::CurrentWeek => {
            let start = today - Days::new(today.weekday().num_days_from_monday() as u64);
            (start, today)
        }
        StatsPeriod::CurrentMonth => {
            let start = today.with_day(1).unwrap_or(today);
            (start, today)
        }
        StatsPeriod::LastWeek => {
            let this_monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
            (this_monday - Days::new(7), this_monday - Days::new(1))
        }
        StatsPeriod::LastMonth => {
            let this_first = today.with_day(1).unwrap_or(today);
            let prev_first = this_first - Months::new(1);
            (prev_first, this_first - Days::new(1))
        }
    }
}

pub fn period_label(from: NaiveDate, to: NaiveDate) -> String {
    if from == to {
        from.format("%Y-%m-%d").to_string()
    } else {
        format!("{} — {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
    }
}

pub async fn handle(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: StatsCommand,
) -> Result<Option<MessageId>> {
    use StatsCommand::*;

    match cmd {
        StatsCommand::Menu => {
            let id = render_into(deps, ctx, &Menu::StatsMenu).await?;
            Ok(Some(id))
        }
        BasicPeriods => {
            let id = render_into(deps, ctx, &Menu::StatsBasicPeriods).await?;
            Ok(Some(id))
        }
        GetPeriod(period) => {
            let (from, to) = period_range(period, Utc::now().date_naive());
            let menu = Menu::StatsResult { label: period_label(from, to) };
            let id = render_into(deps, ctx, &menu).await?;
            Ok(Some(id))
        }
        SelectCustomDate => {
            let menu = Menu::StatsYearNav {
                context: "custom_date".to_string(),
                year: Utc::now().year(),
            };
            advance(deps, ctx, steps::STATS_CUSTOM_DATE, &menu).await
        }
        SelectCustomPeriod => {
            let menu = Menu::StatsYearNav {
                context: "custom_period".to_string(),
                year: Utc::now().year(),
            };
            advance(deps, ctx, steps::STATS_CUSTOM_PERIOD, &menu).await
        }
        SelectMonth { context, year, month } => {
            let id = render_into(deps, ctx, &Menu::StatsMonthDays { context, year, month })
                .await?;
            Ok(Some(id))
        }
        SelectDay { date, .. } => {
            // A single-day period: same date on both ends.
            let menu = Menu::StatsResult { label: period_label(date, date) };
            let id = render_into(deps, ctx, &menu).await?;
            Ok(Some(id))
        }
        YearNav { context, year } => {
            let id = render_into(deps, ctx, &Menu::StatsYearNav { context, year }).await?;
            Ok(Some(id))
        }
        ExcelMenu => {
            let id = render_into(deps, ctx, &Menu::ExcelMenu).await?;
            Ok(Some(id))
        }
        ExcelGenerate { report } => {
            // The export runs out-of-band; notify in a fresh message and
            // leave the menu alone (the command is delete-exempt).
            tracing::info!(chat = ctx.chat_id.0, report = %report, "export requested");
            deps.screens
                .render(ctx.chat_id, None, &ctx.user, &Menu::ExcelQueued { report })
                .await?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_day_periods() {
        let today = d(2025, 6, 16);
        assert_eq!(period_range(StatsPeriod::Today, today), (today, today));
        assert_eq!(
            period_range(StatsPeriod::Yesterday, today),
            (d(2025, 6, 15), d(2025, 6, 15))
        );
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-06-18 is a Wednesday.
        let today = d(2025, 6, 18);
        assert_eq!(
            period_range(StatsPeriod::CurrentWeek, today),
            (d(2025, 6, 16), today)
        );
        assert_eq!(
            period_range(StatsPeriod::LastWeek, today),
            (d(2025, 6, 9), d(2025, 6, 15))
        );
    }

    #[test]
    fn month_ranges() {
        let today = d(2025, 3, 10);
        assert_eq!(
            period_range(StatsPeriod::CurrentMonth, today),
            (d(2025, 3, 1), today)
        );
        assert_eq!(
            period_range(StatsPeriod::LastMonth, today),
            (d(2025, 2, 1), d(2025, 2, 28))
        );
    }

    #[test]
    fn labels_collapse_single_days() {
        assert_eq!(period_label(d(2025, 6, 15), d(2025, 6, 15)), "2025-06-15");
        assert_eq!(
            period_label(d(2025, 6, 1), d(2025, 6, 15)),
            "2025-06-01 — 2025-06-15"
        );
    }
}
