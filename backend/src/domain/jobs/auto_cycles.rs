//! Daily auto-creation of recurring rapid and seed cycles.
//!
//! When a rapid or seed cycle closed within the lookback window and no
//! same-type cycle still closes in the future, the job clones it: same
//! info URL, same question set and order, a fresh fortnight window
//! starting at the old close, and a title rebuilt from the type's
//! recurring prefix and the new window dates. Open drafts on the closed
//! cycle move onto the clone so applicants keep their work.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::cycle::{CycleQuestion, CycleReportQuestion, GrantCycle};
use crate::domain::draft_service::DraftService;
use crate::domain::cycle_service::CycleService;
use crate::domain::ports::{CycleRepository, DraftRepository, JobRunRepository};
use crate::domain::Error;

use super::{map_run_ledger_error, JobKind, JobReport, JobRun};

/// How far behind "now" the job looks for freshly closed cycles.
pub const LOOKBACK_HOURS: i64 = 2;

/// Length of the window appended to the prior close.
pub const SUCCESSOR_WINDOW_DAYS: i64 = 14;

/// Clones recently closed recurring cycles into a fresh window.
#[derive(Clone)]
pub struct AutoCycleJob {
    cycles: Arc<dyn CycleRepository>,
    drafts: Arc<dyn DraftRepository>,
    runs: Arc<dyn JobRunRepository>,
    clock: Arc<dyn Clock>,
}

impl AutoCycleJob {
    /// Create a new job over the given ports.
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        drafts: Arc<dyn DraftRepository>,
        runs: Arc<dyn JobRunRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            drafts,
            runs,
            clock,
        }
    }

    /// Run the job once; a second run on the same day is a no-op.
    pub async fn run(&self) -> Result<JobReport, Error> {
        let now = self.clock.utc();
        if let Some(prior) = self
            .runs
            .find_run(JobKind::AutoCycles, now.date_naive())
            .await
            .map_err(map_run_ledger_error)?
        {
            return Ok(JobReport {
                kind: JobKind::AutoCycles,
                skipped: true,
                outcome: prior.outcome,
            });
        }

        let window_start = now - Duration::hours(LOOKBACK_HOURS);
        let closed = self
            .cycles
            .list_recently_closed(window_start, now)
            .await
            .map_err(CycleService::map_cycle_error)?;

        let mut created = 0_usize;
        for cycle in &closed {
            if self.clone_cycle(cycle, now).await? {
                created += 1;
            }
        }

        let outcome = format!("created {created} of {}", closed.len());
        let run = JobRun::started(JobKind::AutoCycles, now, outcome.clone());
        self.runs.record(&run).await.map_err(map_run_ledger_error)?;
        Ok(JobReport {
            kind: JobKind::AutoCycles,
            skipped: false,
            outcome,
        })
    }

    /// Clone one closed cycle; returns whether a successor was created.
    async fn clone_cycle(&self, cycle: &GrantCycle, now: DateTime<Utc>) -> Result<bool, Error> {
        let Some(prefix) = cycle.cycle_type.recurring_title_prefix() else {
            return Ok(false);
        };
        if self
            .cycles
            .successor_exists(cycle.cycle_type, now)
            .await
            .map_err(CycleService::map_cycle_error)?
        {
            return Ok(false);
        }
        let Some(detail) = self
            .cycles
            .detail(cycle.id)
            .await
            .map_err(CycleService::map_cycle_error)?
        else {
            warn!(cycle_id = %cycle.id, "closed cycle vanished before cloning");
            return Ok(false);
        };

        let open_time = cycle.close_time;
        let close_time = open_time + Duration::days(SUCCESSOR_WINDOW_DAYS);
        let title = format!(
            "{prefix} {} - {}",
            open_time.format("%-m.%-d.%Y"),
            close_time.format("%-m.%-d.%Y"),
        );
        let mut builder = GrantCycle::builder(title, cycle.cycle_type)
            .open_time(open_time)
            .close_time(close_time)
            .private(cycle.private);
        if let Some(url) = &cycle.info_url {
            builder = builder.info_url(url.clone());
        }
        let successor = builder.build();

        let questions: Vec<CycleQuestion> = detail
            .questions
            .iter()
            .map(|assembled| CycleQuestion {
                id: uuid::Uuid::new_v4(),
                cycle_id: successor.id,
                question_id: assembled.question.id,
                order: assembled.order,
            })
            .collect();
        let report_questions: Vec<CycleReportQuestion> = detail
            .report_questions
            .iter()
            .map(|assembled| CycleReportQuestion {
                id: uuid::Uuid::new_v4(),
                cycle_id: successor.id,
                report_question_id: assembled.question.id,
                order: assembled.order,
                required: assembled.required,
            })
            .collect();

        self.cycles
            .create(&successor, &questions, &report_questions)
            .await
            .map_err(CycleService::map_cycle_error)?;
        let moved = self
            .drafts
            .reassign_cycle(cycle.id, successor.id)
            .await
            .map_err(DraftService::map_draft_error)?;
        info!(
            predecessor_id = %cycle.id,
            successor_id = %successor.id,
            cycle_type = %successor.cycle_type,
            drafts_moved = moved,
            "recurring cycle cloned"
        );
        Ok(true)
    }
}
