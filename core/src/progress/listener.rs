use std::sync::Arc;

use crate::error::ProgressError;

use super::status::ProgressStatus;
use super::{DetailedProgressListener, ProgressListener};

const MAX_PERCENT: u8 = 100;

/// Maps stage-scoped progress events onto a shared [`ProgressStatus`].
///
/// Each stage is declared with the share of the 0–100 budget it consumes;
/// raw `current / total` reports within a stage are scaled into that share,
/// so the displayed percent of stage *n* always stays within
/// `[offset, offset + weight]`. When a new stage starts, the offset advances
/// by the full declared weight of the previous stage, whether or not the
/// previous stage reported itself complete.
///
/// One instance per execution unit. `&mut self` throughout: the listener is
/// owned by the single worker running the unit's command and is not meant to
/// be shared.
pub struct WeightedProgressListener {
    status: Arc<ProgressStatus>,
    /// Budget still available for stages yet to be declared.
    remaining: u8,
    /// Percent at which the current stage's range begins.
    offset: u8,
    /// Declared weight of the current stage.
    stage_weight: u8,
    stage_description: String,
    started: bool,
}

impl WeightedProgressListener {
    pub fn new(status: Arc<ProgressStatus>) -> Self {
        Self {
            status,
            remaining: MAX_PERCENT,
            offset: 0,
            stage_weight: 0,
            stage_description: String::new(),
            started: false,
        }
    }
}

impl ProgressListener for WeightedProgressListener {
    fn in_progress(&mut self, total: i64, current: i64) -> Result<(), ProgressError> {
        if current < 0 {
            return Err(ProgressError::NegativeProgress { current, total });
        }
        if !self.started {
            return Err(ProgressError::NoActiveStage);
        }

        // Buffered producers can report past the estimated total; anything
        // beyond it earns the stage's full share.
        let sub_percent = if current > total {
            self.stage_weight
        } else {
            let ratio = current as f64 / total as f64;
            (f64::from(self.stage_weight) * ratio).ceil() as u8
        };

        self.status
            .set_percent(self.offset + sub_percent, &self.stage_description);
        Ok(())
    }
}

impl DetailedProgressListener for WeightedProgressListener {
    fn progress_started(&mut self, description: &str, weight: u8) -> Result<(), ProgressError> {
        if weight > self.remaining {
            return Err(ProgressError::BudgetExceeded {
                requested: weight,
                remaining: self.remaining,
            });
        }

        if self.started {
            // The previous stage's range is spent in full, regardless of the
            // last value it actually reported.
            self.offset += self.stage_weight;
        }
        self.status.set_percent(self.offset, description);

        self.started = true;
        self.stage_weight = weight;
        self.remaining -= weight;
        self.stage_description = description.to_string();
        Ok(())
    }

    fn ended(&mut self, success: bool, message: &str) {
        if success {
            self.status.set_done(message);
        } else {
            self.status.set_error(message);
        }
    }
}
