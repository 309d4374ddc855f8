use std::{marker::PhantomData, path::PathBuf, time::Duration};

use anyhow::Context;
use itertools::Itertools;
use log::{error, info};
use reqwest::StatusCode;
use tokio::time::sleep;
use typed_builder::TypedBuilder;

use crate::{
    api::{ExportOutcome, WizardClient},
    fs_util,
    schema::{DateRange, MonthRange, MonthTarget},
    session::SessionClient,
    wizard_trait::QueryWizard,
};

pub const DATA_DIR: &str = "data";

#[derive(Debug, TypedBuilder)]
pub struct BatchConfig {
    #[builder(default = PathBuf::from(DATA_DIR), setter(into))]
    pub output_dir: PathBuf,
    /// Pause after each month, to go easy on the server.
    #[builder(default = Duration::from_secs(2))]
    pub interval: Duration,
}

#[derive(Debug)]
pub enum MonthStatus {
    Saved(PathBuf),
    Rejected(StatusCode),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub months: Vec<(MonthTarget, MonthStatus)>,
}
impl BatchReport {
    pub fn saved(&self) -> impl Iterator<Item = MonthTarget> + '_ {
        self.months
            .iter()
            .filter(|(_, status)| matches!(status, MonthStatus::Saved(_)))
            .map(|&(month, _)| month)
    }

    /// Months without an output file, for whatever reason.
    pub fn missing(&self) -> impl Iterator<Item = MonthTarget> + '_ {
        self.months
            .iter()
            .filter(|(_, status)| !matches!(status, MonthStatus::Saved(_)))
            .map(|&(month, _)| month)
    }
}

/// Runs one full wizard traversal per month, each on a fresh session.
pub struct MonthlyBatchDriver<T> {
    config: BatchConfig,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: QueryWizard> MonthlyBatchDriver<T> {
    pub fn new(config: BatchConfig) -> anyhow::Result<Self> {
        fs_util::ensure_dir(&config.output_dir)?;
        Ok(Self {
            config,
            _phantom: PhantomData,
        })
    }

    pub fn output_path(&self, month: MonthTarget) -> PathBuf {
        self.config.output_dir.join(format!(
            "{}_{}_{}.{}",
            T::EXPORT_FILE_PREFIX,
            month.year(),
            month.month().name(),
            T::EXPORT_FILE_EXTENSION,
        ))
    }

    /// Never fails as a whole: a month that errors is logged and skipped.
    pub async fn run<C, F>(&self, months: MonthRange, mut new_session: F) -> BatchReport
    where
        C: SessionClient,
        F: FnMut() -> anyhow::Result<C>,
    {
        let mut report = BatchReport::default();
        for month in months {
            info!("--- Processing {month} ---");
            let result = self
                .process_month(month, &mut new_session)
                .await
                .with_context(|| format!("While processing {month}"));
            let status = match result {
                Ok(ExportOutcome::Saved { path, .. }) => MonthStatus::Saved(path),
                Ok(ExportOutcome::Rejected(status)) => MonthStatus::Rejected(status),
                Err(e) => {
                    error!("{e:#}");
                    MonthStatus::Failed(format!("{e:#}"))
                }
            };
            report.months.push((month, status));
            sleep(self.config.interval).await;
        }

        info!(
            "Finished {} month(s); saved {}.",
            report.months.len(),
            report.saved().count()
        );
        let missing = report.missing().join(", ");
        if !missing.is_empty() {
            info!("No file was written for: {missing}");
        }
        report
    }

    async fn process_month<C, F>(
        &self,
        month: MonthTarget,
        new_session: &mut F,
    ) -> anyhow::Result<ExportOutcome>
    where
        C: SessionClient,
        F: FnMut() -> anyhow::Result<C>,
    {
        // A new session per month, so that filters and dates never carry over.
        let client = WizardClient::<T, _>::new(new_session()?);
        let state = client.initialize().await?;
        client.add_date_filter(state).await?.into_state()?;
        let state = client.set_date_range(DateRange::single(month)).await?;
        client.run_search(state).await?.into_state()?;
        client.export_result(&self.output_path(month)).await
    }
}
