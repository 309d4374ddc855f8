use clap::Parser;
use log::warn;

use asrs_scraping::{
    asrs::Asrs,
    batch_driver::{BatchConfig, MonthlyBatchDriver},
    schema::{MonthRange, MonthTarget},
    session::WizardSession,
};

/// Downloads ASRS reports as one CSV file per month.
#[derive(Parser)]
struct Opts {
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    start_year: i32,
    /// 1-12
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    start_month: u8,
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    end_year: i32,
    /// 1-12
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    end_month: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let start = MonthTarget::from_calendar(opts.start_year, opts.start_month)?;
    let end = MonthTarget::from_calendar(opts.end_year, opts.end_month)?;
    if start > end {
        warn!("The start {start} is after the end {end}; nothing to do.");
    }

    let driver = MonthlyBatchDriver::<Asrs>::new(BatchConfig::builder().build())?;
    // Per-month failures are logged by the driver and do not affect the exit status.
    driver
        .run(MonthRange::new(start, end), || {
            Ok(WizardSession::new::<Asrs>()?)
        })
        .await;
    Ok(())
}
