use clap::Args;
use electoral_forecast::config::AppConfig;
use electoral_forecast::error::AppError;
use electoral_forecast::forecast::{
    DateKey, ForecastService, ForecastSummary, JsonDirectorySource, RatingOptionsPatch,
};
use std::fmt;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Forecast date (YYYYMMDD, YYYY-MM-DD, or `latest`). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<DateKey>,
    /// Directory holding evs.json and probabilities.json
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Disable the tilt rating bands
    #[arg(long)]
    pub(crate) no_tilts: bool,
    /// Never rate a state with a non-zero margin as a toss-up
    #[arg(long)]
    pub(crate) no_tossups: bool,
    /// Color states purely by which party leads
    #[arg(long)]
    pub(crate) solid_only: bool,
}

impl ReportArgs {
    fn overrides(&self) -> RatingOptionsPatch {
        RatingOptionsPatch {
            use_tilt: self.no_tilts.then_some(false),
            use_tossup: self.no_tossups.then_some(false),
            solid_only: self.solid_only.then_some(true),
        }
    }
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(data_dir) = args.data_dir.clone() {
        config.data.data_dir = data_dir;
    }

    let date = match args.date {
        Some(date) => date,
        None => ForecastService::parse_date("today")?,
    };

    let service = ForecastService::new(config.data.election()?)?;
    service
        .load(&JsonDirectorySource::new(config.data.data_dir.clone()))
        .await?;

    let summary = service.summary(&date, &args.overrides())?;
    print!("{}", SummaryReport(&summary));
    Ok(())
}

/// Plain-text rendering of a [`ForecastSummary`].
pub(crate) struct SummaryReport<'a>(pub(crate) &'a ForecastSummary);

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "Electoral forecast for {}", summary.date.to_separated("-"))?;
        writeln!(
            f,
            "  {} (D) {} EV | {} (R) {} EV",
            summary.candidates.democrat,
            summary.electoral_votes.democrat,
            summary.candidates.republican,
            summary.electoral_votes.republican
        )?;
        match &summary.leading_candidate {
            Some(leader) => writeln!(f, "  Leading: {leader}")?,
            None => writeln!(f, "  Leading: tied")?,
        }

        match &summary.national {
            Some(national) => writeln!(
                f,
                "  Popular vote {:.1}% | Electoral college {:.1}% (as of {})",
                national.popular_vote,
                national.electoral_college,
                national.as_of.to_separated("-")
            )?,
            None => writeln!(f, "  No national snapshot on or before this date")?,
        }

        writeln!(f, "\nStates")?;
        for record in &summary.states {
            let as_of = record
                .as_of
                .map(|date| date.to_separated("-"))
                .unwrap_or_else(|| "no data".to_string());
            let change = if record.daily_change.is_empty() {
                "-"
            } else {
                record.daily_change.text.as_str()
            };
            writeln!(
                f,
                "  - {:<16} {:>2} EV  D {:>5.1}% / R {:>5.1}%  {:<8}  {:<8}  ({})",
                record.state,
                record.electoral_votes,
                record.probability.democrat,
                record.probability.republican,
                record.rating.label(),
                change,
                as_of
            )?;
        }

        Ok(())
    }
}
