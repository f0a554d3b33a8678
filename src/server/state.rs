use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

use crate::{
    config::{AppConfig, Zone},
    dates::{RangeError, resolve_filter},
    loader::{ImportReport, parse_visitor_csv},
    mock,
    models::{DashboardData, FilterOptions, VisitorData},
    stats::build_dashboard,
    storage::Repository,
    utils::Timer,
};

/// Shared by every handler.
pub struct State {
    pub config: AppConfig,
    pub repo: Repository,
    zone: Zone,
}

impl State {
    pub fn new(config: AppConfig, repo: Repository) -> Arc<Self> {
        let zone = config.locale.zone();
        Arc::new(Self { config, repo, zone })
    }

    /// Build the repository from generated seed data and wrap it in state.
    pub fn seeded(config: AppConfig) -> Arc<Self> {
        let _t = Timer::start("Seed data generation");
        let now = Utc::now();
        let mut rng = match config.data.seed {
            Some(seed) => {
                info!("Using fixed data seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let transactions = mock::generate_transactions(
            config.data.transaction_count,
            config.data.history_months,
            now,
            &mut rng,
        );
        let months = config.data.history_months;
        let visitors = match config.locale.zone() {
            Zone::Named(tz) => mock::generate_visitors(months, now, &tz, &mut rng),
            Zone::Fixed(offset) => mock::generate_visitors(months, now, &offset, &mut rng),
            Zone::Local => mock::generate_visitors(months, now, &Local, &mut rng),
        };

        Self::new(config, Repository::new(transactions, visitors))
    }

    /// Resolve the filter's range and aggregate the current records.
    pub fn dashboard(&self, filter: &FilterOptions, now: DateTime<Utc>) -> Result<DashboardData, RangeError> {
        match self.zone {
            Zone::Named(tz) => self.dashboard_in(filter, now, &tz),
            Zone::Fixed(offset) => self.dashboard_in(filter, now, &offset),
            Zone::Local => self.dashboard_in(filter, now, &Local),
        }
    }

    fn dashboard_in<Tz: TimeZone>(
        &self,
        filter: &FilterOptions,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<DashboardData, RangeError> {
        let range = resolve_filter(filter, now, tz)?;
        let visitors = self.repo.visitors();
        Ok(build_dashboard(self.repo.transactions(), &visitors, filter, range, tz))
    }

    pub fn parse_import(&self, body: &[u8]) -> Result<ImportReport> {
        match self.zone {
            Zone::Named(tz) => parse_visitor_csv(body, &tz),
            Zone::Fixed(offset) => parse_visitor_csv(body, &offset),
            Zone::Local => parse_visitor_csv(body, &Local),
        }
    }

    /// Commit an import only when every row validated.
    pub fn import(&self, report: &ImportReport) -> usize {
        if !report.is_clean() {
            return 0;
        }
        self.append(report.data.clone())
    }

    pub fn append(&self, records: Vec<VisitorData>) -> usize {
        self.repo.append_visitors(records)
    }
}
