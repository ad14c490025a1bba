use crate::app::controllers::reservations::ReservationFilters;
use crate::core::endpoint::with_query;
use crate::core::session::Session;
use crate::core::{Surface, TokenStore};
use crate::domain::model::{ReservationCategory, ReservationSummary, SalesGroup};
use crate::utils::error::{ErpError, Result};
use chrono::{Datelike, NaiveDate};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesGrouping {
    Month,
    Category,
    Manager,
    Product,
}

impl SalesGrouping {
    fn as_str(&self) -> &'static str {
        match self {
            SalesGrouping::Month => "month",
            SalesGrouping::Category => "category",
            SalesGrouping::Manager => "manager",
            SalesGrouping::Product => "product",
        }
    }
}

/// Report filter form: a year (optionally narrowed to one month) becomes a
/// `start_date` range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub category: Option<ReservationCategory>,
    pub search: Option<String>,
    pub manager: Option<i64>,
}

impl ReportFilters {
    pub fn to_reservation_filters(&self) -> Result<ReservationFilters> {
        let (start, end) = match (self.year, self.month) {
            (Some(year), Some(month)) => {
                let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                    ErpError::ValidationError {
                        message: format!("Invalid month {}-{}", year, month),
                    }
                })?;
                (Some(first), Some(last_day_of_month(first)))
            }
            (Some(year), None) => (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            ),
            _ => (None, None),
        };

        Ok(ReservationFilters {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            category: self.category,
            status: None,
            manager: self.manager,
            start_date_gte: start.map(|d| d.format("%Y-%m-%d").to_string()),
            start_date_lte: end.map(|d| d.format("%Y-%m-%d").to_string()),
        })
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

pub struct ReportsPage<'a, S: TokenStore, U: Surface> {
    session: &'a Session<S, U>,
}

impl<'a, S: TokenStore, U: Surface> ReportsPage<'a, S, U> {
    pub fn new(session: &'a Session<S, U>) -> Self {
        Self { session }
    }

    pub async fn summary(&self, filters: &ReportFilters) -> Result<ReservationSummary> {
        let pairs = filters.to_reservation_filters()?.to_pairs();
        let path = with_query(
            "reservations/summary",
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        self.session.gateway().get(&path).await
    }

    pub async fn sales_by(
        &self,
        grouping: SalesGrouping,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<SalesGroup>> {
        let year = year.map(|y| y.to_string()).unwrap_or_default();
        let month = month.map(|m| m.to_string()).unwrap_or_default();
        let path = with_query(
            "reservations/summary",
            [
                ("group_by", grouping.as_str()),
                ("year", year.as_str()),
                ("month", month.as_str()),
            ],
        );
        self.session.gateway().get(&path).await
    }

    /// Downloads the reservation CSV export and writes it to `destination`.
    pub async fn export_csv(&self, destination: &Path) -> Result<usize> {
        let bytes = self
            .session
            .gateway()
            .get_blob("export-reservations-csv/")
            .await?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(destination, &bytes).await?;
        tracing::info!("💾 Wrote {} bytes to {}", bytes.len(), destination.display());
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_and_month_become_date_range() {
        let filters = ReportFilters {
            year: Some(2024),
            month: Some(2),
            ..Default::default()
        };
        let converted = filters.to_reservation_filters().unwrap();
        assert_eq!(converted.start_date_gte.as_deref(), Some("2024-02-01"));
        assert_eq!(converted.start_date_lte.as_deref(), Some("2024-02-29"));
    }

    #[test]
    fn test_december_and_whole_year() {
        let december = ReportFilters {
            year: Some(2023),
            month: Some(12),
            ..Default::default()
        };
        let converted = december.to_reservation_filters().unwrap();
        assert_eq!(converted.start_date_lte.as_deref(), Some("2023-12-31"));

        let whole_year = ReportFilters {
            year: Some(2023),
            search: Some("  ".to_string()),
            ..Default::default()
        };
        let converted = whole_year.to_reservation_filters().unwrap();
        assert_eq!(converted.start_date_gte.as_deref(), Some("2023-01-01"));
        assert_eq!(converted.start_date_lte.as_deref(), Some("2023-12-31"));
        assert!(converted.search.is_none());
    }

    #[test]
    fn test_month_without_year_is_ignored_and_bad_month_rejected() {
        let only_month = ReportFilters {
            month: Some(5),
            ..Default::default()
        };
        assert!(only_month.to_reservation_filters().unwrap().start_date_gte.is_none());

        let bad = ReportFilters {
            year: Some(2024),
            month: Some(13),
            ..Default::default()
        };
        assert!(bad.to_reservation_filters().is_err());
    }
}
