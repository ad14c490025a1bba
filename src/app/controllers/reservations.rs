use crate::core::endpoint::{item_path, with_query};
use crate::core::pagination::PageState;
use crate::core::session::Session;
use crate::core::{Page, Surface, TokenStore};
use crate::domain::model::{
    BulkDeleteRequest, BulkReservation, Customer, NewReservation, Reservation,
    ReservationCategory, ReservationStatus, SalesGroup, User,
};
use crate::utils::error::{ErpError, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const RESOURCE: &str = "reservations";
const IMPORT_COLUMNS: usize = 11;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilters {
    pub search: Option<String>,
    pub category: Option<ReservationCategory>,
    pub status: Option<String>,
    pub manager: Option<i64>,
    pub start_date_gte: Option<String>,
    pub start_date_lte: Option<String>,
}

impl ReservationFilters {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key.to_string(), value));
            }
        };
        push("search", self.search.clone());
        push("category", self.category.map(|c| c.as_str().to_string()));
        push("status", self.status.clone());
        push("manager", self.manager.map(|m| m.to_string()));
        push("start_date__gte", self.start_date_gte.clone());
        push("start_date__lte", self.start_date_lte.clone());
        pairs
    }
}

pub struct ReservationsPage<'a, S: TokenStore, U: Surface> {
    session: &'a Session<S, U>,
    state: PageState,
}

impl<'a, S: TokenStore, U: Surface> ReservationsPage<'a, S, U> {
    pub fn new(session: &'a Session<S, U>, page_size: u64) -> Self {
        Self {
            session,
            state: PageState::new(page_size),
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn set_filters(&mut self, filters: &ReservationFilters) {
        self.state.set_filters(filters.to_pairs());
    }

    pub async fn load(&mut self, page: u64) -> Result<Vec<Reservation>> {
        let path = self.state.query_path(RESOURCE, page);
        match self.session.gateway().get::<Page<Reservation>>(&path).await {
            Ok(envelope) => {
                self.state.apply(page, &envelope);
                Ok(envelope.results)
            }
            Err(e) => {
                self.state.reset();
                Err(e)
            }
        }
    }

    pub async fn next(&mut self) -> Result<Option<Vec<Reservation>>> {
        match self.state.next_page() {
            Some(page) => self.load(page).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn previous(&mut self) -> Result<Option<Vec<Reservation>>> {
        match self.state.previous_page() {
            Some(page) => self.load(page).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn detail(&self, id: i64) -> Result<Reservation> {
        self.session.gateway().get(&item_path(RESOURCE, id)).await
    }

    /// Every reservation, unpaginated (calendar/booking board source).
    pub async fn all(&self) -> Result<Vec<Reservation>> {
        self.session.gateway().get("reservations/all/").await
    }

    pub async fn create(&self, reservation: &NewReservation) -> Result<Reservation> {
        self.session.gateway().post(RESOURCE, reservation).await
    }

    pub async fn update(&self, id: i64, reservation: &NewReservation) -> Result<Reservation> {
        self.session
            .gateway()
            .put(&item_path(RESOURCE, id), reservation)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.session.gateway().delete(&item_path(RESOURCE, id)).await
    }

    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<serde_json::Value> {
        if ids.is_empty() {
            return Err(ErpError::ValidationError {
                message: "Select at least one reservation to delete.".to_string(),
            });
        }
        tracing::info!("🗑️ Deleting {} reservations", ids.len());
        self.session
            .gateway()
            .post("reservations/bulk-delete/", &BulkDeleteRequest { ids })
            .await
    }

    /// Uploads pasted reservation rows to `reservations/bulk/`. Customer and
    /// manager names are matched against the full customer list and the
    /// staff list, loaded side by side.
    pub async fn bulk_import(&self, tsv: &str) -> Result<serde_json::Value> {
        let rows = parse_reservation_rows(tsv)?;
        if rows.is_empty() {
            return Err(ErpError::ValidationError {
                message: "No rows could be converted. Check the format.".to_string(),
            });
        }

        let gateway = self.session.gateway();
        let (customers, users) = tokio::try_join!(
            gateway.get::<Page<Customer>>("customers?page_size=10000"),
            gateway.get::<Vec<User>>("users")
        )?;

        let today = chrono::Local::now().date_naive();
        let reservations: Vec<BulkReservation> = rows
            .into_iter()
            .map(|row| row.into_bulk(&customers.results, &users, today))
            .collect();

        let unmatched = reservations
            .iter()
            .filter(|r| r.customer_id.is_none() || r.manager_id.is_none())
            .count();
        if unmatched > 0 {
            tracing::warn!("⚠️ {} rows have an unmatched customer or manager", unmatched);
        }
        tracing::info!("📤 Sending {} reservations to the server", reservations.len());
        gateway.post("reservations/bulk", &reservations).await
    }

    /// Sales per category, every category present (zero when the server
    /// reports nothing for it), in display order.
    pub async fn category_summary(
        &self,
        filters: &ReservationFilters,
    ) -> Result<Vec<(ReservationCategory, i64)>> {
        let mut pairs = vec![("group_by".to_string(), "category".to_string())];
        pairs.extend(filters.to_pairs());
        let path = with_query(
            "reservations/summary",
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );

        let groups: Vec<SalesGroup> = self.session.gateway().get(&path).await?;
        let sales: BTreeMap<&str, i64> = groups
            .iter()
            .filter_map(|g| g.category.map(|c| (c.as_str(), g.sales)))
            .collect();

        Ok(ReservationCategory::ALL
            .iter()
            .map(|c| (*c, sales.get(c.as_str()).copied().unwrap_or(0)))
            .collect())
    }
}

/// A pasted reservation row before names are matched to ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRow {
    pub customer_name: String,
    pub reservation_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub category: ReservationCategory,
    pub tour_name: String,
    pub total_cost: i64,
    pub total_price: i64,
    pub balance: i64,
    pub status: ReservationStatus,
    pub manager_name: String,
}

impl ReservationRow {
    /// Resolves names to ids. An unmatched name leaves the id empty and
    /// adds a warning to the notes.
    pub fn into_bulk(self, customers: &[Customer], users: &[User], today: NaiveDate) -> BulkReservation {
        let customer_id = customers
            .iter()
            .find(|c| c.name == self.customer_name)
            .map(|c| c.id);
        let manager_id = users
            .iter()
            .find(|u| u.username == self.manager_name)
            .map(|u| u.id);

        let mut notes = format!(
            "Bulk import (customer: {}, manager: {})",
            self.customer_name, self.manager_name
        );
        if customer_id.is_none() {
            notes.push_str(&format!(" [warning: customer '{}' not found]", self.customer_name));
        }
        if manager_id.is_none() {
            notes.push_str(&format!(" [warning: manager '{}' not found]", self.manager_name));
        }

        BulkReservation {
            customer_id,
            reservation_date: self.reservation_date.unwrap_or(today),
            start_date: self.start_date,
            category: self.category,
            tour_name: self.tour_name,
            total_cost: self.total_cost,
            total_price: self.total_price,
            payment_amount: self.total_price - self.balance,
            status: self.status,
            manager_id,
            details: serde_json::json!({}),
            requests: String::new(),
            notes,
        }
    }
}

/// Columns: no, customer, reservation date, start date, category, tour,
/// cost, price, balance, status, manager. The first line is a header; rows
/// with fewer than eleven columns are skipped.
pub fn parse_reservation_rows(tsv: &str) -> Result<Vec<ReservationRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(tsv.trim().as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < IMPORT_COLUMNS {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let column = |i: usize| record.get(i).unwrap_or_default().trim();

        let status = match column(9) {
            "" => ReservationStatus::Confirmed,
            raw => match choice(raw) {
                ReservationStatus::Unknown => {
                    return Err(ErpError::ValidationError {
                        message: format!("Line {}: unknown status '{}'", line, raw),
                    })
                }
                status => status,
            },
        };
        let tour_name = match column(5) {
            "" => "Untitled".to_string(),
            name => name.to_string(),
        };

        rows.push(ReservationRow {
            customer_name: column(1).to_string(),
            reservation_date: parse_date(column(2), line)?,
            start_date: parse_date(column(3), line)?,
            category: match column(4) {
                "" => ReservationCategory::Tour,
                raw => choice(raw),
            },
            tour_name,
            total_cost: parse_amount(column(6)),
            total_price: parse_amount(column(7)),
            balance: parse_amount(column(8)),
            status,
            manager_name: column(10).to_string(),
        });
    }
    Ok(rows)
}

/// Upper-cased wire value, falling back to the enum's catch-all.
fn choice<T: serde::de::DeserializeOwned + Default>(raw: &str) -> T {
    serde_json::from_value(serde_json::Value::String(raw.to_uppercase())).unwrap_or_default()
}

fn parse_date(raw: &str, line: u64) -> Result<Option<NaiveDate>> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| ErpError::ValidationError {
            message: format!("Line {}: invalid date '{}': {}", line, raw, e),
        })
}

/// Spreadsheet amounts may carry thousands separators; anything unreadable is zero.
fn parse_amount(raw: &str) -> i64 {
    raw.replace(',', "")
        .parse::<f64>()
        .map(|v| v.round() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "no\tcustomer\tbooked\tstart\tcategory\ttour\tcost\tprice\tbalance\tstatus\tmanager";

    #[test]
    fn test_parse_reservation_rows_defaults_and_short_rows() {
        let tsv = format!(
            "{}\n1\tKim\t2025-03-01\t2025-04-10\tgolf\tDa Nang Golf\t800,000\t1,200,000\t200000\tpaid\tminji\nshort\trow\n2\tLee\t\t\t\t\t\t500\t\t\tnobody",
            HEADER
        );
        let rows = parse_reservation_rows(&tsv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, ReservationCategory::Golf);
        assert_eq!(rows[0].total_cost, 800_000);
        assert_eq!(rows[0].total_price, 1_200_000);
        assert_eq!(rows[0].status, ReservationStatus::Paid);
        assert_eq!(rows[0].start_date, NaiveDate::from_ymd_opt(2025, 4, 10));

        assert_eq!(rows[1].category, ReservationCategory::Tour);
        assert_eq!(rows[1].status, ReservationStatus::Confirmed);
        assert_eq!(rows[1].tour_name, "Untitled");
        assert_eq!(rows[1].reservation_date, None);
        assert_eq!(rows[1].total_price, 500);
        assert_eq!(rows[1].balance, 0);
    }

    #[test]
    fn test_parse_reservation_rows_rejects_bad_values() {
        let bad_date = format!("{}\n1\tKim\t03/01/2025\t\tTOUR\tx\t0\t0\t0\t\tminji", HEADER);
        assert!(matches!(
            parse_reservation_rows(&bad_date),
            Err(ErpError::ValidationError { .. })
        ));

        let bad_status = format!("{}\n1\tKim\t\t\tTOUR\tx\t0\t0\t0\tmaybe\tminji", HEADER);
        assert!(matches!(
            parse_reservation_rows(&bad_status),
            Err(ErpError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_into_bulk_matches_names_and_warns() {
        let customers = vec![Customer {
            id: 7,
            name: "Kim".to_string(),
            ..Default::default()
        }];
        let users = vec![User {
            id: 2,
            username: "minji".to_string(),
            is_superuser: false,
        }];
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let row = ReservationRow {
            customer_name: "Kim".to_string(),
            reservation_date: None,
            start_date: None,
            category: ReservationCategory::Tour,
            tour_name: "Hoi An".to_string(),
            total_cost: 100,
            total_price: 300,
            balance: 50,
            status: ReservationStatus::Confirmed,
            manager_name: "ghost".to_string(),
        };

        let bulk = row.into_bulk(&customers, &users, today);

        assert_eq!(bulk.customer_id, Some(7));
        assert_eq!(bulk.manager_id, None);
        assert_eq!(bulk.payment_amount, 250);
        assert_eq!(bulk.reservation_date, today);
        assert!(bulk.notes.contains("[warning: manager 'ghost' not found]"));
        assert!(!bulk.notes.contains("customer 'Kim' not found"));
    }

    #[test]
    fn test_filters_to_pairs_only_includes_set_values() {
        let filters = ReservationFilters {
            category: Some(ReservationCategory::RentalCar),
            manager: Some(4),
            ..Default::default()
        };
        assert_eq!(
            filters.to_pairs(),
            vec![
                ("category".to_string(), "RENTAL_CAR".to_string()),
                ("manager".to_string(), "4".to_string()),
            ]
        );
        assert!(ReservationFilters::default().to_pairs().is_empty());
    }
}
