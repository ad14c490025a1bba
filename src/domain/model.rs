use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerCategory {
    Hotel,
    Airline,
    Rental,
    Restaurant,
    Agency,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: PartnerCategory,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPartner {
    pub name: String,
    pub category: PartnerCategory,
    pub contact_person: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Paid,
    Completed,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Deposit,
    Paid,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationCategory {
    #[default]
    Tour,
    RentalCar,
    Accommodation,
    Golf,
    Ticket,
    #[serde(other)]
    Other,
}

impl ReservationCategory {
    pub const ALL: [ReservationCategory; 6] = [
        ReservationCategory::Tour,
        ReservationCategory::RentalCar,
        ReservationCategory::Accommodation,
        ReservationCategory::Golf,
        ReservationCategory::Ticket,
        ReservationCategory::Other,
    ];

    /// Wire value, as used in query filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationCategory::Tour => "TOUR",
            ReservationCategory::RentalCar => "RENTAL_CAR",
            ReservationCategory::Accommodation => "ACCOMMODATION",
            ReservationCategory::Golf => "GOLF",
            ReservationCategory::Ticket => "TICKET",
            ReservationCategory::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub manager: Option<User>,
    #[serde(default)]
    pub tour_name: String,
    #[serde(default)]
    pub reservation_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_price: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_cost: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub payment_amount: i64,
    #[serde(default)]
    pub status: ReservationStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub category: ReservationCategory,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub requests: String,
    #[serde(default)]
    pub special_notes: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl Reservation {
    pub fn margin(&self) -> i64 {
        self.total_price - self.total_cost
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub tour_name: String,
    pub category: ReservationCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub total_price: i64,
    pub total_cost: i64,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub notes: String,
}

/// One row of a `reservations/bulk/` upload. Customer and manager are
/// sent as null when their names could not be matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkReservation {
    pub customer_id: Option<i64>,
    pub reservation_date: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub category: ReservationCategory,
    pub tour_name: String,
    pub total_cost: i64,
    pub total_price: i64,
    pub payment_amount: i64,
    pub status: ReservationStatus,
    pub manager_id: Option<i64>,
    pub details: serde_json::Value,
    pub requests: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[default]
    Income,
    Expense,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Completed,
    Hold,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expense_item: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub reservation: Option<Reservation>,
    #[serde(default)]
    pub partner: Option<Partner>,
    #[serde(default)]
    pub manager: Option<User>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub description: String,
    pub expense_item: Option<String>,
    pub payment_method: Option<String>,
    pub processing_status: ProcessingStatus,
    pub manager_id: Option<i64>,
    pub reservation_id: Option<i64>,
    pub partner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_income: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_expense: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub balance: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub income_card: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub income_cash: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub income_transfer: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub expense_card: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub expense_cash: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub expense_transfer: i64,
}

/// One row of a `reservations/summary/?group_by=...` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesGroup {
    #[serde(default)]
    pub category: Option<ReservationCategory>,
    #[serde(default)]
    pub tour_name: Option<String>,
    #[serde(default, rename = "manager__username")]
    pub manager_username: Option<String>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub sales: i64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_sales: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_cost: i64,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_margin: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerCount {
    #[serde(default, rename = "manager__username")]
    pub manager_username: Option<String>,
    #[serde(default)]
    pub count: u64,
}

/// Ungrouped `reservations/summary/` response used by the reports page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    #[serde(default)]
    pub totals: SummaryTotals,
    #[serde(default)]
    pub manager_counts: Vec<ManagerCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeleteRequest<'a> {
    pub ids: &'a [i64],
}

/// DecimalFields arrive as strings ("150000") or numbers depending on the
/// serializer; both map to whole currency units.
mod amount {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Null,
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(v),
            Raw::Float(v) => Ok(v.round() as i64),
            Raw::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(0);
                }
                trimmed
                    .parse::<f64>()
                    .map(|v| v.round() as i64)
                    .map_err(serde::de::Error::custom)
            }
            Raw::Null => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reservation_tolerates_string_amounts_and_missing_fields() {
        let raw = json!({
            "id": 7,
            "tour_name": "Ha Long Bay",
            "total_price": "1500000",
            "total_cost": 900000,
            "status": "CONFIRMED",
            "category": "GOLF",
            "start_date": "2024-05-01",
            "customer": {"id": 3, "name": "Kim", "phone_number": "010"}
        });

        let reservation: Reservation = serde_json::from_value(raw).unwrap();
        assert_eq!(reservation.total_price, 1_500_000);
        assert_eq!(reservation.margin(), 600_000);
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert_eq!(reservation.category, ReservationCategory::Golf);
        assert_eq!(reservation.payment_status, PaymentStatus::Unpaid);
        assert_eq!(reservation.customer.unwrap().name, "Kim");
        assert!(reservation.manager.is_none());
    }

    #[test]
    fn test_unknown_enum_values_do_not_fail() {
        let raw = json!({"status": "ARCHIVED", "category": "CRUISE"});
        let reservation: Reservation = serde_json::from_value(raw).unwrap();
        assert_eq!(reservation.status, ReservationStatus::Unknown);
        assert_eq!(reservation.category, ReservationCategory::Other);
    }

    #[test]
    fn test_envelope_defaults() {
        let page: Page<Customer> = serde_json::from_value(json!({"count": 0})).unwrap();
        assert!(page.results.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_new_reservation_skips_absent_links() {
        let payload = NewReservation {
            tour_name: "City tour".to_string(),
            category: ReservationCategory::RentalCar,
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["category"], "RENTAL_CAR");
        assert!(value.get("customer_id").is_none());
    }
}
