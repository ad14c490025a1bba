use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use tour_erp::app::controllers::partners::BulkOutcome;
use tour_erp::app::controllers::reports::{ReportFilters, SalesGrouping};
use tour_erp::app::controllers::reservations::ReservationFilters;
use tour_erp::app::controllers::{
    AccountingPage, CustomersPage, DashboardPage, PartnersPage, ReportsPage, ReservationsPage,
};
use tour_erp::domain::model::{PartnerCategory, ReservationCategory};
use tour_erp::{ApiGateway, ErpError, MemorySurface, MemoryTokenStore, Session};

fn session(server: &MockServer) -> Session<MemoryTokenStore, MemorySurface> {
    Session::new(ApiGateway::new(
        server.url("/api"),
        MemoryTokenStore::with_access_token("tok"),
        MemorySurface::new(),
    ))
}

fn customer(id: i64, name: &str) -> serde_json::Value {
    json!({"id": id, "name": name, "phone_number": "010-0000", "email": null})
}

#[tokio::test]
async fn test_customers_pagination_follows_envelope() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/customers/")
                .query_param("page", "1")
                .query_param("page_size", "2");
            then.status(200).json_body(json!({
                "results": [customer(1, "Kim"), customer(2, "Lee")],
                "count": 5,
                "next": "http://example/api/customers/?page=2",
                "previous": null
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/customers/")
                .query_param("page", "2");
            then.status(200).json_body(json!({
                "results": [customer(3, "Park"), customer(4, "Choi")],
                "count": 5,
                "next": "http://example/api/customers/?page=3",
                "previous": "http://example/api/customers/?page=1"
            }));
        })
        .await;

    let session = session(&server);
    let mut page = CustomersPage::new(&session, 2);

    let first = page.load(1).await?;
    assert_eq!(first.len(), 2);
    assert_eq!(page.state().total_pages(), 3);
    assert!(page.state().has_next());
    assert!(page.previous().await?.is_none());

    let second = page.next().await?.expect("second page");
    assert_eq!(second[0].name, "Park");
    assert_eq!(page.state().current_page(), 2);
    assert_eq!(page.state().summary(), "Page 2 / 3 (5 total)");
    Ok(())
}

#[tokio::test]
async fn test_customer_search_resets_to_first_page() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/customers/")
                .query_param("page", "1")
                .query_param("search", "kim");
            then.status(200)
                .json_body(json!({"results": [customer(1, "Kim")], "count": 1}));
        })
        .await;

    let session = session(&server);
    let mut page = CustomersPage::new(&session, 50);
    let rows = page.search("  kim ").await?;

    mock.assert_async().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(page.state().total_pages(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_load_resets_page_state() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/customers/");
            then.status(500).body("boom");
        })
        .await;

    let session = session(&server);
    let mut page = CustomersPage::new(&session, 50);

    assert!(page.load(3).await.is_err());
    assert_eq!(page.state().current_page(), 1);
    assert_eq!(page.state().total_count(), 0);
    assert_eq!(session.gateway().surface().alerts().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_customer_bulk_import_posts_parsed_rows() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/customers/bulk/").json_body(json!([
                {"name": "Kim", "phone_number": "010-1111", "email": "kim@example.com"},
                {"name": "Lee", "phone_number": "010-2222", "email": ""}
            ]));
            then.status(201).json_body(json!({"created": 2}));
        })
        .await;

    let session = session(&server);
    let page = CustomersPage::new(&session, 50);
    let tsv = "name\tphone\temail\nKim\t010-1111\tkim@example.com\nLee\t010-2222\n";
    let result = page.bulk_import(tsv).await?;

    mock.assert_async().await;
    assert_eq!(result["created"], 2);
    Ok(())
}

#[tokio::test]
async fn test_customer_bulk_import_without_rows_sends_nothing() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/customers/bulk/");
            then.status(201);
        })
        .await;

    let session = session(&server);
    let page = CustomersPage::new(&session, 50);
    let result = page.bulk_import("name\tphone\nonly-one-column\n").await;

    assert!(matches!(result, Err(ErpError::ValidationError { .. })));
    mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_partner_bulk_create_counts_each_outcome() -> Result<()> {
    let server = MockServer::start_async().await;
    let accepted = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/partners/")
                .body_contains("Sunrise Hotel");
            then.status(201)
                .json_body(json!({"id": 10, "name": "Sunrise Hotel", "category": "HOTEL"}));
        })
        .await;
    let rejected = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/partners/")
                .body_contains("Broken Air");
            then.status(400)
                .json_body(json!({"email": ["Enter a valid email address."]}));
        })
        .await;

    let session = session(&server);
    let page = PartnersPage::new(&session);
    let pasted = "Sunrise Hotel\tHOTEL\tMs. Linh\nBroken Air\tAIRLINE\t\t\tnot-an-email\n";
    let outcome = page.bulk_create(pasted).await?;

    accepted.assert_async().await;
    rejected.assert_async().await;
    assert_eq!(
        outcome,
        BulkOutcome {
            succeeded: 1,
            failed: 1
        }
    );
    assert_eq!(session.gateway().surface().alerts().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_partner_list_passes_search() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/partners/")
                .query_param("search", "hotel");
            then.status(200).json_body(json!([
                {"id": 1, "name": "Sunrise Hotel", "category": "HOTEL"},
                {"id": 2, "name": "Hotel Cruise", "category": "CRUISE"}
            ]));
        })
        .await;

    let session = session(&server);
    let partners = PartnersPage::new(&session).list(Some("hotel")).await?;

    assert_eq!(partners.len(), 2);
    assert_eq!(partners[1].category, PartnerCategory::Other);
    Ok(())
}

#[tokio::test]
async fn test_reservation_filters_and_category_summary() -> Result<()> {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/reservations/")
                .query_param("page", "1")
                .query_param("category", "GOLF")
                .query_param("start_date__gte", "2024-03-01");
            then.status(200).json_body(json!({
                "results": [{"id": 4, "tour_name": "Ba Na Hills golf", "category": "GOLF",
                             "total_price": "2000000", "total_cost": "1500000"}],
                "count": 1
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/reservations/summary/")
                .query_param("group_by", "category");
            then.status(200).json_body(json!([
                {"category": "TOUR", "sales": "1500000", "count": 3},
                {"category": "GOLF", "sales": 200000, "count": 1}
            ]));
        })
        .await;

    let session = session(&server);
    let mut page = ReservationsPage::new(&session, 50);
    let filters = ReservationFilters {
        category: Some(ReservationCategory::Golf),
        start_date_gte: Some("2024-03-01".to_string()),
        ..Default::default()
    };
    page.set_filters(&filters);
    let rows = page.load(1).await?;

    list.assert_async().await;
    assert_eq!(rows[0].margin(), 500_000);

    let summary = page.category_summary(&ReservationFilters::default()).await?;
    assert_eq!(summary.len(), ReservationCategory::ALL.len());
    assert_eq!(summary[0], (ReservationCategory::Tour, 1_500_000));
    assert_eq!(summary[1], (ReservationCategory::RentalCar, 0));
    assert!(summary.contains(&(ReservationCategory::Golf, 200_000)));
    Ok(())
}

#[tokio::test]
async fn test_reservation_bulk_delete() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/reservations/bulk-delete/")
                .json_body(json!({"ids": [1, 2]}));
            then.status(200).json_body(json!({"deleted": 2}));
        })
        .await;

    let session = session(&server);
    let page = ReservationsPage::new(&session, 50);

    assert!(matches!(
        page.bulk_delete(&[]).await,
        Err(ErpError::ValidationError { .. })
    ));
    let result = page.bulk_delete(&[1, 2]).await?;

    mock.assert_hits_async(1).await;
    assert_eq!(result["deleted"], 2);
    Ok(())
}

#[tokio::test]
async fn test_reservation_bulk_import_matches_names() -> Result<()> {
    let server = MockServer::start_async().await;
    let customers = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/customers/")
                .query_param("page_size", "10000");
            then.status(200)
                .json_body(json!({"results": [customer(7, "Kim")], "count": 1}));
        })
        .await;
    let users = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/");
            then.status(200)
                .json_body(json!([{"id": 2, "username": "minji", "is_superuser": false}]));
        })
        .await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/reservations/bulk/").json_body(json!([
                {
                    "customer_id": 7,
                    "reservation_date": "2025-03-01",
                    "start_date": "2025-04-10",
                    "category": "GOLF",
                    "tour_name": "Da Nang Golf",
                    "total_cost": 800000,
                    "total_price": 1200000,
                    "payment_amount": 1000000,
                    "status": "PAID",
                    "manager_id": 2,
                    "details": {},
                    "requests": "",
                    "notes": "Bulk import (customer: Kim, manager: minji)"
                },
                {
                    "customer_id": null,
                    "reservation_date": "2025-03-02",
                    "start_date": null,
                    "category": "TOUR",
                    "tour_name": "Hoi An",
                    "total_cost": 100,
                    "total_price": 300,
                    "payment_amount": 300,
                    "status": "CONFIRMED",
                    "manager_id": null,
                    "details": {},
                    "requests": "",
                    "notes": "Bulk import (customer: Nobody, manager: ghost) [warning: customer 'Nobody' not found] [warning: manager 'ghost' not found]"
                }
            ]));
            then.status(201).json_body(json!({"created": 2}));
        })
        .await;

    let session = session(&server);
    let page = ReservationsPage::new(&session, 50);
    let tsv = "no\tcustomer\tbooked\tstart\tcategory\ttour\tcost\tprice\tbalance\tstatus\tmanager\n\
               1\tKim\t2025-03-01\t2025-04-10\tGOLF\tDa Nang Golf\t800000\t1200000\t200000\tPAID\tminji\n\
               2\tNobody\t2025-03-02\t\tTOUR\tHoi An\t100\t300\t0\t\tghost";

    let result = page.bulk_import(tsv).await?;

    customers.assert_async().await;
    users.assert_async().await;
    upload.assert_async().await;
    assert_eq!(result["created"], 2);
    Ok(())
}

#[tokio::test]
async fn test_reservation_bulk_import_without_rows_sends_nothing() -> Result<()> {
    let server = MockServer::start_async().await;
    let customers = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/customers/");
            then.status(200).json_body(json!({"results": [], "count": 0}));
        })
        .await;

    let session = session(&server);
    let page = ReservationsPage::new(&session, 50);
    let result = page.bulk_import("no\tcustomer\n1\tKim").await;

    assert!(matches!(result, Err(ErpError::ValidationError { .. })));
    customers.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_transaction_form_options_load_together() -> Result<()> {
    let server = MockServer::start_async().await;
    let reservations = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/reservations/")
                .query_param("page_size", "10000");
            then.status(200).json_body(json!({
                "results": [{"id": 1, "tour_name": "Hoi An night tour"}],
                "count": 1
            }));
        })
        .await;
    let partners = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/partners/");
            then.status(200)
                .json_body(json!([{"id": 7, "name": "Car Co", "category": "RENTAL"}]));
        })
        .await;

    let session = session(&server);
    let options = AccountingPage::new(&session, 50).form_options().await?;

    reservations.assert_async().await;
    partners.assert_async().await;
    assert_eq!(options.reservations[0].tour_name, "Hoi An night tour");
    assert_eq!(options.partners[0].name, "Car Co");
    Ok(())
}

#[tokio::test]
async fn test_transaction_summary_for_month() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/transactions/summary/")
                .query_param("year", "2024")
                .query_param("month", "7");
            then.status(200).json_body(json!({
                "total_income": "3000000.00",
                "total_expense": 1200000,
                "balance": "1800000",
                "income_cash": 1000000
            }));
        })
        .await;

    let session = session(&server);
    let summary = AccountingPage::new(&session, 50)
        .summary(Some(2024), Some(7))
        .await?;

    mock.assert_async().await;
    assert_eq!(summary.total_income, 3_000_000);
    assert_eq!(summary.balance, 1_800_000);
    assert_eq!(summary.expense_card, 0);
    Ok(())
}

#[tokio::test]
async fn test_report_summary_uses_month_range() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/reservations/summary/")
                .query_param("start_date__gte", "2024-02-01")
                .query_param("start_date__lte", "2024-02-29");
            then.status(200).json_body(json!({
                "totals": {"total_sales": "5000000", "total_cost": "3000000", "total_margin": "2000000"},
                "manager_counts": [{"manager__username": "kim", "count": 4}]
            }));
        })
        .await;

    let session = session(&server);
    let summary = ReportsPage::new(&session)
        .summary(&ReportFilters {
            year: Some(2024),
            month: Some(2),
            ..Default::default()
        })
        .await?;

    mock.assert_async().await;
    assert_eq!(summary.totals.total_margin, 2_000_000);
    assert_eq!(summary.manager_counts[0].manager_username.as_deref(), Some("kim"));
    Ok(())
}

#[tokio::test]
async fn test_sales_grouped_by_manager() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/reservations/summary/")
                .query_param("group_by", "manager")
                .query_param("year", "2024");
            then.status(200).json_body(json!([
                {"manager__username": "kim", "sales": "900000", "count": 2}
            ]));
        })
        .await;

    let session = session(&server);
    let groups = ReportsPage::new(&session)
        .sales_by(SalesGrouping::Manager, Some(2024), None)
        .await?;

    assert_eq!(groups[0].manager_username.as_deref(), Some("kim"));
    assert_eq!(groups[0].sales, 900_000);
    Ok(())
}

#[tokio::test]
async fn test_export_csv_writes_file() -> Result<()> {
    let server = MockServer::start_async().await;
    let csv = "id,tour_name,total_price\n1,Ha Long Bay,1500000\n";
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/export-reservations-csv/");
            then.status(200)
                .header("Content-Type", "text/csv; charset=utf-8")
                .body(csv);
        })
        .await;

    let temp_dir = TempDir::new()?;
    let destination = temp_dir.path().join("exports").join("reservations.csv");

    let session = session(&server);
    let written = ReportsPage::new(&session).export_csv(&destination).await?;

    assert_eq!(written, csv.len());
    assert_eq!(std::fs::read_to_string(&destination)?, csv);
    Ok(())
}

#[tokio::test]
async fn test_dashboard_admin_sees_staff() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/user-info/");
            then.status(200)
                .json_body(json!({"id": 1, "username": "boss", "is_superuser": true}));
        })
        .await;
    let users = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/");
            then.status(200).json_body(json!([
                {"id": 1, "username": "boss", "is_superuser": true},
                {"id": 2, "username": "guide"}
            ]));
        })
        .await;

    let session = session(&server);
    let view = DashboardPage::new(&session).load().await?;

    users.assert_async().await;
    assert!(view.show_admin_menu);
    assert_eq!(view.users.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_dashboard_regular_user_skips_staff_list() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/user-info/");
            then.status(200)
                .json_body(json!({"id": 2, "username": "guide", "is_superuser": false}));
        })
        .await;
    let users = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/");
            then.status(200).json_body(json!([]));
        })
        .await;

    let session = session(&server);
    let view = DashboardPage::new(&session).load().await?;

    users.assert_hits_async(0).await;
    assert!(!view.show_admin_menu);
    assert_eq!(view.users, vec![view.user.clone()]);
    Ok(())
}
