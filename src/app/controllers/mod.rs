pub mod accounting;
pub mod customers;
pub mod dashboard;
pub mod partners;
pub mod reports;
pub mod reservations;

pub use accounting::AccountingPage;
pub use customers::CustomersPage;
pub use dashboard::DashboardPage;
pub use partners::PartnersPage;
pub use reports::ReportsPage;
pub use reservations::ReservationsPage;
