use crate::core::endpoint::item_path;
use crate::core::pagination::PageState;
use crate::core::session::Session;
use crate::core::{Page, Surface, TokenStore};
use crate::domain::model::{Customer, NewCustomer};
use crate::utils::error::{ErpError, Result};

const RESOURCE: &str = "customers";

pub struct CustomersPage<'a, S: TokenStore, U: Surface> {
    session: &'a Session<S, U>,
    state: PageState,
}

impl<'a, S: TokenStore, U: Surface> CustomersPage<'a, S, U> {
    pub fn new(session: &'a Session<S, U>, page_size: u64) -> Self {
        Self {
            session,
            state: PageState::new(page_size),
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub async fn load(&mut self, page: u64) -> Result<Vec<Customer>> {
        let path = self.state.query_path(RESOURCE, page);
        match self.session.gateway().get::<Page<Customer>>(&path).await {
            Ok(envelope) => {
                self.state.apply(page, &envelope);
                tracing::debug!("📋 Loaded {} customers ({})", envelope.results.len(), self.state.summary());
                Ok(envelope.results)
            }
            Err(e) => {
                self.state.reset();
                Err(e)
            }
        }
    }

    pub async fn search(&mut self, term: &str) -> Result<Vec<Customer>> {
        self.state.set_filters([("search", term.trim())]);
        self.load(1).await
    }

    pub async fn next(&mut self) -> Result<Option<Vec<Customer>>> {
        match self.state.next_page() {
            Some(page) => self.load(page).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn previous(&mut self) -> Result<Option<Vec<Customer>>> {
        match self.state.previous_page() {
            Some(page) => self.load(page).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer> {
        self.session.gateway().post(RESOURCE, customer).await
    }

    pub async fn update(&self, id: i64, customer: &NewCustomer) -> Result<Customer> {
        self.session
            .gateway()
            .put(&item_path(RESOURCE, id), customer)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.session.gateway().delete(&item_path(RESOURCE, id)).await
    }

    /// Uploads tab-separated rows (header line first) to `customers/bulk/`.
    pub async fn bulk_import(&self, tsv: &str) -> Result<serde_json::Value> {
        let customers = parse_customer_rows(tsv)?;
        if customers.is_empty() {
            return Err(ErpError::ValidationError {
                message: "No rows could be converted. Check the format.".to_string(),
            });
        }
        tracing::info!("📤 Sending {} customers to the server", customers.len());
        self.session.gateway().post("customers/bulk/", &customers).await
    }
}

/// Columns: name, phone number, email. The first line is a header; rows
/// with fewer than two columns are skipped.
pub fn parse_customer_rows(tsv: &str) -> Result<Vec<NewCustomer>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(tsv.trim().as_bytes());

    let mut customers = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        customers.push(NewCustomer {
            name: record.get(0).unwrap_or_default().to_string(),
            phone_number: record.get(1).unwrap_or_default().to_string(),
            email: record.get(2).unwrap_or_default().to_string(),
        });
    }
    Ok(customers)
}
