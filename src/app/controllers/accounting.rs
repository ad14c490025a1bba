use crate::core::endpoint::{item_path, with_query};
use crate::core::pagination::PageState;
use crate::core::session::Session;
use crate::core::{Page, Surface, TokenStore};
use crate::domain::model::{
    NewTransaction, Partner, Reservation, Transaction, TransactionSummary, TransactionType,
};
use crate::utils::error::{ErpError, Result};

const RESOURCE: &str = "transactions";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    pub search: Option<String>,
    pub date_after: Option<String>,
    pub date_before: Option<String>,
}

impl TransactionFilters {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("search", &self.search),
            ("date_after", &self.date_after),
            ("date_before", &self.date_before),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.clone().map(|v| (k, v)))
        .collect()
    }
}

/// Choices for the new-transaction form.
#[derive(Debug, Clone, Default)]
pub struct TransactionFormOptions {
    pub reservations: Vec<Reservation>,
    pub partners: Vec<Partner>,
}

pub struct AccountingPage<'a, S: TokenStore, U: Surface> {
    session: &'a Session<S, U>,
    state: PageState,
}

impl<'a, S: TokenStore, U: Surface> AccountingPage<'a, S, U> {
    pub fn new(session: &'a Session<S, U>, page_size: u64) -> Self {
        Self {
            session,
            state: PageState::new(page_size),
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn set_filters(&mut self, filters: &TransactionFilters) {
        self.state.set_filters(filters.to_pairs());
    }

    pub async fn load(&mut self, page: u64) -> Result<Vec<Transaction>> {
        let path = self.state.query_path(RESOURCE, page);
        match self.session.gateway().get::<Page<Transaction>>(&path).await {
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

    /// Loads the reservation and partner option lists side by side.
    pub async fn form_options(&self) -> Result<TransactionFormOptions> {
        let gateway = self.session.gateway();
        let (reservations, partners) = tokio::try_join!(
            gateway.get::<Page<Reservation>>("reservations?page_size=10000"),
            gateway.get::<Vec<Partner>>("partners")
        )?;
        Ok(TransactionFormOptions {
            reservations: reservations.results,
            partners,
        })
    }

    pub async fn create(&self, transaction: &NewTransaction) -> Result<Transaction> {
        validate_transaction(transaction)?;
        self.session.gateway().post(RESOURCE, transaction).await
    }

    pub async fn update(&self, id: i64, transaction: &NewTransaction) -> Result<Transaction> {
        validate_transaction(transaction)?;
        self.session
            .gateway()
            .put(&item_path(RESOURCE, id), transaction)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.session.gateway().delete(&item_path(RESOURCE, id)).await
    }

    /// Income/expense totals, for one month when both `year` and `month` are given.
    pub async fn summary(&self, year: Option<i32>, month: Option<u32>) -> Result<TransactionSummary> {
        let path = match (year, month) {
            (Some(year), Some(month)) => {
                let (year, month) = (year.to_string(), month.to_string());
                with_query(
                    "transactions/summary",
                    [("year", year.as_str()), ("month", month.as_str())],
                )
            }
            _ => "transactions/summary".to_string(),
        };
        self.session.gateway().get(&path).await
    }
}

/// The form only offers an expense item for expenses.
fn validate_transaction(transaction: &NewTransaction) -> Result<()> {
    if transaction.transaction_type != TransactionType::Expense && transaction.expense_item.is_some()
    {
        return Err(ErpError::ValidationError {
            message: "An expense item can only be set on expense transactions.".to_string(),
        });
    }
    Ok(())
}
