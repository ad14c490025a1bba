use crate::core::endpoint::{item_path, with_query};
use crate::core::session::Session;
use crate::core::{Surface, TokenStore};
use crate::domain::model::{NewPartner, Partner, PartnerCategory};
use crate::utils::error::{ErpError, Result};
use futures::future::join_all;

const RESOURCE: &str = "partners";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct PartnersPage<'a, S: TokenStore, U: Surface> {
    session: &'a Session<S, U>,
}

impl<'a, S: TokenStore, U: Surface> PartnersPage<'a, S, U> {
    pub fn new(session: &'a Session<S, U>) -> Self {
        Self { session }
    }

    /// The partner list is not paginated.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Partner>> {
        let path = with_query(RESOURCE, [("search", search.unwrap_or("").trim())]);
        self.session.gateway().get(&path).await
    }

    pub async fn create(&self, partner: &NewPartner) -> Result<Partner> {
        self.session.gateway().post(RESOURCE, partner).await
    }

    pub async fn update(&self, id: i64, partner: &NewPartner) -> Result<Partner> {
        self.session
            .gateway()
            .put(&item_path(RESOURCE, id), partner)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.session.gateway().delete(&item_path(RESOURCE, id)).await
    }

    /// Creates every pasted partner in parallel and waits for all of them.
    /// Each failure has already been alerted by the gateway; it is only
    /// counted here.
    pub async fn bulk_create(&self, pasted: &str) -> Result<BulkOutcome> {
        let partners = parse_partner_rows(pasted)?;
        if partners.is_empty() {
            return Err(ErpError::ValidationError {
                message: "There is no data to import.".to_string(),
            });
        }

        let results = join_all(partners.iter().map(|p| self.create(p))).await;

        let outcome = results.iter().fold(BulkOutcome::default(), |mut acc, r| {
            match r {
                Ok(_) => acc.succeeded += 1,
                Err(e) => {
                    tracing::warn!("Partner import failed: {}", e);
                    acc.failed += 1;
                }
            }
            acc
        });
        tracing::info!(
            "📥 Partner import finished: {} succeeded, {} failed",
            outcome.succeeded,
            outcome.failed
        );
        Ok(outcome)
    }
}

fn parse_category(raw: &str) -> PartnerCategory {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_uppercase()))
        .unwrap_or_default()
}

/// Columns: name, category, contact person, phone, email, address, notes.
/// No header line; rows without a name or with fewer than two columns are skipped.
pub fn parse_partner_rows(pasted: &str) -> Result<Vec<NewPartner>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(pasted.trim().as_bytes());

    let mut partners = Vec::new();
    for record in reader.records() {
        let record = record?;
        let column = |i: usize| record.get(i).unwrap_or_default().to_string();
        if record.len() < 2 || column(0).is_empty() {
            continue;
        }
        partners.push(NewPartner {
            name: column(0),
            category: parse_category(&column(1)),
            contact_person: column(2),
            phone_number: column(3),
            email: column(4),
            address: column(5),
            notes: column(6),
        });
    }
    Ok(partners)
}
