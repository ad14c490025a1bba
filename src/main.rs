use clap::Parser;
use reqwest::Method;
use tour_erp::app::controllers::accounting::TransactionFilters;
use tour_erp::app::controllers::reports::{ReportFilters, SalesGrouping};
use tour_erp::app::controllers::reservations::ReservationFilters;
use tour_erp::app::controllers::{
    AccountingPage, CustomersPage, DashboardPage, PartnersPage, ReportsPage, ReservationsPage,
};
use tour_erp::app::render;
use tour_erp::config::cli::{
    Command, CustomersSubcommand, PartnersSubcommand, ReportsSubcommand, ReservationFilterArgs,
    ReservationsSubcommand, TransactionsSubcommand,
};
use tour_erp::core::gateway::{ApiResponse, RequestBody, RequestOptions, ResponseKind};
use tour_erp::core::ConfigProvider;
use tour_erp::domain::model::{
    NewCustomer, NewPartner, NewTransaction, PartnerCategory, ReservationCategory,
    TransactionType,
};
use tour_erp::utils::error::{ErpError, ErrorCategory, ErrorSeverity, Result};
use tour_erp::utils::logger;
use tour_erp::{ApiGateway, CliConfig, ConsoleSurface, ErpConfig, FileTokenStore, Session};

type CliSession = Session<FileTokenStore, ConsoleSurface>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_format);
    tracing::info!("Starting tour-erp CLI");

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    let store = FileTokenStore::new(config.token_file());
    let gateway = ApiGateway::from_config(&config, store, ConsoleSurface);
    let session = Session::new(gateway);

    if let Err(e) = run(&session, &config, cli.command).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        // Gateway failures were already shown through the surface.
        if !matches!(
            e.category(),
            ErrorCategory::Network | ErrorCategory::Server
        ) {
            eprintln!("❌ {}", e.user_friendly_message());
        }
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(session: &CliSession, config: &ErpConfig, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let user = session.login(&username, &password).await?;
            println!("✅ Logged in as {}", render::user(&user));
        }
        Command::Logout => {
            session.logout().await;
            println!("👋 Logged out");
        }
        Command::Register {
            username,
            password,
            password_confirm,
        } => {
            let user = session
                .register(&username, &password, &password_confirm)
                .await?;
            println!("✅ Account '{}' created. You can now log in.", user.username);
        }
        Command::Whoami => {
            let view = DashboardPage::new(session).load().await?;
            println!("{}", render::dashboard(&view));
        }
        Command::Customers(cmd) => customers(session, config, cmd.command).await?,
        Command::Partners(cmd) => partners(session, cmd.command).await?,
        Command::Reservations(cmd) => reservations(session, config, cmd.command).await?,
        Command::Transactions(cmd) => transactions(session, config, cmd.command).await?,
        Command::Reports(cmd) => reports(session, cmd.command).await?,
        Command::Request {
            path,
            method,
            data,
            output,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes()).map_err(|e| {
                ErpError::ValidationError {
                    message: format!("Invalid HTTP method '{}': {}", method, e),
                }
            })?;
            let body = match data {
                Some(text) => RequestBody::Text(text),
                None => RequestBody::Empty,
            };
            let kind = if output.is_some() {
                ResponseKind::Blob
            } else {
                ResponseKind::Json
            };

            let response = session
                .gateway()
                .request(&path, RequestOptions::new(method).with_body(body), kind)
                .await?;
            match (response, output) {
                (ApiResponse::Blob(bytes), Some(output)) => {
                    tokio::fs::write(&output, &bytes).await?;
                    println!("💾 {} bytes written to {}", bytes.len(), output.display());
                }
                (ApiResponse::Json(value), _) => {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                _ => println!("(no content)"),
            }
        }
    }
    Ok(())
}

async fn customers(
    session: &CliSession,
    config: &ErpConfig,
    command: CustomersSubcommand,
) -> Result<()> {
    session.require_login().await?;
    let mut page = CustomersPage::new(session, config.page_size());

    match command {
        CustomersSubcommand::List { page: number, search } => {
            let rows = match search {
                Some(term) => page.search(&term).await?,
                None => page.load(number).await?,
            };
            println!("{}", render::customers(&rows));
            println!("{}", render::pager(page.state()));
        }
        CustomersSubcommand::Add {
            name,
            phone_number,
            email,
        } => {
            let created = page
                .create(&NewCustomer {
                    name,
                    phone_number,
                    email,
                })
                .await?;
            println!("✅ Customer #{} created", created.id);
        }
        CustomersSubcommand::Update {
            id,
            name,
            phone_number,
            email,
        } => {
            page.update(
                id,
                &NewCustomer {
                    name,
                    phone_number,
                    email,
                },
            )
            .await?;
            println!("✅ Customer #{} updated", id);
        }
        CustomersSubcommand::Delete { id } => {
            page.delete(id).await?;
            println!("🗑️ Customer #{} deleted", id);
        }
        CustomersSubcommand::Import { file } => {
            let tsv = tokio::fs::read_to_string(&file).await?;
            let result = page.bulk_import(&tsv).await?;
            println!("✅ Import finished: {}", result);
        }
    }
    Ok(())
}

async fn partners(session: &CliSession, command: PartnersSubcommand) -> Result<()> {
    session.require_login().await?;
    let page = PartnersPage::new(session);

    match command {
        PartnersSubcommand::List { search } => {
            let rows = page.list(search.as_deref()).await?;
            println!("{}", render::partners(&rows));
        }
        PartnersSubcommand::Add {
            name,
            category,
            contact_person,
            phone_number,
            email,
            address,
            notes,
        } => {
            let category: PartnerCategory = parse_choice("category", &category)?;
            let created = page
                .create(&NewPartner {
                    name,
                    category,
                    contact_person,
                    phone_number,
                    email,
                    address,
                    notes,
                })
                .await?;
            println!("✅ Partner #{} created", created.id);
        }
        PartnersSubcommand::Delete { id } => {
            page.delete(id).await?;
            println!("🗑️ Partner #{} deleted", id);
        }
        PartnersSubcommand::Import { file } => {
            let pasted = tokio::fs::read_to_string(&file).await?;
            let outcome = page.bulk_create(&pasted).await?;
            println!(
                "✅ {} partners imported, {} failed",
                outcome.succeeded, outcome.failed
            );
        }
    }
    Ok(())
}

fn reservation_filters(args: ReservationFilterArgs) -> Result<ReservationFilters> {
    let category = args
        .category
        .map(|c| parse_choice::<ReservationCategory>("category", &c))
        .transpose()?;
    Ok(ReservationFilters {
        search: args.search,
        category,
        status: args.status.map(|s| s.to_uppercase()),
        manager: args.manager,
        start_date_gte: args.from,
        start_date_lte: args.to,
    })
}

async fn reservations(
    session: &CliSession,
    config: &ErpConfig,
    command: ReservationsSubcommand,
) -> Result<()> {
    session.require_login().await?;
    let mut page = ReservationsPage::new(session, config.page_size());

    match command {
        ReservationsSubcommand::List {
            page: number,
            filters,
        } => {
            page.set_filters(&reservation_filters(filters)?);
            let rows = page.load(number).await?;
            println!("{}", render::reservations(&rows));
            println!("{}", render::pager(page.state()));
        }
        ReservationsSubcommand::Show { id } => {
            let reservation = page.detail(id).await?;
            println!("{}", render::reservation_detail(&reservation));
        }
        ReservationsSubcommand::Delete { ids } => {
            if let [id] = ids.as_slice() {
                page.delete(*id).await?;
            } else {
                page.bulk_delete(&ids).await?;
            }
            println!("🗑️ {} reservation(s) deleted", ids.len());
        }
        ReservationsSubcommand::Summary { filters } => {
            let sales = page
                .category_summary(&reservation_filters(filters)?)
                .await?;
            println!("{}", render::category_sales(&sales));
        }
        ReservationsSubcommand::Import { file } => {
            let tsv = tokio::fs::read_to_string(&file).await?;
            let result = page.bulk_import(&tsv).await?;
            println!("✅ Import finished: {}", result);
        }
    }
    Ok(())
}

async fn transactions(
    session: &CliSession,
    config: &ErpConfig,
    command: TransactionsSubcommand,
) -> Result<()> {
    session.require_login().await?;
    let mut page = AccountingPage::new(session, config.page_size());

    match command {
        TransactionsSubcommand::List {
            page: number,
            search,
            from,
            to,
        } => {
            page.set_filters(&TransactionFilters {
                search,
                date_after: from,
                date_before: to,
            });
            let rows = page.load(number).await?;
            println!("{}", render::transactions(&rows));
            println!("{}", render::pager(page.state()));
        }
        TransactionsSubcommand::Add {
            date,
            kind,
            amount,
            description,
            expense_item,
            payment_method,
            reservation,
            partner,
        } => {
            let transaction_date = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| ErpError::ValidationError {
                    message: format!("Invalid date '{}': {}", date, e),
                })?;
            let transaction_type: TransactionType = parse_choice("kind", &kind)?;
            let created = page
                .create(&NewTransaction {
                    transaction_date,
                    transaction_type,
                    amount,
                    description,
                    expense_item,
                    payment_method,
                    reservation_id: reservation,
                    partner_id: partner,
                    ..Default::default()
                })
                .await?;
            println!("✅ Transaction #{} recorded", created.id);
        }
        TransactionsSubcommand::Summary { year, month } => {
            let summary = page.summary(year, month).await?;
            println!("{}", render::transaction_summary(&summary));
        }
    }
    Ok(())
}

async fn reports(session: &CliSession, command: ReportsSubcommand) -> Result<()> {
    session.require_login().await?;
    let page = ReportsPage::new(session);

    match command {
        ReportsSubcommand::Summary {
            year,
            month,
            category,
            manager,
        } => {
            let category = category
                .map(|c| parse_choice::<ReservationCategory>("category", &c))
                .transpose()?;
            let summary = page
                .summary(&ReportFilters {
                    year,
                    month,
                    category,
                    search: None,
                    manager,
                })
                .await?;
            println!("{}", render::reservation_summary(&summary));
        }
        ReportsSubcommand::Sales {
            group_by,
            year,
            month,
        } => {
            let grouping = match group_by.to_lowercase().as_str() {
                "month" => SalesGrouping::Month,
                "category" => SalesGrouping::Category,
                "manager" => SalesGrouping::Manager,
                "product" => SalesGrouping::Product,
                other => {
                    return Err(ErpError::ValidationError {
                        message: format!(
                            "Unknown grouping '{}'. Use month, category, manager or product.",
                            other
                        ),
                    })
                }
            };
            let groups = page.sales_by(grouping, year, month).await?;
            println!("{}", render::sales_groups(&groups));
        }
        ReportsSubcommand::Export { output } => {
            let written = page.export_csv(&output).await?;
            println!("💾 {} bytes written to {}", written, output.display());
        }
    }
    Ok(())
}

/// Parses an upper-case wire value into one of the model enums. Values the
/// enum does not know are rejected instead of falling back to its catch-all.
fn parse_choice<T>(field: &str, raw: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned + serde::Serialize,
{
    let wire = raw.trim().to_uppercase();
    let value: T = serde_json::from_value(serde_json::Value::String(wire.clone()))?;
    if serde_json::to_value(&value)? != serde_json::Value::String(wire) {
        return Err(ErpError::ValidationError {
            message: format!("Unknown {} '{}'", field, raw),
        });
    }
    Ok(value)
}
