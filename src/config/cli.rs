use crate::config::ErpConfig;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tour-erp")]
#[command(about = "Command-line client for the tour ERP backend")]
pub struct CliConfig {
    /// TOML configuration file
    #[arg(long, env = "TOUR_ERP_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "TOUR_ERP_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "TOUR_ERP_TOKEN_FILE")]
    pub token_file: Option<String>,

    /// Refresh the access token once and retry when the server answers 401
    #[arg(long)]
    pub auto_refresh: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// File values (or defaults), then command-line overrides, then validation.
    pub fn resolve(&self) -> Result<ErpConfig> {
        let mut config = match &self.config {
            Some(path) => ErpConfig::from_file(path)?,
            None => ErpConfig::default(),
        };
        config.apply_overrides(
            self.base_url.as_deref(),
            self.token_file.as_deref(),
            self.auto_refresh.then_some(true),
        );
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Login {
        username: String,
        #[arg(long, env = "TOUR_ERP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Register {
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
    },
    /// Show the logged-in user (and the staff list for admins)
    Whoami,
    Customers(CustomersCommand),
    Partners(PartnersCommand),
    Reservations(ReservationsCommand),
    Transactions(TransactionsCommand),
    Reports(ReportsCommand),
    /// Raw authenticated call through the gateway
    Request {
        path: String,
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,
        /// JSON request body
        #[arg(long, short = 'd')]
        data: Option<String>,
        /// Treat the response as binary and write it to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct CustomersCommand {
    #[command(subcommand)]
    pub command: CustomersSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum CustomersSubcommand {
    List {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        name: String,
        phone_number: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    Update {
        id: i64,
        name: String,
        phone_number: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    Delete {
        id: i64,
    },
    /// Tab-separated file: header line, then name, phone, email
    Import {
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct PartnersCommand {
    #[command(subcommand)]
    pub command: PartnersSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum PartnersSubcommand {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        name: String,
        #[arg(long, default_value = "OTHER")]
        category: String,
        #[arg(long, default_value = "")]
        contact_person: String,
        #[arg(long, default_value = "")]
        phone_number: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Delete {
        id: i64,
    },
    /// Tab-separated rows without header: name, category, contact, phone, email, address, notes
    Import {
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ReservationsCommand {
    #[command(subcommand)]
    pub command: ReservationsSubcommand,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ReservationFilterArgs {
    #[arg(long)]
    pub search: Option<String>,
    /// TOUR, RENTAL_CAR, ACCOMMODATION, GOLF, TICKET or OTHER
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Manager user id
    #[arg(long)]
    pub manager: Option<i64>,
    /// Start date lower bound (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Start date upper bound (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsSubcommand {
    List {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
        #[command(flatten)]
        filters: ReservationFilterArgs,
    },
    Show {
        id: i64,
    },
    /// Delete one reservation, or several at once
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Sales per category
    Summary {
        #[command(flatten)]
        filters: ReservationFilterArgs,
    },
    /// Tab-separated file: header line, then no, customer, reservation date,
    /// start date, category, tour, cost, price, balance, status, manager
    Import {
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct TransactionsCommand {
    #[command(subcommand)]
    pub command: TransactionsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum TransactionsSubcommand {
    List {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Add {
        /// YYYY-MM-DD
        date: String,
        /// INCOME or EXPENSE
        kind: String,
        amount: i64,
        description: String,
        #[arg(long)]
        expense_item: Option<String>,
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        reservation: Option<i64>,
        #[arg(long)]
        partner: Option<i64>,
    },
    Summary {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
}

#[derive(Debug, Args)]
pub struct ReportsCommand {
    #[command(subcommand)]
    pub command: ReportsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportsSubcommand {
    Summary {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        manager: Option<i64>,
    },
    /// Sales grouped by month, category, manager or product
    Sales {
        #[arg(long, default_value = "month")]
        group_by: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Download the reservation CSV export
    Export {
        #[arg(long, short = 'o', default_value = "reservations.csv")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;

    #[test]
    fn test_parse_nested_subcommand() {
        let cli = CliConfig::try_parse_from([
            "tour-erp",
            "--base-url",
            "https://erp.example.com/api",
            "reservations",
            "list",
            "--page",
            "3",
            "--category",
            "GOLF",
        ])
        .unwrap();

        match cli.command {
            Command::Reservations(ReservationsCommand {
                command: ReservationsSubcommand::List { page, filters },
            }) => {
                assert_eq!(page, 3);
                assert_eq!(filters.category.as_deref(), Some("GOLF"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let cli = CliConfig::try_parse_from([
            "tour-erp",
            "--base-url",
            "https://erp.example.com/api",
            "--token-file",
            "/tmp/erp-tokens.json",
            "--auto-refresh",
            "logout",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.api_base_url(), "https://erp.example.com/api");
        assert_eq!(config.token_file(), "/tmp/erp-tokens.json");
        assert!(config.auto_refresh());
    }

    #[test]
    fn test_resolve_rejects_bad_url() {
        let cli = CliConfig::try_parse_from(["tour-erp", "--base-url", "ftp://nope", "whoami"])
            .unwrap();
        assert!(cli.resolve().is_err());
    }

    #[test]
    fn test_reservation_delete_requires_ids() {
        assert!(CliConfig::try_parse_from(["tour-erp", "reservations", "delete"]).is_err());
    }

    #[test]
    fn test_page_zero_is_rejected() {
        assert!(CliConfig::try_parse_from(["tour-erp", "customers", "list", "--page", "0"]).is_err());
        assert!(
            CliConfig::try_parse_from(["tour-erp", "transactions", "list", "--page", "0"]).is_err()
        );
        assert!(CliConfig::try_parse_from(["tour-erp", "customers", "list"]).is_ok());
    }

    #[test]
    fn test_parse_reservation_import() {
        let cli = CliConfig::try_parse_from(["tour-erp", "reservations", "import", "rows.tsv"])
            .unwrap();
        match cli.command {
            Command::Reservations(ReservationsCommand {
                command: ReservationsSubcommand::Import { file },
            }) => assert_eq!(file, PathBuf::from("rows.tsv")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
