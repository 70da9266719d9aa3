//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use jifeng_core::{ProductStatus, RecordFilter, TimeRange};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jifeng", version, about = "Points exchange client and admin console")]
pub struct Cli {
    /// Config file (defaults to ./jifeng.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in to the member app
    Login(LoginArgs),
    /// Forget the stored member credential
    Logout,
    /// Show the current points balance
    Balance,
    /// List exchangeable products
    Products,
    /// Show one product
    Product { id: String },
    /// Show the points history
    Records {
        #[arg(long = "type", value_enum, default_value_t = RecordArg::All)]
        kind: RecordArg,
        #[arg(long, value_enum, default_value_t = RangeArg::Days30)]
        range: RangeArg,
    },
    /// Exchange points for a product (interactive)
    Exchange {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Admin console
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub username: String,
    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    Login(LoginArgs),
    Logout,
    /// List all products, including offline ones
    Products,
    CreateProduct {
        #[arg(long)]
        name: String,
        #[arg(long)]
        points: u32,
        #[arg(long)]
        stock: u32,
        #[arg(long)]
        monthly_limit: u32,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image: String,
        #[arg(long, value_enum, default_value_t = StatusArg::Online)]
        status: StatusArg,
    },
    /// Change selected fields of a product
    UpdateProduct {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        points: Option<u32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        monthly_limit: Option<u32>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    SetStock {
        id: String,
        stock: u32,
    },
    SetStatus {
        id: String,
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Exchange history of all members
    Exchanges {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RecordArg {
    All,
    Earned,
    Spent,
}

impl From<RecordArg> for RecordFilter {
    fn from(arg: RecordArg) -> Self {
        match arg {
            RecordArg::All => RecordFilter::All,
            RecordArg::Earned => RecordFilter::Earned,
            RecordArg::Spent => RecordFilter::Spent,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RangeArg {
    #[value(name = "30days")]
    Days30,
    #[value(name = "3months")]
    Months3,
    #[value(name = "12months")]
    Months12,
    #[value(name = "2years")]
    Years2,
}

impl From<RangeArg> for TimeRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::Days30 => TimeRange::Last30Days,
            RangeArg::Months3 => TimeRange::Last3Months,
            RangeArg::Months12 => TimeRange::Last12Months,
            RangeArg::Years2 => TimeRange::Last2Years,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Online,
    Offline,
}

impl From<StatusArg> for ProductStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Online => ProductStatus::Online,
            StatusArg::Offline => ProductStatus::Offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_exchange() {
        let cli = Cli::parse_from(["jifeng", "exchange", "p-7", "--quantity", "2"]);
        match cli.command {
            Command::Exchange {
                product_id,
                quantity,
            } => {
                assert_eq!(product_id, "p-7");
                assert_eq!(quantity, 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_product_detail() {
        let cli = Cli::parse_from(["jifeng", "product", "p-3"]);
        match cli.command {
            Command::Product { id } => assert_eq!(id, "p-3"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_records_filters() {
        let cli = Cli::parse_from(["jifeng", "records", "--type", "spent", "--range", "3months"]);
        match cli.command {
            Command::Records { kind, range } => {
                assert_eq!(RecordFilter::from(kind), RecordFilter::Spent);
                assert_eq!(TimeRange::from(range), TimeRange::Last3Months);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_admin_set_status() {
        let cli = Cli::parse_from(["jifeng", "admin", "set-status", "p-1", "offline"]);
        match cli.command {
            Command::Admin(AdminCommand::SetStatus { id, status }) => {
                assert_eq!(id, "p-1");
                assert_eq!(ProductStatus::from(status), ProductStatus::Offline);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
