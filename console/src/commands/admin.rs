//! Admin console commands

use crate::cli::AdminCommand;
use crate::context::Console;
use crate::output::{print_admin_products, print_exchange_records, print_product};
use crate::prompt::Prompt;
use jifeng_core::{ExchangeRecordQuery, NewProduct, ProductStatus, ProductUpdate};
use jifeng_networking::api;

pub async fn run(console: &Console, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::Login(args) => {
            let password = match args.password {
                Some(p) => p,
                None => Prompt::new().require("Password: ").await?,
            };
            let response = api::login(&console.client, &args.username, &password).await?;
            println!("Admin logged in as {}", response.user_info.display_name());
        }
        AdminCommand::Logout => {
            api::logout(&console.client).await?;
            println!("Admin logged out.");
        }
        AdminCommand::Products => {
            console.require_login().await?;
            let products = api::list_all_products(&console.client).await?;
            print_admin_products(&products);
        }
        AdminCommand::CreateProduct {
            name,
            points,
            stock,
            monthly_limit,
            description,
            image,
            status,
        } => {
            console.require_login().await?;
            let product = NewProduct {
                name,
                points,
                description,
                stock,
                image,
                monthly_limit,
                status: status.into(),
            };
            let created = api::create_product(&console.client, &product).await?;
            print_product("Created", &created);
        }
        AdminCommand::UpdateProduct {
            id,
            name,
            points,
            description,
            stock,
            image,
            monthly_limit,
            status,
        } => {
            console.require_login().await?;
            let update = ProductUpdate {
                name,
                points,
                description,
                stock,
                image,
                monthly_limit,
                status: status.map(ProductStatus::from),
            };
            let updated = api::update_product(&console.client, &id, &update).await?;
            print_product("Updated", &updated);
        }
        AdminCommand::SetStock { id, stock } => {
            console.require_login().await?;
            let updated = api::set_stock(&console.client, &id, stock).await?;
            print_product("Updated", &updated);
        }
        AdminCommand::SetStatus { id, status } => {
            console.require_login().await?;
            let status = ProductStatus::from(status);
            api::set_status(&console.client, &id, status).await?;
            println!("Product {} is now {}", id, status);
        }
        AdminCommand::Exchanges {
            user,
            product,
            status,
        } => {
            console.require_login().await?;
            let query = ExchangeRecordQuery {
                user_id: user,
                product_id: product,
                status,
            };
            let records = api::list_exchange_records(&console.client, &query).await?;
            print_exchange_records(&records);
        }
    }
    Ok(())
}
