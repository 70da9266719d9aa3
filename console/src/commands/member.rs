//! Member app commands

use crate::config::ClientConfig;
use crate::context::Console;
use crate::output::{print_notices, print_points_records, print_product_detail, print_products};
use crate::prompt::Prompt;
use jifeng_core::{RecordFilter, TimeRange};
use jifeng_engine::exchange::{ExchangeFailure, SubmitOutcome};
use jifeng_engine::{ExchangeFlowController, FlowError};
use jifeng_networking::api;

pub async fn login(console: &Console, username: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => Prompt::new().require("Password: ").await?,
    };
    let response = api::login(&console.client, username, &password).await?;
    println!("Logged in as {}", response.user_info.display_name());
    match console.client.get_balance().await {
        Ok(balance) => println!("Balance: {} points", balance),
        Err(e) => eprintln!("Could not load balance: {}", e.server_message()),
    }
    Ok(())
}

pub async fn logout(console: &Console) -> anyhow::Result<()> {
    api::logout(&console.client).await?;
    println!("Logged out.");
    Ok(())
}

pub async fn balance(console: &Console) -> anyhow::Result<()> {
    console.require_login().await?;
    let balance = console.client.get_balance().await?;
    println!("Balance: {} points", balance);
    Ok(())
}

pub async fn products(console: &Console) -> anyhow::Result<()> {
    console.require_login().await?;
    let products = console.client.get_products().await?;
    print_products(&products);
    Ok(())
}

pub async fn product(console: &Console, id: &str) -> anyhow::Result<()> {
    console.require_login().await?;
    let product = console.client.get_product(id).await?;
    print_product_detail(&product);
    Ok(())
}

pub async fn records(console: &Console, filter: RecordFilter, range: TimeRange) -> anyhow::Result<()> {
    console.require_login().await?;
    let records = console.client.get_points_records(filter, range).await?;
    print_points_records(&records);
    Ok(())
}

/// Walk through one exchange: validate, send a code, read it, submit
pub async fn exchange(
    console: &Console,
    config: &ClientConfig,
    product_id: &str,
    quantity: u32,
) -> anyhow::Result<()> {
    console.require_login().await?;

    let flow = ExchangeFlowController::new(
        console.client.clone(),
        console.client.clone(),
        config.flow_options(),
    );
    let report = flow.load().await;
    print_notices(&flow.take_notices().await);
    if !report.products_loaded {
        anyhow::bail!("Product list unavailable");
    }

    let product = flow.select_product(product_id).await?;
    flow.set_quantity(quantity).await?;
    let required = flow.required_points().await.unwrap_or_default();
    let after = flow.balance_after().await.unwrap_or_default();
    println!(
        "{} x {}: {} points (balance {} -> {})",
        quantity,
        product.name,
        required,
        flow.balance().await,
        after
    );
    flow.request_exchange().await?;

    let mut prompt = Prompt::new();
    loop {
        let verification = flow.verification().await;
        let label = if verification.countdown_seconds > 0 {
            format!(
                "Verification code (resend in {}s, 'q' to cancel): ",
                verification.countdown_seconds
            )
        } else {
            "Verification code (empty to send a code, 'q' to cancel): ".to_string()
        };

        let input = match prompt.ask(&label).await? {
            Some(input) => input,
            None => "q".to_string(),
        };

        if input.eq_ignore_ascii_case("q") {
            flow.cancel().await?;
            println!("Exchange cancelled.");
            return Ok(());
        }

        if input.is_empty() {
            match flow.send_verification_code().await {
                Ok(sent) => {
                    println!("Verification code sent.");
                    if let Some(code) = sent.echoed_code {
                        println!("Development code: {}", code);
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
            continue;
        }

        flow.set_verification_code(&input).await?;
        match flow.submit_exchange().await {
            Ok(SubmitOutcome::Exchanged(receipt)) => {
                print_notices(&flow.take_notices().await);
                println!(
                    "Spent {} points. Balance: {}",
                    receipt.points_spent, receipt.balance
                );
                return Ok(());
            }
            Ok(SubmitOutcome::AlreadySubmitting) => continue,
            Err(FlowError::ExchangeFailed(ExchangeFailure::VerificationCodeInvalid(message))) => {
                eprintln!("{}", message);
            }
            Err(FlowError::ExchangeFailed(failure)) => {
                // Retrying with another code will not help
                print_notices(&flow.take_notices().await);
                flow.cancel().await?;
                anyhow::bail!("Exchange failed: {}", failure);
            }
            Err(e) => eprintln!("{}", e),
        }
    }
}
