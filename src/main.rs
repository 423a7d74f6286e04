use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use iiko_order_client::{
    config, credentials, driver,
    report::{self, describe_failure},
    IikoClient, OrderItems, OrderingWorkflow, ProductId, ServiceError,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // No subcommand: nothing runs and nothing touches the network.
    let Some(command) = cli.command else {
        return Ok(());
    };

    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let credential = match credentials::load_api_login(&cfg.api_login_path) {
        Ok(credential) => credential,
        Err(err) => {
            report_failure(cli.json, &err)?;
            return Ok(());
        }
    };

    let client = IikoClient::new(&cfg).context("failed to build HTTP client")?;
    debug!(base_url = client.base_url(), "client ready");
    let workflow = OrderingWorkflow::new(client, credential, cfg.order_comment.clone());

    match command {
        Commands::Token => match workflow.authenticate().await {
            Ok(token) => emit(cli.json, &json!({ "token": token }), || token.as_str().to_string())?,
            Err(err) => report_failure(cli.json, &err)?,
        },
        Commands::Organization => match workflow.organization().await {
            Ok(id) => emit(cli.json, &json!({ "organizationId": id }), || id.to_string())?,
            Err(err) => report_failure(cli.json, &err)?,
        },
        Commands::Menu => match workflow.menu().await {
            Ok(catalog) => emit(cli.json, &catalog, || {
                catalog
                    .iter()
                    .map(|(name, id)| format!("- {} • {}", name, id))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?,
            Err(err) => report_failure(cli.json, &err)?,
        },
        Commands::Terminal => match workflow.terminal().await {
            Ok(id) => emit(cli.json, &json!({ "terminalGroupId": id }), || id.to_string())?,
            Err(err) => report_failure(cli.json, &err)?,
        },
        Commands::Order(args) => {
            require_confirmation(args.confirm)?;
            let items: OrderItems = args.items.into_iter().collect();
            let result = workflow.place_order(&items).await;
            match &result {
                Ok(receipt) if cli.json => print_json(receipt)?,
                Err(err) if cli.json => print_json(&report::order_failure_json(err))?,
                _ => println!("{}", report::describe_order_result(&result)),
            }
        }
        Commands::TestOrder(args) => {
            require_confirmation(args.confirm)?;
            let limit = args.limit.unwrap_or(cfg.smoke_test_items);
            match driver::run_test_order(&workflow, limit).await {
                Ok(outcome) if cli.json => print_json(&outcome)?,
                Ok(outcome) => {
                    for (id, amount) in outcome.items.iter() {
                        println!("- {} × {}", id, amount);
                    }
                    println!("{}", report::ORDER_CREATED);
                }
                Err(err) => emit(cli.json, &report::test_order_failure_json(&err), || {
                    report::describe_test_order_error(&err)
                })?,
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "iiko-order", about = "Scripted client for the iiko.services API", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange the API login for a bearer token
    Token,
    /// Print the first organization id
    Organization,
    /// Print the menu as product name and id
    Menu,
    /// Print the first terminal group id
    Terminal,
    /// Place an order on the live point of sale
    Order(OrderArgs),
    /// Place a zero-amount order with the first products of the menu
    TestOrder(TestOrderArgs),
}

#[derive(Args)]
struct OrderArgs {
    #[arg(
        long = "item",
        value_parser = parse_order_item,
        action = ArgAction::Append,
        required = true,
        help = "Order line as PRODUCT_ID=AMOUNT; repeat for more lines"
    )]
    items: Vec<(ProductId, Decimal)>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Acknowledge that this creates a real order"
    )]
    confirm: bool,
}

#[derive(Args)]
struct TestOrderArgs {
    #[arg(long, value_parser = parse_positive_usize, help = "Number of menu products to include")]
    limit: Option<usize>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Acknowledge that this creates a real order"
    )]
    confirm: bool,
}

fn require_confirmation(confirm: bool) -> Result<()> {
    if confirm {
        Ok(())
    } else {
        anyhow::bail!("this command creates a real order on the point of sale; pass --confirm to proceed")
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        print_json(value)
    } else {
        println!("{}", text());
        Ok(())
    }
}

fn report_failure(json: bool, err: &ServiceError) -> Result<()> {
    emit(json, &report::failure_json(err), || describe_failure(err))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_order_item(raw: &str) -> Result<(ProductId, Decimal), String> {
    let (id, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid item '{raw}', expected PRODUCT_ID=AMOUNT"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err("product id cannot be empty".to_string());
    }
    let amount = Decimal::from_str(amount.trim())
        .map_err(|_| format!("invalid amount '{}'", amount.trim()))?;
    if amount.is_sign_negative() {
        return Err(format!("amount must not be negative, got {amount}"));
    }
    Ok((ProductId::new(id), amount))
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let value: usize = raw
        .parse()
        .map_err(|_| format!("invalid integer '{raw}'"))?;
    if value == 0 {
        Err("value must be greater than zero".to_string())
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_item() {
        let (id, amount) = parse_order_item("p1=2.5").unwrap();
        assert_eq!(id.as_str(), "p1");
        assert_eq!(amount, Decimal::new(25, 1));
    }

    #[test]
    fn rejects_malformed_order_items() {
        assert!(parse_order_item("p1").is_err());
        assert!(parse_order_item("=1").is_err());
        assert!(parse_order_item("p1=abc").is_err());
        assert!(parse_order_item("p1=-1").is_err());
    }

    #[test]
    fn no_arguments_means_no_command() {
        let cli = Cli::try_parse_from(["iiko-order"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn order_commands_require_confirmation() {
        let cli = Cli::try_parse_from(["iiko-order", "test-order"]).unwrap();
        match cli.command {
            Some(Commands::TestOrder(args)) => assert!(require_confirmation(args.confirm).is_err()),
            _ => panic!("expected test-order"),
        }

        let cli = Cli::try_parse_from(["iiko-order", "order", "--item", "p1=1", "--confirm"]).unwrap();
        match cli.command {
            Some(Commands::Order(args)) => {
                assert!(require_confirmation(args.confirm).is_ok());
                assert_eq!(args.items.len(), 1);
            }
            _ => panic!("expected order"),
        }
    }

    #[test]
    fn order_needs_at_least_one_item() {
        assert!(Cli::try_parse_from(["iiko-order", "order", "--confirm"]).is_err());
    }
}
