//! # Storefront CLI
//!
//! Runs checkout operations against the configured backend.
//!
//! ```text
//! storefront quote <user_id> [standard|express] [COUPON]
//! storefront estimate <pincode>
//! storefront order-cod <user_id> <address_id> [standard|express]
//! ```
//!
//! Configuration comes from `storefront.toml` in the platform config
//! directory, overridden by `STOREFRONT_*` environment variables.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use storefront_client::{
    PaymentOptions, PaymentOutcome, PaymentWidget, StorefrontConfig, StorefrontSession,
    WidgetOutcome,
};
use storefront_core::{CouponStatus, DeliveryMode, PaymentMethod, User};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The hosted widget needs a browser; the CLI only places COD orders.
struct NoBrowserWidget;

#[async_trait]
impl PaymentWidget for NoBrowserWidget {
    async fn open(&self, options: PaymentOptions) -> WidgetOutcome {
        warn!(order_id = %options.order_id, "Online payment needs a browser");
        WidgetOutcome::Dismissed
    }
}

enum Command {
    Quote {
        user_id: String,
        mode: DeliveryMode,
        coupon: Option<String>,
    },
    Estimate {
        pincode: String,
    },
    OrderCod {
        user_id: String,
        address_id: String,
        mode: DeliveryMode,
    },
}

const USAGE: &str = "usage:
  storefront quote <user_id> [standard|express] [COUPON]
  storefront estimate <pincode>
  storefront order-cod <user_id> <address_id> [standard|express]";

fn parse_mode(arg: Option<&String>) -> Result<DeliveryMode> {
    match arg {
        Some(mode) => mode
            .parse()
            .with_context(|| format!("unknown delivery mode '{}'", mode)),
        None => Ok(DeliveryMode::default()),
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args.first().map(String::as_str) {
        Some("quote") if args.len() >= 2 => Ok(Command::Quote {
            user_id: args[1].clone(),
            mode: parse_mode(args.get(2))?,
            coupon: args.get(3).cloned(),
        }),
        Some("estimate") if args.len() == 2 => Ok(Command::Estimate {
            pincode: args[1].clone(),
        }),
        Some("order-cod") if args.len() >= 3 => Ok(Command::OrderCod {
            user_id: args[1].clone(),
            address_id: args[2].clone(),
            mode: parse_mode(args.get(3))?,
        }),
        _ => bail!("{}", USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let config = StorefrontConfig::load(None).context("loading configuration")?;
    info!(api = %config.api.base_url, "Configuration loaded");

    let session = StorefrontSession::from_config(&config, Arc::new(NoBrowserWidget))?;

    match command {
        Command::Quote {
            user_id,
            mode,
            coupon,
        } => {
            session.set_delivery_mode(mode).await;
            if let Some(code) = coupon {
                let status = session
                    .coupons()
                    .apply_coupon(&code, Some(user_id.as_str()))
                    .await?;
                if status != CouponStatus::Applied {
                    warn!(%code, ?status, "Coupon not applied");
                }
            }
            let quote = session.quote(&user_id).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Command::Estimate { pincode } => {
            let estimate = session.delivery().estimate(&pincode).await?;
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }
        Command::OrderCod {
            user_id,
            address_id,
            mode,
        } => {
            let user = match session.auth().refresh().await? {
                Some(user) if user.id == user_id => user,
                Some(other) => bail!("logged in as {}, not {}", other.id, user_id),
                None => bail!("not logged in"),
            };
            place_cod(&session, &user, address_id, mode).await?;
        }
    }

    Ok(())
}

async fn place_cod(
    session: &StorefrontSession,
    user: &User,
    address_id: String,
    mode: DeliveryMode,
) -> Result<()> {
    session.set_delivery_mode(mode).await;
    match session
        .place_order(PaymentMethod::CashOnDelivery, Some(address_id))
        .await?
    {
        PaymentOutcome::Confirmed { order, .. } => {
            info!(user_id = %user.id, order_id = %order.id, "Order confirmed");
            println!("{}", serde_json::to_string_pretty(&order)?);
            Ok(())
        }
        other => bail!("order not confirmed: {:?}", other),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
