use std::{path::Path, sync::Arc};

use checkout::{CheckoutSession, CheckoutUiState, PaymentState};
use common_utils::{errors::CustomResult, ext_traits::ByteSliceExt};
use domain_types::{cart::CartItem, orders::OrdersQueueQuery};
use error_stack::{report, ResultExt};
use external_services::{BakongClient, CafeApiClient};
use interfaces::{OrderService, PaymentVerifier};
use khqr::{KhqrPayload, KhqrPayment, PaymentFingerprint, QrImage};
use serde::Serialize;
use tokio::time::Instant;

use crate::{
    cli::Command,
    configs::{Config, VerificationSource},
    error::CommandError,
    logger,
};

/// Backend clients built once from the configuration
pub struct AppState {
    pub config: Config,
    pub api: Arc<CafeApiClient>,
    pub verifier: Arc<dyn PaymentVerifier>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let api = Arc::new(CafeApiClient::new(config.api.clone(), config.proxy.clone()));
        let verifier: Arc<dyn PaymentVerifier> = match (config.verification, &config.bakong) {
            (VerificationSource::Bakong, Some(bakong)) => {
                Arc::new(BakongClient::new(bakong.clone(), config.proxy.clone()))
            }
            _ => Arc::clone(&api) as Arc<dyn PaymentVerifier>,
        };
        Self {
            config,
            api,
            verifier,
        }
    }
}

pub async fn run(state: AppState, command: Command) -> CustomResult<(), CommandError> {
    match command {
        Command::Generate {
            amount,
            currency,
            bill_number,
            qr_out,
            color,
        } => {
            let mut builder = state.config.merchant.khqr_builder();
            if let Some(amount) = amount {
                builder = builder.amount(amount);
            }
            if let Some(currency) = currency {
                builder = builder.currency(currency);
            }
            if let Some(bill_number) = bill_number {
                builder = builder.bill_number(bill_number);
            }
            let payment = builder
                .build()
                .and_then(|config| KhqrPayment::new(&config))
                .change_context(CommandError::KhqrGenerationFailed)?;
            if let Some(path) = qr_out {
                write_qr_image(&payment.khqr, color.as_deref(), &path)?;
                logger::info!(path = %path.display(), "QR image written");
            }
            print_json(&payment)
        }
        Command::Decode { payload } => {
            let payload =
                KhqrPayload::parse(payload.trim()).change_context(CommandError::KhqrDecodingFailed)?;
            print_json(&payload)
        }
        Command::Fingerprint { payload } => {
            print_line(khqr::generate_md5(payload.trim()).as_str());
            Ok(())
        }
        Command::Verify { md5, wait } => {
            let fingerprint = PaymentFingerprint::parse(&md5)
                .change_context(CommandError::InvalidArgument(md5.clone()))?;
            let paid = if wait {
                wait_for_payment(&state, &fingerprint).await?
            } else {
                state
                    .verifier
                    .verify_payment(&fingerprint)
                    .await
                    .change_context(CommandError::ApiCallFailed("payment verification"))?
            };
            print_json(&serde_json::json!({ "md5": fingerprint, "paid": paid }))
        }
        Command::Orders { phone } => {
            let orders = state
                .api
                .customer_orders(phone.trim())
                .await
                .change_context(CommandError::ApiCallFailed("customer orders"))?;
            print_json(&orders)
        }
        Command::Queue { status, limit } => {
            let defaults = OrdersQueueQuery::default();
            let query = OrdersQueueQuery {
                status: status.unwrap_or(defaults.status),
                limit: limit.unwrap_or(defaults.limit),
            };
            let orders = state
                .api
                .orders_queue(&query)
                .await
                .change_context(CommandError::ApiCallFailed("orders queue"))?;
            print_json(&orders)
        }
        Command::Checkout {
            cart,
            phone,
            name,
            method,
            order_type,
            table,
        } => {
            let items = read_cart(&cart)?;
            let session = CheckoutSession::new(
                Arc::clone(&state.verifier),
                Arc::clone(&state.api),
                state.config.merchant.clone(),
                state.config.poll,
            );
            session.set_cart(items);
            session.set_phone_number(phone);
            session.set_customer_name(name.unwrap_or_default());
            session.set_payment_method(method);
            session.set_order_type(order_type);
            session.set_table_number(table.unwrap_or_default());
            run_checkout(&session).await
        }
    }
}

/// Polls under the configured policy, without a checkout session around it
async fn wait_for_payment(
    state: &AppState,
    fingerprint: &PaymentFingerprint,
) -> CustomResult<bool, CommandError> {
    let policy = state.config.poll;
    let started = Instant::now();
    let mut consecutive_failures = 0;
    loop {
        match state.verifier.verify_payment(fingerprint).await {
            Ok(true) => return Ok(true),
            Ok(false) => consecutive_failures = 0,
            Err(error) => {
                consecutive_failures += 1;
                logger::warn!(?error, consecutive_failures, "verification call failed");
                if policy.too_many_failures(consecutive_failures) {
                    return Err(error.change_context(CommandError::ApiCallFailed(
                        "payment verification",
                    )));
                }
            }
        }
        if policy.is_expired(started.elapsed()) {
            return Ok(false);
        }
        tokio::time::sleep(policy.interval).await;
    }
}

async fn run_checkout<V, O>(session: &CheckoutSession<V, O>) -> CustomResult<(), CommandError>
where
    V: PaymentVerifier + 'static,
    O: OrderService + 'static,
{
    let mut updates = session.subscribe();
    let placed = session
        .pay_now()
        .await
        .map_err(|error| checkout_failed(&error))?;
    if let Some(order) = placed {
        return print_json(&order);
    }

    let shown = session.state();
    if let Some(khqr) = &shown.khqr_string {
        print_line(khqr);
    }
    if let Some(link) = &shown.deep_link_url {
        logger::info!(deep_link = %link, "open in banking app");
    }

    let final_state = tokio::select! {
        result = updates.wait_for(is_settled) => {
            result
                .map(|state| state.clone())
                .change_context(CommandError::CheckoutFailed("checkout session closed".to_string()))?
        }
        _ = tokio::signal::ctrl_c() => {
            logger::info!("interrupted, cancelling payment");
            session.shutdown();
            session.state()
        }
    };

    match (&final_state.success_order, &final_state.error) {
        (Some(order), _) => print_json(order),
        (None, Some(message)) => Err(report!(CommandError::CheckoutFailed(message.clone()))),
        (None, None) => Err(report!(CommandError::CheckoutFailed(
            "payment was cancelled".to_string()
        ))),
    }
}

/// Terminal states of a KHQR checkout
fn is_settled(state: &CheckoutUiState) -> bool {
    match state.payment_state {
        PaymentState::Confirmed => {
            !state.is_submitting && (state.success_order.is_some() || state.error.is_some())
        }
        PaymentState::TimedOut | PaymentState::Cancelled | PaymentState::Idle => true,
        PaymentState::AwaitingPayment { .. } => false,
    }
}

fn checkout_failed<C>(error: &error_stack::Report<C>) -> error_stack::Report<CommandError>
where
    C: error_stack::Context,
{
    report!(CommandError::CheckoutFailed(error.current_context().to_string()))
}

fn read_cart(path: &Path) -> CustomResult<Vec<CartItem>, CommandError> {
    let bytes = std::fs::read(path)
        .change_context_lazy(|| CommandError::ReadFailed(path.display().to_string()))?;
    bytes
        .parse_struct::<Vec<CartItem>>("Vec<CartItem>")
        .change_context_lazy(|| CommandError::ReadFailed(path.display().to_string()))
}

fn write_qr_image(khqr: &str, color: Option<&str>, path: &Path) -> CustomResult<(), CommandError> {
    let image = match color {
        Some(color) => QrImage::new_colored_from_data(khqr, color),
        None => QrImage::new_from_data(khqr),
    }
    .change_context(CommandError::QrRenderingFailed)?;
    std::fs::write(path, image.png_bytes())
        .change_context_lazy(|| CommandError::WriteFailed(path.display().to_string()))
}

fn print_json<T: Serialize>(value: &T) -> CustomResult<(), CommandError> {
    let rendered = serde_json::to_string_pretty(value)
        .change_context(CommandError::OutputSerializationFailed)?;
    print_line(&rendered);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}
