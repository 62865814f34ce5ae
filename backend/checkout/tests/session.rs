use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use checkout::{CheckoutSession, MerchantProfile, PaymentState, PollPolicy};
use common_enums::{Currency, OrderType, PaymentMethod, Size};
use common_utils::errors::CustomResult;
use domain_types::{
    cart::{CartItem, MenuItem},
    errors::{ApiClientError, CheckoutError},
    orders::{CreateOrderRequest, Order, OrdersQueueQuery},
};
use error_stack::report;
use interfaces::{OrderService, PaymentVerifier};
use khqr::{KhqrPayload, PaymentFingerprint};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Pending,
    Paid,
    Unreachable,
}

struct FakeVerifier {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    calls: AtomicUsize,
    seen: Mutex<Vec<PaymentFingerprint>>,
}

impl FakeVerifier {
    fn new(script: impl IntoIterator<Item = Outcome>, fallback: Outcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn pending() -> Arc<Self> {
        Self::new([], Outcome::Pending)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PaymentVerifier for FakeVerifier {
    async fn verify_payment(
        &self,
        fingerprint: &PaymentFingerprint,
    ) -> CustomResult<bool, ApiClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(fingerprint.clone());
        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);
        match outcome {
            Outcome::Pending => Ok(false),
            Outcome::Paid => Ok(true),
            Outcome::Unreachable => Err(report!(ApiClientError::RequestNotSent(
                "connection refused".to_string()
            ))),
        }
    }
}

#[derive(Default)]
struct FakeOrders {
    requests: Mutex<Vec<CreateOrderRequest>>,
    reject_with: Option<String>,
}

impl FakeOrders {
    fn requests(&self) -> Vec<CreateOrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl OrderService for FakeOrders {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> CustomResult<Order, ApiClientError> {
        let number = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        if let Some(message) = &self.reject_with {
            return Err(report!(ApiClientError::Rejected {
                message: message.clone()
            }));
        }
        Ok(Order {
            id: format!("order-{number}"),
            order_number: format!("A{number:03}"),
            status: "pending".to_string(),
            order_type: Some(request.order_type),
            table_number: request.table_number,
            total_usd: None,
            created_at: None,
            items: Vec::new(),
            customer: None,
        })
    }

    async fn customer_orders(&self, _phone: &str) -> CustomResult<Vec<Order>, ApiClientError> {
        Ok(Vec::new())
    }

    async fn orders_queue(
        &self,
        _query: &OrdersQueueQuery,
    ) -> CustomResult<Vec<Order>, ApiClientError> {
        Ok(Vec::new())
    }
}

fn merchant() -> MerchantProfile {
    MerchantProfile {
        name: "Night Owl Cafe".to_string(),
        account_number: "000123456789".to_string(),
        bank_code: "ACLEDA".to_string(),
        city: "PHNOM PENH".to_string(),
        currency: Currency::USD,
        mobile_number: None,
        store_label: None,
    }
}

fn latte(quantity: u16) -> CartItem {
    CartItem {
        id: "line-1".to_string(),
        menu_item: MenuItem {
            id: "iced-latte".to_string(),
            name: "Iced Latte".to_string(),
            name_kh: None,
            description: None,
            image_url: None,
            base_price: Decimal::new(250, 2),
            has_sizes: true,
            price_medium: None,
            price_large: None,
            is_available: true,
            category_id: None,
        },
        size: Size::Medium,
        quantity,
    }
}

type Session = CheckoutSession<Arc<FakeVerifier>, Arc<FakeOrders>>;

fn session_with(
    verifier: &Arc<FakeVerifier>,
    orders: &Arc<FakeOrders>,
    policy: PollPolicy,
) -> Session {
    let session = CheckoutSession::new(
        Arc::clone(verifier),
        Arc::clone(orders),
        merchant(),
        policy,
    );
    session.set_cart(vec![latte(2)]);
    session.set_phone_number("012345678");
    session.set_customer_name("Dara");
    session
}

fn every_three_seconds() -> PollPolicy {
    PollPolicy::unbounded(Duration::from_secs(3))
}

async fn advance(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn khqr_payment_shows_code_for_cart_total() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    assert_eq!(session.pay_now().await.unwrap(), None);

    let state = session.state();
    assert!(state.show_khqr);
    assert_eq!(state.payment_state, PaymentState::AwaitingPayment { attempts: 0 });
    assert_eq!(state.total_price, Decimal::new(600, 2));
    let khqr = state.khqr_string.expect("khqr string");
    let payload = KhqrPayload::parse(&khqr).unwrap();
    assert_eq!(payload.amount(), Some(Decimal::new(600, 2)));
    assert!(payload.bill_number().is_some_and(|bill| bill.starts_with("CAFE")));
    assert_eq!(state.payment_md5, Some(PaymentFingerprint::of(&khqr)));
    assert_eq!(state.deep_link_url, None);
    assert!(session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn polls_on_interval_with_displayed_fingerprint() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    session.pay_now().await.unwrap();
    advance(2.9).await;
    assert_eq!(verifier.calls(), 0);
    advance(0.2).await;
    assert_eq!(verifier.calls(), 1);
    advance(6.0).await;
    assert_eq!(verifier.calls(), 3);

    let state = session.state();
    assert_eq!(state.payment_state, PaymentState::AwaitingPayment { attempts: 3 });
    let shown = state.payment_md5.unwrap();
    assert!(verifier.seen.lock().unwrap().iter().all(|md5| *md5 == shown));
}

#[tokio::test(start_paused = true)]
async fn repeated_pay_now_keeps_a_single_poll_loop() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    session.pay_now().await.unwrap();
    session.pay_now().await.unwrap();
    session.show_khqr(true).unwrap();

    advance(3.1).await;
    assert_eq!(verifier.calls(), 1);
    advance(3.0).await;
    assert_eq!(verifier.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn dismiss_stops_polling() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    session.pay_now().await.unwrap();
    advance(3.1).await;
    assert_eq!(verifier.calls(), 1);

    session.dismiss();
    advance(60.0).await;
    assert_eq!(verifier.calls(), 1);

    let state = session.state();
    assert_eq!(state.payment_state, PaymentState::Idle);
    assert!(!state.show_khqr);
    assert_eq!(state.khqr_string, None);
    assert_eq!(state.payment_md5, None);
    assert_eq!(state.items.len(), 1);
    assert!(orders.requests().is_empty());
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn hiding_the_code_stops_polling() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    session.show_khqr(true).unwrap();
    session.show_khqr(false).unwrap();
    advance(30.0).await;

    assert_eq!(verifier.calls(), 0);
    assert_eq!(session.state().payment_state, PaymentState::Idle);
}

#[tokio::test(start_paused = true)]
async fn confirmed_payment_places_paid_order() {
    let verifier = FakeVerifier::new([Outcome::Pending, Outcome::Paid], Outcome::Pending);
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());
    let mut updates = session.subscribe();

    session.pay_now().await.unwrap();
    let state = updates
        .wait_for(|state| state.success_order.is_some())
        .await
        .unwrap()
        .clone();

    assert!(state.is_payment_confirmed);
    assert_eq!(state.payment_state, PaymentState::Confirmed);
    assert!(!state.show_khqr);
    assert!(!state.is_submitting);
    assert!(state.items.is_empty());
    assert_eq!(state.total_price, Decimal::ZERO);
    assert_eq!(state.success_order.unwrap().order_number, "A001");

    let requests = orders.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].is_paid);
    assert_eq!(requests[0].customer_phone, "012345678");
    assert_eq!(requests[0].customer_name.as_deref(), Some("Dara"));
    assert_eq!(requests[0].items[0].quantity, 2);
    assert_eq!(requests[0].table_number, None);

    advance(30.0).await;
    assert_eq!(verifier.calls(), 2);
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_timeout() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let policy = PollPolicy {
        timeout: Some(Duration::from_secs(10)),
        ..every_three_seconds()
    };
    let session = session_with(&verifier, &orders, policy);

    session.pay_now().await.unwrap();
    advance(60.0).await;

    assert_eq!(verifier.calls(), 3);
    let state = session.state();
    assert_eq!(state.payment_state, PaymentState::TimedOut);
    assert_eq!(
        state.error.as_deref(),
        Some(CheckoutError::PaymentTimedOut.to_string().as_str())
    );
    assert!(!state.show_khqr);
    assert!(orders.requests().is_empty());
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_consecutive_failures() {
    let verifier = FakeVerifier::new(
        [Outcome::Unreachable, Outcome::Pending],
        Outcome::Unreachable,
    );
    let orders = Arc::new(FakeOrders::default());
    let policy = PollPolicy {
        max_consecutive_failures: Some(2),
        ..every_three_seconds()
    };
    let session = session_with(&verifier, &orders, policy);

    session.pay_now().await.unwrap();
    advance(60.0).await;

    // the pending answer in between resets the failure count
    assert_eq!(verifier.calls(), 4);
    let state = session.state();
    assert_eq!(state.payment_state, PaymentState::TimedOut);
    assert_eq!(
        state.error.as_deref(),
        Some(CheckoutError::VerificationUnavailable.to_string().as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn transport_errors_keep_polling_when_unbounded() {
    let verifier = FakeVerifier::new([Outcome::Unreachable; 5], Outcome::Paid);
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());
    let mut updates = session.subscribe();

    session.pay_now().await.unwrap();
    updates
        .wait_for(|state| state.success_order.is_some())
        .await
        .unwrap();

    assert_eq!(verifier.calls(), 6);
    assert_eq!(orders.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cash_places_unpaid_order_without_polling() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());
    session.set_payment_method(PaymentMethod::Cash);
    session.set_order_type(OrderType::DineIn);
    session.set_table_number("7");

    let order = session.pay_now().await.unwrap().expect("order");
    assert_eq!(order.table_number, Some(7));

    advance(30.0).await;
    assert_eq!(verifier.calls(), 0);
    let requests = orders.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].is_paid);
    assert_eq!(requests[0].order_type, OrderType::DineIn);

    let state = session.state();
    assert_eq!(state.khqr_string, None);
    assert!(state.items.is_empty());
    assert_eq!(state.success_order, Some(order));
}

#[tokio::test(start_paused = true)]
async fn switching_to_cash_abandons_the_khqr_poll() {
    let verifier = FakeVerifier::new([Outcome::Pending], Outcome::Paid);
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    session.pay_now().await.unwrap();
    advance(3.1).await;
    assert_eq!(verifier.calls(), 1);

    session.set_payment_method(PaymentMethod::Cash);
    let order = session.pay_now().await.unwrap().expect("order");
    assert!(!session.is_polling());

    advance(10.0).await;
    assert_eq!(verifier.calls(), 1);
    let requests = orders.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].is_paid);

    let state = session.state();
    assert_eq!(state.payment_state, PaymentState::Idle);
    assert!(!state.is_payment_confirmed);
    assert_eq!(state.khqr_string, None);
    assert_eq!(state.error, None);
    assert_eq!(state.success_order, Some(order));
}

#[tokio::test(start_paused = true)]
async fn invalid_order_never_reaches_the_network() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());
    session.set_phone_number("   ");

    let error = session.pay_now().await.unwrap_err();
    assert_eq!(*error.current_context(), CheckoutError::MissingPhoneNumber);

    session.set_phone_number("012345678");
    session.set_order_type(OrderType::DineIn);
    let error = session.show_khqr(true).unwrap_err();
    assert_eq!(*error.current_context(), CheckoutError::MissingTableNumber);
    assert_eq!(
        session.state().error.as_deref(),
        Some("Please enter your table number")
    );

    session.set_order_type(OrderType::Takeaway);
    session.set_cart(Vec::new());
    session.set_payment_method(PaymentMethod::Cash);
    let error = session.pay_now().await.unwrap_err();
    assert_eq!(*error.current_context(), CheckoutError::EmptyCart);

    advance(30.0).await;
    assert_eq!(verifier.calls(), 0);
    assert!(orders.requests().is_empty());
    assert!(!session.state().show_khqr);
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn rejected_order_keeps_cart_and_shows_message() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders {
        reject_with: Some("Kitchen is closed".to_string()),
        ..Default::default()
    });
    let session = session_with(&verifier, &orders, every_three_seconds());
    session.set_payment_method(PaymentMethod::Cash);

    let error = session.pay_now().await.unwrap_err();
    assert_eq!(
        *error.current_context(),
        CheckoutError::OrderPlacementFailed("Kitchen is closed".to_string())
    );

    let state = session.state();
    assert_eq!(state.error.as_deref(), Some("Kitchen is closed"));
    assert_eq!(state.items.len(), 1);
    assert!(!state.is_submitting);
    assert_eq!(state.success_order, None);

    session.clear_error();
    assert_eq!(session.state().error, None);
}

#[tokio::test(start_paused = true)]
async fn banking_app_methods_get_deep_links() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());
    session.set_payment_method(PaymentMethod::AcledaMobile);

    session.pay_now().await.unwrap();

    let state = session.state();
    let primary = state.deep_link_url.expect("deep link");
    assert!(primary.starts_with("acledamobile://khqr/pay?qr=000201"));
    assert_eq!(state.deep_link_fallbacks.len(), 12);

    session.dismiss();
    let state = session.state();
    assert_eq!(state.deep_link_url, None);
    assert!(state.deep_link_fallbacks.is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_payment() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    session.pay_now().await.unwrap();
    session.shutdown();
    advance(30.0).await;

    assert_eq!(verifier.calls(), 0);
    assert_eq!(session.state().payment_state, PaymentState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_aborts_the_poll() {
    let verifier = FakeVerifier::pending();
    let orders = Arc::new(FakeOrders::default());
    let session = session_with(&verifier, &orders, every_three_seconds());

    session.pay_now().await.unwrap();
    drop(session);
    advance(30.0).await;

    assert_eq!(verifier.calls(), 0);
}
