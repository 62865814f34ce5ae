use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use common_enums::{OrderType, PaymentMethod};
use common_utils::{date_time, errors::CustomResult};
use domain_types::{
    cart::{cart_total, CartItem},
    errors::{ApiClientError, CheckoutError},
    orders::{CreateOrderItem, CreateOrderRequest, Order},
};
use error_stack::{report, ResultExt};
use interfaces::{OrderService, PaymentVerifier};
use khqr::{DeepLink, KhqrPayment, PaymentFingerprint};
use tokio::{sync::watch, task::JoinHandle, time::Instant};

use crate::{
    merchant::{bill_number, MerchantProfile},
    policy::PollPolicy,
    state::{CheckoutUiState, PaymentState},
    validation::{parse_table_number, validate_order},
};

/// The running poll task, tagged with the generation it was started for
struct PollSlot {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner<V, O> {
    verifier: V,
    orders: O,
    merchant: MerchantProfile,
    policy: PollPolicy,
    state: watch::Sender<CheckoutUiState>,
    poll_slot: Mutex<Option<PollSlot>>,
    generation: AtomicU64,
}

/// Controller of one checkout screen.
///
/// Methods that start polling spawn onto the current Tokio runtime. Dropping
/// the session aborts any poll still running.
pub struct CheckoutSession<V, O>
where
    V: PaymentVerifier + 'static,
    O: OrderService + 'static,
{
    inner: Arc<Inner<V, O>>,
}

impl<V, O> CheckoutSession<V, O>
where
    V: PaymentVerifier + 'static,
    O: OrderService + 'static,
{
    pub fn new(verifier: V, orders: O, merchant: MerchantProfile, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(CheckoutUiState::default());
        Self {
            inner: Arc::new(Inner {
                verifier,
                orders,
                merchant,
                policy,
                state,
                poll_slot: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CheckoutUiState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CheckoutUiState {
        self.inner.state.borrow().clone()
    }

    pub fn set_cart(&self, items: Vec<CartItem>) {
        self.inner.state.send_modify(|state| {
            state.total_price = cart_total(&items);
            state.items = items;
        });
    }

    pub fn set_order_type(&self, order_type: OrderType) {
        self.inner
            .state
            .send_modify(|state| state.order_type = order_type);
    }

    pub fn set_table_number(&self, table_number: impl Into<String>) {
        let table_number = table_number.into();
        self.inner
            .state
            .send_modify(|state| state.table_number = table_number);
    }

    pub fn set_phone_number(&self, phone_number: impl Into<String>) {
        let phone_number = phone_number.into();
        self.inner
            .state
            .send_modify(|state| state.phone_number = phone_number);
    }

    pub fn set_customer_name(&self, customer_name: impl Into<String>) {
        let customer_name = customer_name.into();
        self.inner
            .state
            .send_modify(|state| state.customer_name = customer_name);
    }

    pub fn set_payment_method(&self, method: PaymentMethod) {
        self.inner
            .state
            .send_modify(|state| state.selected_payment_method = method);
    }

    pub fn clear_error(&self) {
        self.inner.state.send_modify(|state| state.error = None);
    }

    /// Shows a fresh KHQR code and starts polling, or hides it and stops polling
    pub fn show_khqr(&self, show: bool) -> CustomResult<(), CheckoutError> {
        if show {
            Inner::start_payment(&self.inner)
        } else {
            self.dismiss();
            Ok(())
        }
    }

    /// Checkout button: KHQR methods display a code, cash places the order directly
    pub async fn pay_now(&self) -> CustomResult<Option<Order>, CheckoutError> {
        let method = self.inner.state.borrow().selected_payment_method;
        if method.is_khqr() {
            Inner::start_payment(&self.inner)?;
            Ok(None)
        } else {
            self.inner.place_order(false).await.map(Some)
        }
    }

    /// Customer closed the payment dialog; no order is placed
    pub fn dismiss(&self) {
        self.inner.stop_polling();
        self.inner
            .state
            .send_modify(|state| state.clear_payment(PaymentState::Idle));
        tracing::info!("payment dialog dismissed");
    }

    pub async fn place_order(&self, is_paid: bool) -> CustomResult<Order, CheckoutError> {
        self.inner.place_order(is_paid).await
    }

    /// Screen teardown: stops polling and marks a pending payment as cancelled
    pub fn shutdown(&self) {
        self.inner.stop_polling();
        self.inner.state.send_if_modified(|state| {
            if !state.payment_state.is_awaiting() {
                return false;
            }
            state.clear_payment(PaymentState::Cancelled);
            true
        });
    }

    /// Whether a poll task is currently registered
    pub fn is_polling(&self) -> bool {
        self.inner
            .poll_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|slot| !slot.handle.is_finished())
    }
}

impl<V, O> Drop for CheckoutSession<V, O>
where
    V: PaymentVerifier + 'static,
    O: OrderService + 'static,
{
    fn drop(&mut self) {
        self.inner.stop_polling();
    }
}

impl<V, O> Inner<V, O>
where
    V: PaymentVerifier + 'static,
    O: OrderService + 'static,
{
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Invalidates the running poll task and aborts it
    fn stop_polling(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let previous = self
            .poll_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(slot) = previous {
            slot.handle.abort();
            tracing::debug!(generation = slot.generation, "poll task aborted");
        }
    }

    /// Called by the poll task on its own exit; leaves a newer task untouched
    fn release_slot(&self, generation: u64) {
        let mut slot = self.poll_slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|slot| slot.generation == generation) {
            slot.take();
        }
    }

    /// Applies `update` only while `generation` is still the live poll
    fn update_if_current(&self, generation: u64, update: impl FnOnce(&mut CheckoutUiState)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            update(state);
            true
        })
    }

    fn start_payment(this: &Arc<Self>) -> CustomResult<(), CheckoutError> {
        let snapshot = this.state.borrow().clone();
        if let Err(error) = validate_order(&snapshot) {
            this.state
                .send_modify(|state| state.error = Some(error.to_string()));
            return Err(report!(error));
        }

        let bill_number = bill_number(date_time::now_unix_millis());
        let payment = this
            .merchant
            .khqr_config(snapshot.total_price, &bill_number)
            .and_then(|config| KhqrPayment::new(&config))
            .change_context(CheckoutError::KhqrGenerationFailed)
            .inspect_err(|_| {
                this.state.send_modify(|state| {
                    state.error = Some(CheckoutError::KhqrGenerationFailed.to_string())
                });
            })?;

        let deep_link = snapshot
            .selected_payment_method
            .opens_banking_app()
            .then(|| this.merchant.bank().ok())
            .flatten()
            .and_then(|bank| DeepLink::for_bank(bank, &payment.khqr));

        let fingerprint = payment.md5.clone();
        let mut slot = this.poll_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = this.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = slot.take() {
            previous.handle.abort();
            tracing::debug!(generation = previous.generation, "poll task replaced");
        }
        tracing::info!(
            md5 = %payment.md5,
            bill_number = %bill_number,
            amount = %snapshot.total_price,
            "awaiting KHQR payment"
        );

        this.state.send_modify(|state| {
            state.khqr_string = Some(payment.khqr);
            state.payment_md5 = Some(payment.md5);
            state.show_khqr = true;
            state.is_payment_confirmed = false;
            state.error = None;
            state.payment_state = PaymentState::AwaitingPayment { attempts: 0 };
            match deep_link {
                Some(link) => {
                    state.deep_link_url = Some(link.primary);
                    state.deep_link_fallbacks = link.fallbacks;
                }
                None => {
                    state.deep_link_url = None;
                    state.deep_link_fallbacks.clear();
                }
            }
        });

        let task = Arc::clone(this);
        let handle = tokio::spawn(async move {
            task.poll_payment(generation, fingerprint).await;
        });
        *slot = Some(PollSlot { generation, handle });
        Ok(())
    }

    async fn poll_payment(self: Arc<Self>, generation: u64, fingerprint: PaymentFingerprint) {
        let started = Instant::now();
        let mut attempts = 0_u32;
        let mut consecutive_failures = 0_u32;

        loop {
            tokio::time::sleep(self.policy.interval).await;
            if !self.is_current(generation) {
                return;
            }
            if self.policy.is_expired(started.elapsed()) {
                tracing::warn!(md5 = %fingerprint, attempts, "payment confirmation timed out");
                self.give_up(generation, CheckoutError::PaymentTimedOut);
                return;
            }

            attempts += 1;
            match self.verifier.verify_payment(&fingerprint).await {
                Ok(true) => {
                    tracing::info!(md5 = %fingerprint, attempts, "payment confirmed");
                    let confirmed = self.update_if_current(generation, |state| {
                        state.is_payment_confirmed = true;
                        state.show_khqr = false;
                        state.payment_state = PaymentState::Confirmed;
                    });
                    self.release_slot(generation);
                    if confirmed {
                        if let Err(error) = self.submit_order(true).await {
                            tracing::error!(?error, "order placement failed after payment");
                        }
                    }
                    return;
                }
                Ok(false) => {
                    consecutive_failures = 0;
                    tracing::debug!(md5 = %fingerprint, attempts, "payment pending");
                }
                Err(error) => {
                    consecutive_failures += 1;
                    tracing::warn!(?error, consecutive_failures, "payment verification failed");
                    if self.policy.too_many_failures(consecutive_failures) {
                        self.give_up(generation, CheckoutError::VerificationUnavailable);
                        return;
                    }
                }
            }
            self.update_if_current(generation, |state| {
                state.payment_state = PaymentState::AwaitingPayment { attempts };
            });
        }
    }

    fn give_up(&self, generation: u64, error: CheckoutError) {
        self.update_if_current(generation, |state| {
            state.clear_payment(PaymentState::TimedOut);
            state.error = Some(error.to_string());
        });
        self.release_slot(generation);
    }

    /// Places the order from outside the poll task; a pending KHQR payment is abandoned
    async fn place_order(&self, is_paid: bool) -> CustomResult<Order, CheckoutError> {
        self.stop_polling();
        self.state.send_if_modified(|state| {
            if !state.payment_state.is_awaiting() {
                return false;
            }
            state.clear_payment(PaymentState::Idle);
            true
        });
        self.submit_order(is_paid).await
    }

    async fn submit_order(&self, is_paid: bool) -> CustomResult<Order, CheckoutError> {
        let snapshot = self.state.borrow().clone();
        if let Err(error) = validate_order(&snapshot) {
            self.state
                .send_modify(|state| state.error = Some(error.to_string()));
            return Err(report!(error));
        }

        self.state.send_modify(|state| {
            state.is_submitting = true;
            state.show_khqr = false;
            state.error = None;
        });

        let request = CreateOrderRequest {
            customer_phone: snapshot.phone_number.trim().to_string(),
            customer_name: Some(snapshot.customer_name.trim().to_string())
                .filter(|name| !name.is_empty()),
            items: snapshot.items.iter().map(CreateOrderItem::from).collect(),
            order_type: snapshot.order_type,
            table_number: parse_table_number(&snapshot),
            notes: None,
            is_paid,
        };

        match self.orders.create_order(request).await {
            Ok(order) => {
                tracing::info!(order_number = %order.order_number, is_paid, "order placed");
                self.state.send_modify(|state| {
                    state.is_submitting = false;
                    state.items.clear();
                    state.total_price = Default::default();
                    state.success_order = Some(order.clone());
                });
                Ok(order)
            }
            Err(error) => {
                let message = match error.current_context() {
                    ApiClientError::Rejected { message } => Some(message.clone()),
                    ApiClientError::ErrorResponseReceived { message, .. } => message.clone(),
                    _ => None,
                };
                let checkout_error = CheckoutError::order_placement_failed(message);
                self.state.send_modify(|state| {
                    state.is_submitting = false;
                    state.error = Some(checkout_error.to_string());
                });
                Err(error.change_context(checkout_error))
            }
        }
    }
}
