//! Exchange flow controller.
//!
//! Drives one product exchange at a time:
//! `Browsing -> QuantitySelection -> CodeVerification -> Submitting -> Success | Failed`.
//! A failure returns to `CodeVerification` with the product and quantity
//! kept; a success refreshes the catalog and balance and returns to
//! `Browsing`.
//!
//! State sits behind an async mutex that is never held across a service
//! call. `Submitting` doubles as the in-flight guard, so overlapping
//! submissions collapse into a single request.

use super::classify::{FailureClassifier, MessageClassifier};
use super::countdown::Countdown;
use super::error::FlowError;
use super::validation::{check_exchange_allowed, check_quantity};
use crate::notice::Notice;
use jifeng_core::{CatalogService, ExchangeRequest, ExchangeService, Product};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

const CODE_COOLDOWN_SECS: u64 = 60;

/// Where the user is in the exchange flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Browsing,
    QuantitySelection,
    CodeVerification,
    Submitting,
    Success,
    Failed,
}

#[derive(Debug, Clone)]
pub struct FlowOptions {
    /// Minimum wait between two code requests
    pub code_cooldown: Duration,
    /// Pass codes echoed by development backends through to the caller
    pub expose_echoed_code: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            code_cooldown: Duration::from_secs(CODE_COOLDOWN_SECS),
            expose_echoed_code: false,
        }
    }
}

/// Snapshot of the code entry state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationSession {
    pub code: String,
    pub sent: bool,
    pub countdown_seconds: u32,
    /// Error shown at the code field
    pub last_error: Option<String>,
}

/// Which parts of a load succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub products_loaded: bool,
    pub balance_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSent {
    pub echoed_code: Option<String>,
}

/// Result of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReceipt {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub points_spent: u64,
    /// Balance after the post-exchange refresh
    pub balance: u64,
    /// False if the refresh failed and `balance` is stale
    pub refreshed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Exchanged(ExchangeReceipt),
    /// A submission was already pending; nothing was sent
    AlreadySubmitting,
}

struct FlowState {
    stage: FlowStage,
    products: Vec<Product>,
    balance: u64,
    selected_id: Option<String>,
    quantity: u32,
    code: String,
    code_sent: bool,
    code_error: Option<String>,
    sending_code: bool,
    notices: Vec<Notice>,
}

impl FlowState {
    fn new() -> Self {
        Self {
            stage: FlowStage::Browsing,
            products: Vec::new(),
            balance: 0,
            selected_id: None,
            quantity: 1,
            code: String::new(),
            code_sent: false,
            code_error: None,
            sending_code: false,
            notices: Vec::new(),
        }
    }

    fn selected(&self) -> Option<&Product> {
        let id = self.selected_id.as_ref()?;
        self.products.iter().find(|p| &p.id == id)
    }

    fn selected_or_err(&self) -> Result<Product, FlowError> {
        self.selected().cloned().ok_or_else(|| {
            FlowError::UnknownProduct(self.selected_id.clone().unwrap_or_default())
        })
    }

    fn reset_code(&mut self) {
        self.code.clear();
        self.code_sent = false;
        self.code_error = None;
    }

    fn reset_selection(&mut self) {
        self.selected_id = None;
        self.quantity = 1;
        self.reset_code();
    }
}

pub struct ExchangeFlowController {
    catalog: Arc<dyn CatalogService>,
    exchange: Arc<dyn ExchangeService>,
    classifier: Box<dyn FailureClassifier>,
    options: FlowOptions,
    state: Mutex<FlowState>,
    stage_tx: watch::Sender<FlowStage>,
    countdown: Countdown,
}

impl ExchangeFlowController {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        exchange: Arc<dyn ExchangeService>,
        options: FlowOptions,
    ) -> Self {
        let (stage_tx, _) = watch::channel(FlowStage::Browsing);
        Self {
            catalog,
            exchange,
            classifier: Box::new(MessageClassifier::new()),
            countdown: Countdown::new(options.code_cooldown),
            options,
            state: Mutex::new(FlowState::new()),
            stage_tx,
        }
    }

    /// Replace the default message-based failure classifier
    pub fn with_classifier(mut self, classifier: Box<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    fn enter(&self, state: &mut FlowState, stage: FlowStage) {
        if state.stage != stage {
            debug!("Exchange flow: {:?} -> {:?}", state.stage, stage);
        }
        state.stage = stage;
        self.stage_tx.send_replace(stage);
    }

    /// Fetch the catalog and the balance concurrently.
    ///
    /// Each half fails independently: a failed catalog fetch keeps the
    /// current list, a failed balance fetch shows 0. Both record a notice.
    pub async fn load(&self) -> LoadReport {
        let (products, balance) =
            tokio::join!(self.catalog.list_products(), self.catalog.get_balance());

        let mut state = self.state.lock().await;
        let products_loaded = match products {
            Ok(products) => {
                debug!("Loaded {} products", products.len());
                state.products = products;
                true
            }
            Err(e) => {
                warn!("Failed to load products: {}", e);
                state.notices.push(Notice::error(
                    "Failed to load products",
                    e.server_message(),
                ));
                false
            }
        };
        let balance_loaded = match balance {
            Ok(balance) => {
                state.balance = balance;
                true
            }
            Err(e) => {
                warn!("Failed to load balance: {}", e);
                state.balance = 0;
                state.notices.push(Notice::error(
                    "Failed to load points balance",
                    e.server_message(),
                ));
                false
            }
        };

        LoadReport {
            products_loaded,
            balance_loaded,
        }
    }

    /// Pick a product to exchange; quantity starts at 1
    pub async fn select_product(&self, id: &str) -> Result<Product, FlowError> {
        let mut state = self.state.lock().await;
        match state.stage {
            FlowStage::Browsing | FlowStage::QuantitySelection => {}
            stage => {
                return Err(FlowError::InvalidStage {
                    operation: "select a product",
                    stage,
                })
            }
        }

        let product = state
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownProduct(id.to_string()))?;
        if let Some(reason) = product.unavailable_reason() {
            debug!("Product {} not selectable: {:?}", product.id, reason);
            return Err(FlowError::IneligibleProduct(product.name));
        }

        state.selected_id = Some(product.id.clone());
        state.quantity = 1;
        self.enter(&mut state, FlowStage::QuantitySelection);
        Ok(product)
    }

    /// Accepts `1..=remaining`; anything else leaves the quantity unchanged
    pub async fn set_quantity(&self, quantity: u32) -> Result<(), FlowError> {
        let mut state = self.state.lock().await;
        if state.stage != FlowStage::QuantitySelection {
            return Err(FlowError::InvalidStage {
                operation: "change the quantity",
                stage: state.stage,
            });
        }

        let product = state.selected_or_err()?;
        check_quantity(&product, quantity)?;
        state.quantity = quantity;
        Ok(())
    }

    /// Validate the selection against the latest snapshot and move on to
    /// code entry. No request is made.
    pub async fn request_exchange(&self) -> Result<(), FlowError> {
        let mut state = self.state.lock().await;
        if state.stage != FlowStage::QuantitySelection {
            return Err(FlowError::InvalidStage {
                operation: "request an exchange",
                stage: state.stage,
            });
        }

        let product = state.selected_or_err()?;
        check_exchange_allowed(&product, state.quantity, state.balance)?;

        debug!(
            "Exchange of {} x {} passed validation ({} points)",
            state.quantity,
            product.id,
            product.cost(state.quantity)
        );
        self.enter(&mut state, FlowStage::CodeVerification);
        Ok(())
    }

    pub async fn set_verification_code(&self, code: &str) -> Result<(), FlowError> {
        let mut state = self.state.lock().await;
        if state.stage != FlowStage::CodeVerification {
            return Err(FlowError::InvalidStage {
                operation: "enter a verification code",
                stage: state.stage,
            });
        }
        state.code = code.to_string();
        state.code_error = None;
        Ok(())
    }

    /// Ask the backend to send a code. Blocked while the cooldown runs.
    pub async fn send_verification_code(&self) -> Result<CodeSent, FlowError> {
        {
            let mut state = self.state.lock().await;
            if state.stage != FlowStage::CodeVerification {
                return Err(FlowError::InvalidStage {
                    operation: "request a verification code",
                    stage: state.stage,
                });
            }
            let left = self.countdown.remaining();
            if left > 0 {
                return Err(FlowError::CodeCooldownActive(left));
            }
            if state.sending_code {
                return Err(FlowError::CodeRequestInFlight);
            }
            state.sending_code = true;
        }

        let result = self.exchange.send_verification_code().await;

        let mut state = self.state.lock().await;
        state.sending_code = false;
        match result {
            Ok(dispatch) => {
                // The flow may have been cancelled while the request was out
                if state.stage == FlowStage::CodeVerification {
                    self.countdown.start();
                    state.code_sent = true;
                    state.code_error = None;
                }
                info!("Verification code sent");
                let echoed_code = dispatch
                    .echoed_code
                    .filter(|_| self.options.expose_echoed_code);
                Ok(CodeSent { echoed_code })
            }
            Err(e) => {
                warn!("Failed to send verification code: {}", e);
                Err(FlowError::CodeSendFailed(e.server_message()))
            }
        }
    }

    /// Submit the exchange with the entered code.
    ///
    /// Calling this while a submission is pending returns
    /// `AlreadySubmitting` and sends nothing.
    pub async fn submit_exchange(&self) -> Result<SubmitOutcome, FlowError> {
        let (request, product_name, points_spent) = {
            let mut state = self.state.lock().await;
            match state.stage {
                FlowStage::Submitting => return Ok(SubmitOutcome::AlreadySubmitting),
                FlowStage::CodeVerification => {}
                stage => {
                    return Err(FlowError::InvalidStage {
                        operation: "submit an exchange",
                        stage,
                    })
                }
            }

            let code = state.code.trim().to_string();
            if code.is_empty() {
                state.code_error = Some(FlowError::MissingVerificationCode.to_string());
                return Err(FlowError::MissingVerificationCode);
            }

            let product = state.selected_or_err()?;
            self.enter(&mut state, FlowStage::Submitting);
            (
                ExchangeRequest {
                    product_id: product.id.clone(),
                    quantity: state.quantity,
                    verification_code: code,
                },
                product.name.clone(),
                product.cost(state.quantity),
            )
        };

        info!(
            "Submitting exchange: {} x {}",
            request.quantity, request.product_id
        );

        match self.exchange.submit_exchange(&request).await {
            Ok(()) => {
                let receipt = self
                    .complete_exchange(request, product_name, points_spent)
                    .await;
                Ok(SubmitOutcome::Exchanged(receipt))
            }
            Err(e) => {
                let failure = self.classifier.classify(&e.server_message());
                warn!("Exchange rejected: {}", e);

                let mut state = self.state.lock().await;
                self.enter(&mut state, FlowStage::Failed);
                if failure.is_verification_scoped() {
                    state.code_error = Some(failure.user_message());
                } else {
                    state.code_error = None;
                    state
                        .notices
                        .push(Notice::error("Exchange failed", failure.user_message()));
                }
                self.enter(&mut state, FlowStage::CodeVerification);
                Err(FlowError::ExchangeFailed(failure))
            }
        }
    }

    async fn complete_exchange(
        &self,
        request: ExchangeRequest,
        product_name: String,
        points_spent: u64,
    ) -> ExchangeReceipt {
        {
            let mut state = self.state.lock().await;
            self.enter(&mut state, FlowStage::Success);
            state.reset_code();
        }
        self.countdown.cancel();

        let (products, balance) =
            tokio::join!(self.catalog.list_products(), self.catalog.get_balance());

        let mut state = self.state.lock().await;
        let mut refreshed = true;
        match products {
            Ok(products) => state.products = products,
            Err(e) => {
                warn!("Product refresh after exchange failed: {}", e);
                refreshed = false;
            }
        }
        match balance {
            Ok(balance) => state.balance = balance,
            Err(e) => {
                warn!("Balance refresh after exchange failed: {}", e);
                refreshed = false;
            }
        }
        if !refreshed {
            state.notices.push(Notice::warning(
                "Refresh failed",
                "The exchange went through, but the latest balance and products could not be loaded.",
            ));
        }

        info!(
            "Exchanged {} x {} for {} points",
            request.quantity, request.product_id, points_spent
        );
        state.notices.push(Notice::success(
            "Exchange successful",
            format!(
                "Exchanged {} x {} for {} points",
                request.quantity, product_name, points_spent
            ),
        ));

        state.reset_selection();
        self.enter(&mut state, FlowStage::Browsing);

        ExchangeReceipt {
            product_id: request.product_id,
            product_name,
            quantity: request.quantity,
            points_spent,
            balance: state.balance,
            refreshed,
        }
    }

    /// Leave the flow and discard the selection and code state
    pub async fn cancel(&self) -> Result<(), FlowError> {
        let mut state = self.state.lock().await;
        match state.stage {
            FlowStage::Submitting => Err(FlowError::SubmissionInFlight),
            FlowStage::Browsing | FlowStage::Success => Ok(()),
            _ => {
                state.reset_selection();
                self.enter(&mut state, FlowStage::Browsing);
                self.countdown.cancel();
                Ok(())
            }
        }
    }

    pub fn stage(&self) -> FlowStage {
        *self.stage_tx.borrow()
    }

    pub fn subscribe_stage(&self) -> watch::Receiver<FlowStage> {
        self.stage_tx.subscribe()
    }

    /// Per-second cooldown updates
    pub fn subscribe_countdown(&self) -> watch::Receiver<u32> {
        self.countdown.subscribe()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.state.lock().await.products.clone()
    }

    pub async fn balance(&self) -> u64 {
        self.state.lock().await.balance
    }

    pub async fn selected(&self) -> Option<Product> {
        self.state.lock().await.selected().cloned()
    }

    pub async fn quantity(&self) -> u32 {
        self.state.lock().await.quantity
    }

    /// Points needed for the current selection
    pub async fn required_points(&self) -> Option<u64> {
        let state = self.state.lock().await;
        state.selected().map(|p| p.cost(state.quantity))
    }

    /// Balance left after the current selection, floored at 0
    pub async fn balance_after(&self) -> Option<u64> {
        let state = self.state.lock().await;
        state
            .selected()
            .map(|p| state.balance.saturating_sub(p.cost(state.quantity)))
    }

    pub async fn verification(&self) -> VerificationSession {
        let state = self.state.lock().await;
        VerificationSession {
            code: state.code.clone(),
            sent: state.code_sent,
            countdown_seconds: self.countdown.remaining(),
            last_error: state.code_error.clone(),
        }
    }

    /// Drain pending notices
    pub async fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().await.notices)
    }
}
