// In crates/execution/src/testing.rs

use crate::gateway::{Gateway, GatewayError};
use async_trait::async_trait;
use core_types::{
    Fill, IdempotencyKey, OrderAmount, OrderOutcome, OrderRequest, OrderSide, OrderStatus, Symbol,
};
use notifier::{Notifier, TradeEvent};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// How the scripted gateway answers the next submission.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Submit {
    Fill,
    /// Trades the order, then loses the answer.
    FillThenTimeout,
    Reject,
    Unknown,
    Timeout,
    Network,
    AuthFail,
}

/// How the scripted gateway answers the next status query.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Query {
    Fill,
    NotFound,
    Pending,
    Timeout,
}

/// An in-memory venue whose answers are queued up by the test.
/// Unscripted submissions fill; unscripted queries report what the venue
/// actually traded under the key, or nothing.
pub(crate) struct ScriptedGateway {
    balance: Mutex<Decimal>,
    price: Mutex<Decimal>,
    submit_script: Mutex<VecDeque<Submit>>,
    query_script: Mutex<VecDeque<Query>>,
    submissions: Mutex<Vec<OrderRequest>>,
    fills: Mutex<Vec<(OrderSide, IdempotencyKey)>>,
    executed: Mutex<Vec<(IdempotencyKey, Fill)>>,
    balance_calls: AtomicU32,
    status_queries: AtomicU32,
    next_order_id: AtomicU32,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            balance: Mutex::new(dec!(1000)),
            price: Mutex::new(dec!(100)),
            submit_script: Mutex::new(VecDeque::new()),
            query_script: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
            fills: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
            balance_calls: AtomicU32::new(0),
            status_queries: AtomicU32::new(0),
            next_order_id: AtomicU32::new(1),
        }
    }

    pub(crate) fn set_balance(&self, balance: Decimal) {
        *self.balance.lock().unwrap() = balance;
    }

    pub(crate) fn set_price(&self, price: Decimal) {
        *self.price.lock().unwrap() = price;
    }

    pub(crate) fn script_submits(&self, steps: impl IntoIterator<Item = Submit>) {
        self.submit_script.lock().unwrap().extend(steps);
    }

    pub(crate) fn script_queries(&self, steps: impl IntoIterator<Item = Query>) {
        self.query_script.lock().unwrap().extend(steps);
    }

    pub(crate) fn submissions(&self) -> Vec<OrderRequest> {
        self.submissions.lock().unwrap().clone()
    }

    /// Every order that traded, in the order the venue filled them.
    pub(crate) fn fills(&self) -> Vec<(OrderSide, IdempotencyKey)> {
        self.fills.lock().unwrap().clone()
    }

    /// How many times the venue traded, counting every submission that executed.
    pub(crate) fn executions(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    pub(crate) fn balance_calls(&self) -> u32 {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_queries(&self) -> u32 {
        self.status_queries.load(Ordering::SeqCst)
    }

    fn fill(&self, request: &OrderRequest) -> Fill {
        let price = *self.price.lock().unwrap();
        let quantity = match request.amount {
            OrderAmount::Notional(notional) => notional / price,
            OrderAmount::Quantity(quantity) => quantity,
        };

        let mut fills = self.fills.lock().unwrap();
        if !fills.iter().any(|(_, key)| key == &request.idempotency_key) {
            fills.push((request.side, request.idempotency_key.clone()));
        }

        Fill {
            price,
            quantity,
            exchange_order_id: self.next_order_id.fetch_add(1, Ordering::SeqCst).to_string(),
        }
    }

    fn execute(&self, request: &OrderRequest) -> Fill {
        let fill = self.fill(request);
        self.executed
            .lock()
            .unwrap()
            .push((request.idempotency_key.clone(), fill.clone()));
        fill
    }

    fn executed_fill(&self, key: &IdempotencyKey) -> Option<Fill> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, fill)| fill.clone())
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    fn name(&self) -> &'static str {
        "ScriptedGateway"
    }

    async fn get_quote_balance(&self, _asset: &str) -> Result<Decimal, GatewayError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_last_price(&self, _symbol: &Symbol) -> Result<Decimal, GatewayError> {
        Ok(*self.price.lock().unwrap())
    }

    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderOutcome, GatewayError> {
        self.submissions.lock().unwrap().push(request.clone());
        let step = self
            .submit_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Submit::Fill);

        match step {
            Submit::Fill => Ok(OrderOutcome::Filled(self.execute(request))),
            Submit::FillThenTimeout => {
                self.execute(request);
                Err(GatewayError::Timeout("no answer within 10s".to_string()))
            }
            Submit::Reject => Ok(OrderOutcome::Rejected {
                reason: "Account has insufficient balance for requested action.".to_string(),
            }),
            Submit::Unknown => Ok(OrderOutcome::Unknown),
            Submit::Timeout => Err(GatewayError::Timeout("no answer within 10s".to_string())),
            Submit::Network => Err(GatewayError::Network("connection reset".to_string())),
            Submit::AuthFail => Err(GatewayError::Authentication("invalid API key".to_string())),
        }
    }

    async fn get_order_status(
        &self,
        _symbol: &Symbol,
        key: &IdempotencyKey,
    ) -> Result<OrderStatus, GatewayError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        let step = self.query_script.lock().unwrap().pop_front();
        let Some(step) = step else {
            return Ok(match self.executed_fill(key) {
                Some(fill) => OrderStatus::Filled(fill),
                None => OrderStatus::NotFound,
            });
        };

        match step {
            Query::Fill => {
                let request = self
                    .submissions
                    .lock()
                    .unwrap()
                    .iter()
                    .rev()
                    .find(|r| &r.idempotency_key == key)
                    .cloned();
                match request {
                    Some(request) => Ok(OrderStatus::Filled(self.fill(&request))),
                    None => Ok(OrderStatus::NotFound),
                }
            }
            Query::NotFound => Ok(OrderStatus::NotFound),
            Query::Pending => Ok(OrderStatus::Pending),
            Query::Timeout => Err(GatewayError::Timeout("no answer within 10s".to_string())),
        }
    }
}

/// Keeps every event it is handed; can be told to fail delivery.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: Mutex<Vec<TradeEvent>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub(crate) fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: AtomicBool::new(true),
        }
    }

    pub(crate) fn events(&self) -> Vec<TradeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "RecordingNotifier"
    }

    async fn notify(&self, event: &TradeEvent) -> notifier::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(notifier::Error::Status {
                status: 500,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}
