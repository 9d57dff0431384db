//! HTTP API Layer
//!
//! This crate exposes the settlement, cheque, return and supplier payment
//! operations over REST using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one per domain operation, thin wrappers over the services
//! - **Middleware**: caller role extraction and audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: domain error kinds mapped to status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use interface_api::{create_router, AppState};
//!
//! let ledger = Arc::new(PostgresLedgerAdapter::new(pool, currency));
//! let state = AppState::new(ledger.clone(), ledger, config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use core_kernel::{Currency, HealthCheckResult, HealthCheckable, MoneyError};
use domain_payables::{PayablesPort, PayablesSettlement};
use domain_receivables::{ChequeLifecycleManager, ReceivablesPort, ReturnProcessor, SettlementAllocator};

use crate::config::ApiConfig;
use crate::middleware::{caller_middleware, audit_middleware};
use crate::handlers::{adjustment, cheque, health, settlement, supplier};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settlements: Arc<SettlementAllocator>,
    pub cheques: Arc<ChequeLifecycleManager>,
    pub returns: Arc<ReturnProcessor>,
    pub payables: Arc<PayablesSettlement>,
    receivables_store: Arc<dyn ReceivablesPort>,
    payables_store: Arc<dyn PayablesPort>,
    /// Currency request amounts are read in
    pub currency: Currency,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the services over the given stores
    ///
    /// The PostgreSQL adapter implements both ports, so in production the
    /// same store is passed twice.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::UnknownCurrency` if the configured currency is
    /// not recognised
    pub fn new(
        receivables: Arc<dyn ReceivablesPort>,
        payables: Arc<dyn PayablesPort>,
        config: ApiConfig,
    ) -> Result<Self, MoneyError> {
        let currency = config.ledger_currency()?;
        Ok(Self {
            settlements: Arc::new(SettlementAllocator::new(receivables.clone())),
            cheques: Arc::new(ChequeLifecycleManager::new(receivables.clone())),
            returns: Arc::new(ReturnProcessor::new(receivables.clone())),
            payables: Arc::new(PayablesSettlement::new(payables.clone())),
            receivables_store: receivables,
            payables_store: payables,
            currency,
            config,
        })
    }

    /// Health of each backing store
    pub async fn store_health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.receivables_store.health_check().await,
            self.payables_store.health_check().await,
        ]
    }
}

/// Creates the main API router
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no caller role required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Customer side
    let receivables_routes = Router::new()
        .route("/settlements", post(settlement::create_settlement))
        .route("/customers/:id/outstanding-invoices", get(settlement::list_outstanding_invoices))
        .route("/payments/:id/cheque-status", post(cheque::update_cheque_status))
        .route("/orders/:id/adjustments", post(adjustment::adjust_order));

    // Supplier side
    let payables_routes = Router::new()
        .route("/supplier-payments", post(supplier::record_payment))
        .route("/supplier-payments/:id/cheque-status", post(supplier::update_cheque_status))
        .route("/accounts/:id/overdraft-advisory", get(supplier::overdraft_advisory));

    let api_routes = Router::new()
        .merge(receivables_routes)
        .merge(payables_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn(caller_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
