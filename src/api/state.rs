use std::sync::Arc;
use crate::{
    config::Settings,
    payments::PaymentGateway,
    reconcile::SettlementReconciler,
};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub reconciler: Arc<SettlementReconciler>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        reconciler: Arc<SettlementReconciler>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            gateway,
            reconciler,
            settings,
        }
    }
}
