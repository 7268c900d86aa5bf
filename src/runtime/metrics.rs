use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

#[derive(Debug, Clone, Default)]
pub struct PurchaseMetrics {
    pub attempts: Counter,
    pub successes: Counter,
    pub failures: Counter,
}

impl PurchaseMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register("buy_attempts", "Total buy attempts", self.attempts.clone());
        registry.register("buy_success", "Total successful buys", self.successes.clone());
        registry.register("buy_failed", "Total failed buys", self.failures.clone());
    }

    pub fn record<T, E>(&self, outcome: &Result<T, E>) {
        self.attempts.inc();
        if outcome.is_ok() {
            self.successes.inc();
        } else {
            self.failures.inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn records_outcomes_and_exports_them() {
        let metrics = PurchaseMetrics::new();
        let mut registry = Registry::default();
        metrics.register(&mut registry);

        metrics.record::<(), ()>(&Ok(()));
        metrics.record::<(), ()>(&Err(()));
        metrics.record::<(), ()>(&Err(()));

        assert_eq!(metrics.attempts.get(), 3);
        assert_eq!(metrics.successes.get(), 1);
        assert_eq!(metrics.failures.get(), 2);

        let mut exported = String::new();
        encode(&mut exported, &registry).expect("encode");
        assert!(exported.contains("buy_attempts_total 3"));
    }
}
