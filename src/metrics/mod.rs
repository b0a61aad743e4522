use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use crate::actors::SupervisionStrategy;
use crate::models::Coffee;

// ============================================================================
// Metrics Module - Prometheus metrics for the coffee house
// ============================================================================
//
// Tracks:
// - Guest lifecycle (created, departed, currently seated)
// - Admission decisions against the caffeine limit
// - Barista output (prepared as ordered vs substituted, stash depth)
// - Waiter traffic (coffees served, complaints)
// - Supervision directives issued by the house
//
// Metrics live in a private registry and are rendered as text on demand by
// the terminal `metrics` command.
// ============================================================================

/// Central metrics registry for the coffee house
pub struct Metrics {
    registry: Registry,

    // Guest Metrics
    pub guests_created: IntCounter,
    pub guests_departed: IntCounter,
    pub guests_current: IntGauge,
    pub admissions: IntCounterVec,

    // Barista Metrics
    pub coffees_prepared: IntCounterVec,
    pub preparation_duration: HistogramVec,
    pub barista_stash_depth: IntGaugeVec,

    // Waiter Metrics
    pub coffees_served: IntCounterVec,
    pub complaints: IntCounter,

    // Supervision Metrics
    pub supervision_directives: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Guest Metrics
        let guests_created = IntCounter::new("guests_created_total", "Total guests created")?;
        registry.register(Box::new(guests_created.clone()))?;

        let guests_departed = IntCounter::new("guests_departed_total", "Total guests that left the house")?;
        registry.register(Box::new(guests_departed.clone()))?;

        let guests_current = IntGauge::new("guests_current", "Guests currently in the guest book")?;
        registry.register(Box::new(guests_current.clone()))?;

        let admissions = IntCounterVec::new(
            Opts::new("admissions_total", "Coffee admission decisions"),
            &["decision"],
        )?;
        registry.register(Box::new(admissions.clone()))?;

        // Barista Metrics
        let coffees_prepared = IntCounterVec::new(
            Opts::new("coffees_prepared_total", "Coffees prepared by baristas"),
            &["coffee", "outcome"],
        )?;
        registry.register(Box::new(coffees_prepared.clone()))?;

        let preparation_duration = HistogramVec::new(
            HistogramOpts::new("coffee_preparation_duration_seconds", "Time from order start to coffee ready")
                .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
            &["barista"],
        )?;
        registry.register(Box::new(preparation_duration.clone()))?;

        let barista_stash_depth = IntGaugeVec::new(
            Opts::new("barista_stash_depth", "Orders waiting while the barista is busy"),
            &["barista"],
        )?;
        registry.register(Box::new(barista_stash_depth.clone()))?;

        // Waiter Metrics
        let coffees_served = IntCounterVec::new(
            Opts::new("coffees_served_total", "Coffees handed to guests"),
            &["coffee"],
        )?;
        registry.register(Box::new(coffees_served.clone()))?;

        let complaints = IntCounter::new("complaints_total", "Complaints received by the waiter")?;
        registry.register(Box::new(complaints.clone()))?;

        // Supervision Metrics
        let supervision_directives = IntCounterVec::new(
            Opts::new("supervision_directives_total", "Supervision directives issued"),
            &["child", "directive"],
        )?;
        registry.register(Box::new(supervision_directives.clone()))?;

        Ok(Self {
            registry,
            guests_created,
            guests_departed,
            guests_current,
            admissions,
            coffees_prepared,
            preparation_duration,
            barista_stash_depth,
            coffees_served,
            complaints,
            supervision_directives,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a finished preparation
    pub fn record_preparation(&self, barista: &str, requested: Coffee, delivered: Coffee, duration_secs: f64) {
        let coffee = requested.to_string();
        let outcome = if requested == delivered { "as_ordered" } else { "substituted" };
        self.coffees_prepared
            .with_label_values(&[coffee.as_str(), outcome])
            .inc();
        self.preparation_duration
            .with_label_values(&[barista])
            .observe(duration_secs);
    }

    /// Helper to record an admission decision
    pub fn record_admission(&self, granted: bool) {
        let decision = if granted { "granted" } else { "denied" };
        self.admissions.with_label_values(&[decision]).inc();
    }

    /// Helper to record a supervision directive for a kind of child
    pub fn record_directive(&self, child: &str, directive: SupervisionStrategy) {
        self.supervision_directives
            .with_label_values(&[child, directive.as_str()])
            .inc();
    }

    pub fn record_guest_arrived(&self) {
        self.guests_created.inc();
        self.guests_current.inc();
    }

    pub fn record_guest_departed(&self) {
        self.guests_departed.inc();
        self.guests_current.dec();
    }

    /// Render every metric in the Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
