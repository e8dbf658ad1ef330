use tracing::debug;

/// Outcomes recorded during one experiment.
///
/// A fresh instance is created for every experiment and never shared with another one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    waiting_times: Vec<f64>,
    stay_durations: Vec<f64>,
    total_customers: u64,
    served_customers: u64,
    peak_inside: usize,
}

impl Statistics {
    /// Count a customer who joined the queue. Balked arrivals are not recorded.
    pub fn record_arrival(&mut self) {
        self.total_customers += 1;
    }

    /// Record how long an admitted customer waited, in minutes.
    pub fn record_wait(&mut self, minutes: f64) {
        self.waiting_times.push(minutes);
    }

    /// Count a customer leaving the pool after swimming for `stay` minutes.
    pub fn record_departure(&mut self, stay: f64) {
        self.stay_durations.push(stay);
        self.served_customers += 1;
    }

    pub fn observe_occupancy(&mut self, inside: usize) {
        self.peak_inside = self.peak_inside.max(inside);
    }

    /// Waiting times of admitted customers, in admission order.
    pub fn waiting_times(&self) -> &[f64] {
        &self.waiting_times
    }

    /// Time between admission and departure of served customers, in departure order.
    pub fn stay_durations(&self) -> &[f64] {
        &self.stay_durations
    }

    pub fn total_customers(&self) -> u64 {
        self.total_customers
    }

    pub fn served_customers(&self) -> u64 {
        self.served_customers
    }

    /// Number of customers let into the pool.
    pub fn admitted_customers(&self) -> usize {
        self.waiting_times.len()
    }

    /// Highest number of swimmers inside at once.
    pub fn peak_inside(&self) -> usize {
        self.peak_inside
    }

    pub fn total_waiting_time(&self) -> f64 {
        self.waiting_times.iter().sum()
    }

    /// Mean waiting time of admitted customers, or zero if nobody was admitted.
    pub fn mean_waiting_time(&self) -> f64 {
        mean(&self.waiting_times).unwrap_or(0.0)
    }

    pub fn min_waiting_time(&self) -> Option<f64> {
        self.waiting_times.iter().copied().reduce(f64::min)
    }

    pub fn max_waiting_time(&self) -> Option<f64> {
        self.waiting_times.iter().copied().reduce(f64::max)
    }

    pub fn mean_stay(&self) -> Option<f64> {
        mean(&self.stay_durations)
    }

    /// Admissions per simulated hour over a period of `sim_duration` minutes.
    pub fn hourly_admissions(&self, sim_duration: f64) -> f64 {
        self.admitted_customers() as f64 / (sim_duration / 60.0)
    }

    /// Log a waiting time and customer report for one experiment.
    pub fn report(&self, sim_duration: f64) {
        let (Some(min), Some(max)) = (self.min_waiting_time(), self.max_waiting_time()) else {
            debug!("no waiting time data");
            return;
        };

        debug!(
            average = round2(self.mean_waiting_time()),
            max = round2(max),
            min = round2(min),
            recorded = self.waiting_times.len(),
            total = round2(self.total_waiting_time()),
            "waiting time report (minutes)"
        );
        debug!(
            total = self.total_customers,
            served = self.served_customers,
            peak_inside = self.peak_inside,
            per_hour = round2(self.hourly_admissions(sim_duration)),
            "customer report"
        );
    }
}

/// Round to two decimals, the precision of every reported figure.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
