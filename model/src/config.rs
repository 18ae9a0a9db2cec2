/// Run parameters of the mode choice algorithm.
pub struct Config {
    /// Number of Monte-Carlo repetitions per household. Every iteration
    /// draws fresh error terms and produces one chosen mode per trip.
    pub household_iterations: usize,
    /// Base seed; each household derives its own stream from this plus its
    /// household id.
    pub random_seed: u64,
    /// Households containing a longer trip chain are skipped. 0 disables
    /// the check.
    pub max_trip_chain_size: usize,
    pub mode_names: ConfigModeNames,
}

pub struct ConfigModeNames {
    /// The mode that turns into rideshare on joint tours. Only consulted if
    /// a rideshare mode is configured.
    pub auto: String,
    /// Leave empty to skip rideshare processing.
    pub rideshare: Option<String>,
    /// Leave empty to skip passenger matching.
    pub passenger: Option<String>,
}
