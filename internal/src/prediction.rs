use std::path::Path;

use model::household::Household;
use model::modes::Modes;
use solver::HouseholdModeChoice;

/// Observed-versus-predicted mode frequencies over all households and
/// household iterations, plus the log-probability fitness used by the
/// estimation tooling. Written out as a CSV prediction table.
pub struct PredictionTable {
    mode_names: Vec<String>,
    number_non_shared: usize,
    household_iterations: usize,
    /// observations[observed][predicted]
    observations: Vec<Vec<u32>>,
    /// chosen modes over all trips and iterations, observed or not
    chosen_counts: Vec<u64>,
    /// trips whose observed mode was not feasible for them
    bad_trips: Vec<u32>,
    missing_trips: u32,
    fitness: f64,
    zero_param_fitness: f64,
}

impl PredictionTable {
    pub fn new(modes: &Modes, household_iterations: usize) -> PredictionTable {
        let number_of_modes = modes.len();
        PredictionTable {
            mode_names: modes.all().map(|m| m.name().to_string()).collect(),
            number_non_shared: modes.number_non_shared(),
            household_iterations,
            observations: vec![vec![0; number_of_modes]; number_of_modes],
            chosen_counts: vec![0; number_of_modes],
            bad_trips: vec![0; number_of_modes],
            missing_trips: 0,
            fitness: 0.0,
            zero_param_fitness: 0.0,
        }
    }

    pub fn record_household(&mut self, household: &Household, result: &HouseholdModeChoice) {
        let iterations = self.household_iterations;
        for (person_index, person) in household.persons().iter().enumerate() {
            for (chain_index, chain) in person.trip_chains().iter().enumerate() {
                let chain_data =
                    &result.data.person_data[person_index].trip_chain_data[chain_index];
                for (trip_index, trip) in chain.trips().iter().enumerate() {
                    let trip_data = &chain_data.trip_data[trip_index];
                    for &mode in &trip_data.chosen {
                        self.chosen_counts[mode] += 1;
                    }
                    let chosen = &trip_data.chosen;
                    if chosen.len() < iterations {
                        self.missing_trips += (iterations - chosen.len()) as u32;
                    }
                    if chosen.is_empty() {
                        // failed households score the log-probability floor
                        self.fitness += (1.0 / (iterations as f64 + 1.0)).ln();
                        self.zero_param_fitness += (1.0 / (iterations as f64 + 1.0)).ln();
                        continue;
                    }
                    let Some(observed) = trip.observed_mode() else {
                        self.missing_trips += iterations as u32;
                        continue;
                    };
                    let mut correct = 0;
                    for &predicted in chosen {
                        self.observations[observed][predicted] += 1;
                        if predicted == observed {
                            correct += 1;
                        }
                    }
                    if observed < self.number_non_shared
                        && !trip_data.feasible[observed]
                        && !chain.follows_representative()
                    {
                        self.bad_trips[observed] += 1;
                    }
                    self.fitness +=
                        ((correct as f64 + 1.0) / (chosen.len() as f64 + 1.0)).ln();
                    let mut feasible_modes =
                        1 + trip_data.feasible.iter().filter(|&&f| f).count();
                    if !household.vehicles().is_empty() {
                        feasible_modes += 1;
                    }
                    self.zero_param_fitness += ((chosen.len() as f64 / feasible_modes as f64
                        + 1.0)
                        / (chosen.len() as f64 + 1.0))
                        .ln();
                }
            }
        }
    }

    pub fn chosen_counts(&self) -> &[u64] {
        &self.chosen_counts
    }

    pub fn mode_names(&self) -> &[String] {
        &self.mode_names
    }

    pub fn missing_trips(&self) -> u32 {
        self.missing_trips
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn zero_param_fitness(&self) -> f64 {
        self.zero_param_fitness
    }

    pub fn rho_squared(&self) -> f64 {
        1.0 - self.fitness / self.zero_param_fitness
    }

    /// Writes the prediction table: absolute counts, percentages, fitness
    /// and the infeasible-observed-mode counts.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        let number_of_modes = self.mode_names.len();

        let mut header = vec![String::from("Pred\\Real")];
        header.extend(self.mode_names.iter().cloned());
        header.push(String::from("Row Total"));
        writer.write_record(&header)?;

        let mut column_totals = vec![0u64; number_of_modes];
        let mut correct_total = 0u64;
        let mut total = 0u64;
        for predicted in 0..number_of_modes {
            let mut record = vec![self.mode_names[predicted].clone()];
            let mut row_total = 0u64;
            for observed in 0..number_of_modes {
                let value = self.observations[observed][predicted] as u64;
                record.push(value.to_string());
                column_totals[observed] += value;
                row_total += value;
                if observed == predicted {
                    correct_total += value;
                }
                total += value;
            }
            record.push(row_total.to_string());
            writer.write_record(&record)?;
        }
        let mut record = vec![String::from("Column Total")];
        record.extend(column_totals.iter().map(|v| v.to_string()));
        record.push(correct_total.to_string());
        writer.write_record(&record)?;

        // the same table in percent
        let mut header = vec![String::from("Pred\\Real%")];
        header.extend(self.mode_names.iter().cloned());
        header.push(String::from("Row Total"));
        writer.write_record(&header)?;
        let percent = |value: u64| format!("{:.2}%", 100.0 * value as f64 / total.max(1) as f64);
        for predicted in 0..number_of_modes {
            let mut record = vec![self.mode_names[predicted].clone()];
            let mut row_total = 0u64;
            for observed in 0..number_of_modes {
                let value = self.observations[observed][predicted] as u64;
                record.push(percent(value));
                row_total += value;
            }
            record.push(percent(row_total));
            writer.write_record(&record)?;
        }
        let mut record = vec![String::from("Column Total")];
        record.extend(column_totals.iter().map(|&v| percent(v)));
        record.push(percent(correct_total));
        writer.write_record(&record)?;

        writer.write_record(["Value", self.fitness.to_string().as_str()])?;
        writer.write_record(["ZeroParam", self.zero_param_fitness.to_string().as_str()])?;
        writer.write_record(["Rho^2", self.rho_squared().to_string().as_str()])?;
        writer.write_record(["Number of Non-Feasible Trips"])?;
        for (name, count) in self.mode_names.iter().zip(&self.bad_trips) {
            writer.write_record([name.as_str(), count.to_string().as_str()])?;
        }
        writer.write_record(["Missing Trips", self.missing_trips.to_string().as_str()])?;
        writer.flush()?;
        Ok(())
    }
}
