use std::fs::File;
use std::io::Read;

use crate::run;

fn load_example_instance() -> serde_json::Value {
    let mut file = File::open("resources/example_instance.json").unwrap();
    let mut input_data = String::new();
    file.read_to_string(&mut input_data).unwrap();
    serde_json::from_str(&input_data).unwrap()
}

#[test]
fn example_instance_runs_and_reports() {
    let (summary, table) = run(load_example_instance());

    assert_eq!(summary["households"], 3);
    assert_eq!(summary["failedHouseholds"], 0);
    assert_eq!(summary["notStarted"], 0);
    assert_eq!(summary["householdIterations"], 4);

    // 10 trips over 4 iterations, one chosen mode each
    let total_chosen: u64 = table.chosen_counts().iter().sum();
    assert_eq!(total_chosen, 10 * 4);
    assert_eq!(table.missing_trips(), 0);

    // the fitness values form a finite rho^2
    assert!(summary["fitness"].as_f64().unwrap() < 0.0);
    assert!(summary["zeroParamFitness"].as_f64().unwrap() < 0.0);
    assert!(summary["rhoSquared"].as_f64().unwrap().is_finite());
}

#[test]
fn prediction_table_is_written_as_csv() {
    let (_, table) = run(load_example_instance());

    let path = std::env::temp_dir().join("mode_choice_prediction_table.csv");
    table.write_csv(&path).unwrap();

    let mut written = String::new();
    File::open(&path)
        .unwrap()
        .read_to_string(&mut written)
        .unwrap();
    assert!(written.starts_with("Pred\\Real"));
    assert!(written.contains("Column Total"));
    assert!(written.contains("Rho^2"));
}
