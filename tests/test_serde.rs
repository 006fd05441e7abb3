#![cfg(feature = "serde")]

use genalps::{
    alps::AgedGenotype,
    evolution::{EvolutionOptions, StopReason},
    objective::{Direction, ObjectiveVector},
    population::Solution,
    selection::TournamentSelector,
};

#[test]
fn test_options_survive_json() {
    let options = EvolutionOptions::builder()
        .population_size(64)
        .mutation_rate(0.25)
        .parallel_threshold(8)
        .build();

    let json = serde_json::to_string(&options).unwrap();
    let restored: EvolutionOptions = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.get_population_size(), 64);
    assert_eq!(restored.get_mutation_rate(), 0.25);
    assert_eq!(restored.get_parallel_threshold(), 8);
}

#[test]
fn test_aged_solution_survives_json() {
    let solution = Solution::new(
        AgedGenotype::new(vec![3u32, 1, 4], 7),
        ObjectiveVector::from(vec![8.0, -1.5]),
    );

    let json = serde_json::to_string(&solution).unwrap();
    let restored: Solution<AgedGenotype<Vec<u32>>> = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, solution);
    assert_eq!(restored.genotype().age(), 7);
}

#[test]
fn test_configuration_values_serialize() {
    let selector = TournamentSelector::new(5).unwrap();
    let json = serde_json::to_string(&selector).unwrap();
    assert_eq!(serde_json::from_str::<TournamentSelector>(&json).unwrap(), selector);

    let directions = vec![Direction::Minimize, Direction::Maximize];
    let json = serde_json::to_string(&directions).unwrap();
    assert_eq!(serde_json::from_str::<Vec<Direction>>(&json).unwrap(), directions);

    let json = serde_json::to_string(&StopReason::Cancelled).unwrap();
    assert_eq!(serde_json::from_str::<StopReason>(&json).unwrap(), StopReason::Cancelled);
}

#[test]
fn test_invalid_parameters_are_rejected_on_load() {
    let result = serde_json::from_str::<TournamentSelector>(r#"{"tournament_size":0}"#);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Tournament size must be at least 1"));

    let restored: TournamentSelector = serde_json::from_str(r#"{"tournament_size":1}"#).unwrap();
    assert_eq!(restored.tournament_size(), 1);

    let empty = r#"{"population_size":0,"mutation_rate":0.1,"parallel_threshold":32}"#;
    assert!(serde_json::from_str::<EvolutionOptions>(empty).is_err());

    let out_of_range = r#"{"population_size":10,"mutation_rate":1.5,"parallel_threshold":32}"#;
    assert!(serde_json::from_str::<EvolutionOptions>(out_of_range).is_err());
}
