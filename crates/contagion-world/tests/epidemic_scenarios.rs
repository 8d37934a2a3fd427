use contagion_core::{Disease, HealthStatus, PopulationConfig, Position, RunConfig, Stats};
use contagion_world::{Agent, Outcome, Simulation};
use proptest::prelude::*;

fn run_config(seed: u64, size: usize, infected: usize, disease: Disease) -> RunConfig {
    RunConfig {
        seed,
        population: PopulationConfig {
            size,
            initial_infected: infected,
        },
        disease,
        ..Default::default()
    }
}

#[test]
fn co_located_contact_is_infected_with_certain_transmission() {
    let disease = Disease {
        transmission_rate: 1.0,
        duration: 100,
        ..Default::default()
    };

    for seed in 0..50 {
        // Every position reachable in one move from (50, 50) stays in cell (4, 4).
        let mut sick = Agent::new(Position::new(50.0, 50.0));
        sick.infect(0);
        let agents = vec![sick, Agent::new(Position::new(50.0, 50.0))];
        let mut sim =
            Simulation::from_agents(run_config(seed, 2, 0, disease.clone()), agents).unwrap();

        let record = sim.step();
        assert_eq!(record.new_infections, 1);
        assert_eq!(sim.agents()[1].infected_on, Some(1));
        assert_eq!(record.stats.sick, 2);
    }
}

#[test]
fn single_case_recovers_without_spreading() {
    let disease = Disease {
        transmission_rate: 0.0,
        fatality_rate: 0.0,
        duration: 5,
        ..Default::default()
    };
    let mut sim = Simulation::new(run_config(17, 100, 1, disease)).unwrap();

    for _ in 0..6 {
        sim.step();
    }

    let stats = sim.stats();
    assert_eq!(
        stats,
        Stats {
            sick: 0,
            healthy: 99,
            recovered: 1,
            dead: 0,
            alive: 100,
        }
    );
}

#[test]
fn certain_fatality_kills_seeded_cases_after_duration() {
    let disease = Disease {
        transmission_rate: 0.0,
        reinfection_ratio: 0.0,
        fatality_rate: 1.0,
        duration: 1,
        ..Default::default()
    };
    let mut sim = Simulation::new(run_config(23, 50, 10, disease)).unwrap();

    let record = sim.step();
    assert_eq!(record.deaths, 10);
    assert_eq!(record.stats.sick, 0);
    assert_eq!(record.stats.dead, 10);
    assert_eq!(record.stats.healthy, 40);
}

#[test]
fn sick_count_only_falls_without_transmission() {
    let disease = Disease {
        transmission_rate: 0.0,
        reinfection_ratio: 0.0,
        fatality_rate: 0.3,
        duration: 4,
        ..Default::default()
    };
    let mut sim = Simulation::new(run_config(29, 200, 40, disease)).unwrap();

    let summary = sim.run(&mut ());
    assert_eq!(summary.outcome, Outcome::BurnedOut);
    assert_eq!(summary.steps, 4);
    assert_eq!(summary.peak_sick, 40);

    let mut previous = summary.initial_stats.sick;
    for record in &summary.history {
        assert!(record.stats.sick <= previous);
        assert_eq!(record.new_infections, 0);
        previous = record.stats.sick;
    }
    assert_eq!(summary.final_stats.sick, 0);
    assert_eq!(summary.final_stats.dead + summary.final_stats.recovered, 40);
}

#[test]
fn distant_agents_never_infect_each_other() {
    let disease = Disease {
        max_transmission_distance: 15.0,
        transmission_rate: 1.0,
        reinfection_ratio: 1.0,
        duration: 100,
        ..Default::default()
    };

    for seed in 0..200 {
        // 50 apart; one move closes the gap by at most 6 per axis.
        let mut sick = Agent::new(Position::new(10.0, 50.0));
        sick.infect(0);
        let agents = vec![sick, Agent::new(Position::new(60.0, 50.0))];
        let mut sim =
            Simulation::from_agents(run_config(seed, 2, 0, disease.clone()), agents).unwrap();

        let record = sim.step();
        assert_eq!(record.new_infections, 0);
        assert!(!sim.agents()[1].is_infected);
    }
}

#[test]
fn extinction_ends_the_run() {
    let disease = Disease {
        transmission_rate: 0.0,
        reinfection_ratio: 0.0,
        fatality_rate: 1.0,
        duration: 2,
        ..Default::default()
    };
    let mut sim = Simulation::new(run_config(31, 5, 5, disease)).unwrap();

    let summary = sim.run(&mut ());
    assert_eq!(summary.outcome, Outcome::Extinct);
    assert_eq!(summary.final_stats.dead, 5);
    assert!(sim.agents().iter().all(|a| a.status() == HealthStatus::Dead));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn population_invariants_hold_every_step(
        seed in any::<u64>(),
        size in 1usize..150,
        transmission_rate in 0.0f64..=1.0,
        fatality_rate in 0.0f64..=1.0,
        duration in 1u64..10,
        distance in 1.0f64..30.0,
    ) {
        let disease = Disease {
            max_transmission_distance: distance,
            transmission_rate,
            fatality_rate,
            duration,
            reinfection_ratio: transmission_rate / 2.0,
        };
        let mut sim = Simulation::new(run_config(seed, size, 1, disease)).unwrap();
        let bounds = sim.bounds();
        let mut previous_agents = sim.agents().to_vec();
        let mut previous_dead = 0;

        for _ in 0..30 {
            let record = sim.step();
            let stats = record.stats;

            prop_assert_eq!(stats.alive + stats.dead, size);
            prop_assert_eq!(stats.sick + stats.healthy + stats.recovered, stats.alive);
            prop_assert!(stats.dead >= previous_dead);

            for (before, after) in previous_agents.iter().zip(sim.agents()) {
                prop_assert!(!after.is_infected || after.infected_on.is_some());
                prop_assert!(bounds.contains(after.position));
                if !before.is_alive {
                    prop_assert_eq!(before, after);
                }
            }

            previous_dead = stats.dead;
            previous_agents = sim.agents().to_vec();
        }
    }
}
