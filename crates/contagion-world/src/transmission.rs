//! Infection of healthy agents by nearby infected ones.

use crate::agent::Agent;
use crate::spatial::CellContacts;
use contagion_core::Disease;
use rand::Rng;
use tracing::trace;

/// Run one transmission pass over resolved cells and return the number of new
/// infections.
///
/// Each healthy agent gets one Bernoulli trial per infected contact within
/// transmission distance, in pool order, and stops at the first success.
/// Contact pools are fixed before the pass starts, so agents infected here do
/// not spread the disease until the next step.
pub fn transmit<R: Rng>(
    agents: &mut [Agent],
    cells: &[CellContacts],
    disease: &Disease,
    step: u64,
    rng: &mut R,
) -> usize {
    let mut new_infections = 0;

    for cell in cells {
        for &healthy_idx in &cell.healthy {
            if try_infect(agents, healthy_idx, &cell.contacts, disease, step, rng) {
                new_infections += 1;
                trace!(
                    event = "infection",
                    agent = healthy_idx,
                    cell = %cell.cell,
                    step = step,
                    "Agent infected"
                );
            }
        }
    }

    new_infections
}

fn try_infect<R: Rng>(
    agents: &mut [Agent],
    healthy_idx: usize,
    contacts: &[usize],
    disease: &Disease,
    step: u64,
    rng: &mut R,
) -> bool {
    let probability = if agents[healthy_idx].infected_on.is_some() {
        disease.reinfection_ratio
    } else {
        disease.transmission_rate
    };

    for &sick_idx in contacts {
        if agents[healthy_idx].distance(&agents[sick_idx]) > disease.max_transmission_distance {
            continue;
        }
        if rng.gen::<f64>() < probability {
            agents[healthy_idx].infect(step);
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::SpatialIndex;
    use contagion_core::Position;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn disease(rate: f64, reinfection: f64) -> Disease {
        Disease {
            max_transmission_distance: 10.0,
            transmission_rate: rate,
            fatality_rate: 0.0,
            duration: 100,
            reinfection_ratio: reinfection,
        }
    }

    fn pass(agents: &mut [Agent], disease: &Disease, rng: &mut ChaCha8Rng) -> usize {
        let cells = SpatialIndex::build(disease.max_transmission_distance, agents).resolve();
        transmit(agents, &cells, disease, 1, rng)
    }

    #[test]
    fn test_certain_transmission() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sick = Agent::new(Position::new(20.0, 20.0));
        sick.infect(0);
        let mut agents = vec![sick, Agent::new(Position::new(20.0, 20.0))];

        assert_eq!(pass(&mut agents, &disease(1.0, 0.0), &mut rng), 1);
        assert!(agents[1].is_infected);
        assert_eq!(agents[1].infected_on, Some(1));
    }

    #[test]
    fn test_zero_rate_never_transmits() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut sick = Agent::new(Position::new(20.0, 20.0));
        sick.infect(0);
        let mut agents = vec![sick, Agent::new(Position::new(21.0, 20.0))];

        for _ in 0..100 {
            assert_eq!(pass(&mut agents, &disease(0.0, 0.0), &mut rng), 0);
        }
    }

    #[test]
    fn test_out_of_range_neighbors_never_transmit() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Cells (3, 3) and (4, 4) are neighbors, but the agents are ~15.6 apart.
        let mut sick = Agent::new(Position::new(21.0, 21.0));
        sick.infect(0);
        let mut agents = vec![sick, Agent::new(Position::new(32.0, 32.0))];
        assert!(agents[0].distance(&agents[1]) > 10.0);

        for _ in 0..1000 {
            assert_eq!(pass(&mut agents, &disease(1.0, 1.0), &mut rng), 0);
        }
        assert!(!agents[1].is_infected);
    }

    #[test]
    fn test_recovered_agents_use_reinfection_ratio() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut sick = Agent::new(Position::new(20.0, 20.0));
        sick.infect(0);
        let mut recovered = Agent::new(Position::new(20.0, 20.0));
        recovered.infect(0);
        recovered.recover();
        let mut agents = vec![sick, recovered, Agent::new(Position::new(20.0, 20.0))];

        assert_eq!(pass(&mut agents, &disease(1.0, 0.0), &mut rng), 1);
        assert!(!agents[1].is_infected);
        assert!(agents[2].is_infected);

        agents[2].recover();
        assert_eq!(pass(&mut agents, &disease(0.0, 1.0), &mut rng), 2);
        assert!(agents[1].is_infected);
        assert!(agents[2].is_infected);
    }

    #[test]
    fn test_new_infections_do_not_spread_in_same_pass() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        // Chain: sick -- a -- b, each link 8 apart, sick and b 16 apart.
        let mut sick = Agent::new(Position::new(41.0, 41.0));
        sick.infect(0);
        let mut agents = vec![
            sick,
            Agent::new(Position::new(49.0, 41.0)),
            Agent::new(Position::new(57.0, 41.0)),
        ];

        assert_eq!(pass(&mut agents, &disease(1.0, 1.0), &mut rng), 1);
        assert!(agents[1].is_infected);
        assert!(!agents[2].is_infected);
    }

    #[test]
    fn test_dead_agents_neither_spread_nor_catch() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut sick = Agent::new(Position::new(20.0, 20.0));
        sick.infect(0);
        sick.die();
        let mut corpse = Agent::new(Position::new(20.0, 20.0));
        corpse.die();
        let mut agents = vec![sick, corpse, Agent::new(Position::new(20.0, 20.0))];

        assert_eq!(pass(&mut agents, &disease(1.0, 1.0), &mut rng), 0);
        assert!(!agents[1].is_infected);
        assert!(!agents[2].is_infected);
    }
}
