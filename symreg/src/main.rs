use oxigp::{
    Dataset, EphemeralConstant, EvolutionConfig, FitnessMetric, Population, PrimitiveSet,
};

use std::error::Error;
use std::num::NonZeroUsize;

// Classic quartic benchmark target, sampled on [-1, 1].
fn target(x: f64) -> f64 {
    x.powi(4) + x.powi(3) + x.powi(2) + x
}

fn arithmetic_set() -> Result<PrimitiveSet, Box<dyn Error>> {
    let mut pset = PrimitiveSet::new(["x"]);
    pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])?;
    pset.add_primitive("sub", 2, |args: &[f64]| args[0] - args[1])?;
    pset.add_primitive("mul", 2, |args: &[f64]| args[0] * args[1])?;
    pset.add_primitive("div", 2, |args: &[f64]| {
        // Protected division.
        if args[1].abs() < 1e-6 {
            1.0
        } else {
            args[0] / args[1]
        }
    })?;
    pset.add_primitive("neg", 1, |args: &[f64]| -args[0])?;
    pset.set_constants(EphemeralConstant {
        low: -1.0,
        high: 1.0,
        precision: 4,
    });
    Ok(pset)
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = EvolutionConfig {
        population_size: NonZeroUsize::new(300).unwrap(),
        generations: NonZeroUsize::new(40).unwrap(),
        crossover_chance: 0.9,
        mutation_chance: 0.1,
        max_height: NonZeroUsize::new(17).unwrap(),
        tournament_size: NonZeroUsize::new(3).unwrap(),
        metric: FitnessMetric::MeanSquaredError,
        initial_depth: (1, 2),
        mutation_depth: (0, 2),
        hall_of_fame_size: NonZeroUsize::new(5).unwrap(),
        seed: Some(42),
    };

    let data = Dataset::new(
        (-20..=20)
            .map(|i| {
                let x = i as f64 / 20.0;
                (vec![x], target(x))
            })
            .collect(),
    );

    let mut population = Population::new(config, arithmetic_set()?)?;
    population.run(&data)?;

    for log in population.logs() {
        println!("{}", log);
    }

    let champion = population
        .champion()
        .expect("the run completed, so the hall of fame is non-empty");
    println!(
        "champion: {} (fitness {:?})",
        champion.tree().formula(population.primitive_set()),
        champion.fitness(),
    );
    println!("serialized: {}", ron::to_string(champion)?);

    Ok(())
}
