use crate::engines::generation::genome::Genome;
use crate::error::Result;
use crate::functions::cdf::CumulativeDistribution;
use rand::Rng;

/// Roulette wheel selection: draws `count` indices with probability
/// proportional to their weight
pub fn roulette_selection<R: Rng>(
    cdf: &CumulativeDistribution,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..count).map(|_| cdf.index_of(rng.gen::<f64>())).collect()
}

/// Single-point crossover: swap the tails after a cut in `1..len`
pub fn crossover<R: Rng>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> (Genome, Genome) {
    let len = parent1.len().min(parent2.len());
    if len <= 1 {
        return (parent1.clone(), parent2.clone());
    }

    let point = rng.gen_range(1..len);
    crossover_at(parent1, parent2, point)
}

/// Swaps the bits from `point` on; a cut past the shorter parent swaps nothing.
pub fn crossover_at(parent1: &Genome, parent2: &Genome, point: usize) -> (Genome, Genome) {
    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();

    let len = child1.len().min(child2.len());
    let point = point.min(len);
    child1.bits_mut()[point..len].swap_with_slice(&mut child2.bits_mut()[point..len]);

    (child1, child2)
}

/// Mutation: flip every bit independently with `mutation_rate`
pub fn mutate<R: Rng>(genome: &mut Genome, mutation_rate: f64, rng: &mut R) {
    for bit in genome.bits_mut() {
        if rng.gen::<f64>() < mutation_rate {
            *bit = !*bit;
        }
    }
}

/// Uniformly random genome of `len` bits
pub fn random_genome<R: Rng>(len: u32, rng: &mut R) -> Result<Genome> {
    let max = crate::functions::encoding::max_int(len);
    Genome::from_int(rng.gen_range(0..=max), len)
}
