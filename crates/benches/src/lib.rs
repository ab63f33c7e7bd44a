use rand::rngs::SmallRng;
use rand::SeedableRng;
use transflow_core::instance::{GeneratorOptions, Instance};

/// Balanced `size x size` instance drawn from a fixed seed.
pub fn square_instance(size: usize, seed: u64) -> Instance {
    let mut rng = SmallRng::seed_from_u64(seed);
    let options = GeneratorOptions {
        coord_max: 100,
        quantity_max: 50,
    };
    Instance::random(size, size, &options, &mut rng)
        .unwrap_or_else(|err| panic!("benchmark instance {size}x{size}: {err}"))
}
