//! Particle swarm optimisation over random keys.
//!
//! A particle holds `2n` keys: the first `n` decode to a placement order by
//! argsort, the last `n` to orientation genes by bucketing. One particle is
//! encoded from the heuristic sequence so the swarm starts at the heuristic.

use crate::placement_pass::Decoder;
use rand::Rng;
use rayon::prelude::*;
use truckpack_core::{
    PackOptions, PackingResult, PackingSequence, PackingStrategy, Problem, RandomKeys, Result,
    StopReason, ORIENTATION_GENES,
};

/// Largest per-step change of a single key.
const MAX_VELOCITY: f64 = 0.25;

/// Encodes a sequence as keys that decode back to the same sequence.
pub fn encode(sequence: &PackingSequence) -> RandomKeys {
    let n = sequence.len();
    let mut keys = vec![0.0; 2 * n];
    for (rank, &instance) in sequence.order.iter().enumerate() {
        keys[instance] = (rank as f64 + 0.5) / n as f64;
    }
    for (instance, &gene) in sequence.orientations.iter().enumerate() {
        keys[n + instance] = ((gene % ORIENTATION_GENES) as f64 + 0.5) / ORIENTATION_GENES as f64;
    }
    RandomKeys { keys }
}

/// Decodes `2n` keys into a sequence.
pub fn decode(keys: &RandomKeys) -> PackingSequence {
    let n = keys.len() / 2;
    let order = keys.decode_as_permutation(0..n);
    let orientations = (0..n)
        .map(|i| keys.decode_as_discrete(n + i, ORIENTATION_GENES))
        .collect();
    PackingSequence::new(order, orientations)
}

#[derive(Debug, Clone)]
struct Particle {
    position: RandomKeys,
    velocity: Vec<f64>,
    score: f64,
    best: RandomKeys,
    best_score: f64,
}

impl Particle {
    fn new(position: RandomKeys) -> Self {
        let len = position.len();
        Self {
            best: position.clone(),
            position,
            velocity: vec![0.0; len],
            score: f64::NEG_INFINITY,
            best_score: f64::NEG_INFINITY,
        }
    }

    fn evaluate(&mut self, decoder: &Decoder<'_>) {
        self.score = decoder.evaluate(&decode(&self.position));
        if self.score > self.best_score {
            self.best_score = self.score;
            self.best = self.position.clone();
        }
    }

    fn step<R: Rng>(&mut self, global: &RandomKeys, inertia: f64, cognitive: f64, social: f64, rng: &mut R) {
        for i in 0..self.position.len() {
            let x = self.position.keys[i];
            let r1: f64 = rng.gen();
            let r2: f64 = rng.gen();
            let v = inertia * self.velocity[i]
                + cognitive * r1 * (self.best.keys[i] - x)
                + social * r2 * (global.keys[i] - x);
            self.velocity[i] = v.clamp(-MAX_VELOCITY, MAX_VELOCITY);
            self.position.keys[i] = x + self.velocity[i];
        }
        self.position.clamp();
    }
}

/// Particle swarm strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsoPacker;

impl PsoPacker {
    /// Creates a new packer.
    pub fn new() -> Self {
        Self
    }
}

impl PackingStrategy for PsoPacker {
    fn pack(&self, problem: &Problem, options: &PackOptions) -> Result<PackingResult> {
        let budget = options.start_budget();
        let params = &options.params;
        let n = problem.instance_count();
        log::info!(
            "particle-swarm: packing {} instances, swarm {}",
            n,
            params.swarm_size
        );

        let decoder = Decoder::new(problem, params.decoder, options.weights);
        let mut rng = options.rng();

        let mut swarm = vec![Particle::new(encode(&Decoder::heuristic_seed(problem)))];
        while swarm.len() < params.swarm_size.max(1) {
            swarm.push(Particle::new(RandomKeys::random(2 * n, &mut rng)));
        }
        swarm.par_iter_mut().for_each(|p| p.evaluate(&decoder));

        let mut global = swarm[0].best.clone();
        let mut global_score = swarm[0].best_score;
        let mut history = Vec::new();
        let mut iteration = 0u32;
        let mut stop_reason = StopReason::Completed;

        while iteration < params.generations && n > 0 {
            for particle in &swarm {
                if particle.best_score > global_score {
                    global_score = particle.best_score;
                    global = particle.best.clone();
                }
            }
            history.push(global_score);

            if budget.exhausted() {
                stop_reason = StopReason::TimeBudget;
                break;
            }

            for particle in &mut swarm {
                particle.step(&global, params.inertia, params.cognitive, params.social, &mut rng);
            }
            swarm.par_iter_mut().for_each(|p| p.evaluate(&decoder));

            iteration += 1;
            log::debug!("PSO iteration {}: best={:.4}", iteration, global_score);
        }
        for particle in &swarm {
            if particle.best_score > global_score {
                global_score = particle.best_score;
                global = particle.best.clone();
            }
        }
        history.push(global_score);

        let result = decoder
            .result("particle-swarm", decoder.decode(&decode(&global)))
            .with_stop_reason(stop_reason)
            .with_iterations(u64::from(iteration))
            .with_history(history)
            .with_elapsed_ms(budget.elapsed_ms());

        log::info!(
            "particle-swarm: placed {}/{} after {} iterations ({:?})",
            result.placed_count(),
            n,
            result.iterations,
            result.stop_reason
        );
        Ok(result)
    }
}
