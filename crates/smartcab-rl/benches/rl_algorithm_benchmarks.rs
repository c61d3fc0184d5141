//! RL Algorithm Benchmarks
//!
//! Benchmarks for the per-step hot path of the learning agent:
//! - State encoding
//! - Greedy action selection over the value table
//! - Temporal-difference update
//! - Full agent step against an in-memory environment
//!
//! ## Performance Targets
//! - Encoding: < 50ns per state
//! - Selection: < 100ns per decision
//! - Full step: < 1µs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use smartcab_core::{Action, Environment, Heading, Light, Result, Sensed};
use smartcab_rl::{encode, LearningAgent, LearningParams, QLearner, StateKey, Transition, ValueTable};

/// Environment cycling through every sensed combination
struct Cycle {
    readings: Vec<Sensed>,
    cursor: usize,
}

impl Cycle {
    fn new() -> Self {
        let readings = StateKey::all()
            .filter(|key| key.waypoint == Heading::Forward)
            .map(|key| key.sensed())
            .collect();
        Self {
            readings,
            cursor: 0,
        }
    }
}

impl Environment for Cycle {
    fn valid_actions(&self) -> &[Action] {
        &Heading::ALL
    }

    fn deadline(&self) -> i32 {
        30
    }

    fn sense(&self) -> Sensed {
        self.readings[self.cursor % self.readings.len()]
    }

    fn act(&mut self, action: Action) -> Result<f64> {
        self.cursor += 1;
        Ok(if action == Heading::Forward { 2.0 } else { -0.5 })
    }
}

// ============================================================================
// State Benchmarks
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let sensed = Sensed::new(Light::Green, Heading::Left, Heading::None, Heading::Right);

    c.bench_function("state/encode", |b| {
        b.iter(|| encode(black_box(Heading::Forward), black_box(&sensed)).index())
    });
}

fn bench_from_index(c: &mut Criterion) {
    c.bench_function("state/from_index", |b| {
        b.iter(|| StateKey::from_index(black_box(317)))
    });
}

// ============================================================================
// Value Table Benchmarks
// ============================================================================

fn bench_table_init(c: &mut Criterion) {
    c.bench_function("table/init", |b| b.iter(|| ValueTable::new(black_box(3.5))));
}

fn bench_best_action(c: &mut Criterion) {
    let table = ValueTable::new(3.5);
    let states: Vec<StateKey> = StateKey::all().collect();

    let mut group = c.benchmark_group("table/best_action");
    for index in [0usize, 255, 511] {
        group.bench_with_input(BenchmarkId::from_parameter(index), &states[index], |b, state| {
            b.iter(|| table.best_action(black_box(state)))
        });
    }
    group.finish();
}

// ============================================================================
// Learner Benchmarks
// ============================================================================

fn bench_update(c: &mut Criterion) {
    let mut learner = QLearner::new(LearningParams::default()).unwrap();
    let state = encode(Heading::Forward, &Sensed::clear(Light::Green));
    let next = encode(Heading::Left, &Sensed::clear(Light::Red));
    let transition = Transition::new(state, Heading::Forward, 2.0);

    c.bench_function("learner/update", |b| {
        b.iter(|| learner.update(black_box(&transition), black_box(&next)))
    });
}

// ============================================================================
// Agent Benchmarks
// ============================================================================

fn bench_agent_step(c: &mut Criterion) {
    let mut agent = LearningAgent::new(LearningParams::default()).unwrap();
    let mut env = Cycle::new();

    c.bench_function("agent/step", |b| {
        b.iter(|| agent.step(&mut env, &Heading::Forward))
    });
}

criterion_group!(
    name = state_benchmarks;
    config = Criterion::default();
    targets =
        bench_encode,
        bench_from_index,
);

criterion_group!(
    name = table_benchmarks;
    config = Criterion::default();
    targets =
        bench_table_init,
        bench_best_action,
);

criterion_group!(
    name = learning_benchmarks;
    config = Criterion::default();
    targets =
        bench_update,
        bench_agent_step,
);

criterion_main!(state_benchmarks, table_benchmarks, learning_benchmarks);
