//! Executor throughput over agent-shaped graphs.
//!
//! Run with: cargo bench
//! Run one group: cargo bench execution

use std::hint::black_box;

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};
use tutor_agents::{
    Decision, Executor, Graph, GraphState, Node, NodeError, RetryEdge, RouteCode, RouteTable,
    Selector, StateUpdate, END,
};

#[derive(Debug, Clone, Default)]
struct CounterState {
    hits: u64,
    rounds: u32,
}

#[derive(Debug, Clone, Default)]
struct CounterUpdate {
    hits: Option<u64>,
    rounds: Option<u32>,
}

impl StateUpdate for CounterUpdate {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.hits.is_none() && self.rounds.is_none()
    }

    fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.hits.is_some() {
            fields.push("hits");
        }
        if self.rounds.is_some() {
            fields.push("rounds");
        }
        fields
    }
}

impl GraphState for CounterState {
    type Update = CounterUpdate;

    fn apply_update(&self, update: CounterUpdate) -> Self {
        let mut next = self.clone();
        if let Some(hits) = update.hits {
            next.hits = hits;
        }
        if let Some(rounds) = update.rounds {
            next.rounds = rounds;
        }
        next
    }

    fn merge_updates(updates: Vec<CounterUpdate>) -> CounterUpdate {
        let mut merged = CounterUpdate::empty();
        for update in updates {
            if update.hits.is_some() {
                merged.hits = update.hits;
            }
            if update.rounds.is_some() {
                merged.rounds = update.rounds;
            }
        }
        merged
    }
}

/// Bumps the hit counter by one.
#[derive(Clone, Copy)]
struct Tally;

#[async_trait]
impl Node<CounterState> for Tally {
    async fn run(&self, state: &CounterState) -> Result<CounterUpdate, NodeError> {
        Ok(CounterUpdate {
            hits: Some(state.hits + 1),
            rounds: None,
        })
    }

    fn writes(&self) -> &'static [&'static str] {
        &["hits"]
    }
}

/// Bumps the round counter by one.
#[derive(Clone, Copy)]
struct Spin;

#[async_trait]
impl Node<CounterState> for Spin {
    async fn run(&self, state: &CounterState) -> Result<CounterUpdate, NodeError> {
        Ok(CounterUpdate {
            hits: None,
            rounds: Some(state.rounds + 1),
        })
    }

    fn writes(&self) -> &'static [&'static str] {
        &["rounds"]
    }
}

fn linear_graph(len: usize) -> Graph<CounterState> {
    let mut builder = Graph::builder("linear");
    for i in 0..len {
        builder = builder.node(format!("step{i}"), Tally);
    }
    builder = builder.entry("step0");
    for i in 0..len - 1 {
        builder = builder.edge(format!("step{i}"), format!("step{}", i + 1));
    }
    builder
        .edge(format!("step{}", len - 1), END)
        .build()
        .expect("linear graph builds")
}

/// A bounded loop shaped like the sample-redraw cycle: spin until the
/// round counter reaches `rounds`, then finish.
fn retry_graph(rounds: u32) -> Graph<CounterState> {
    Graph::builder("retry")
        .node("spin", Spin)
        .node("finish", Tally)
        .entry("spin")
        .branch(
            "spin",
            Decision::new([true, false], move |s: &CounterState| {
                RouteCode::Flag(s.rounds < rounds)
            }),
            RouteTable::new()
                .on(true, RetryEdge::new("spin", "finish").with_limit(rounds + 2))
                .on(false, "finish"),
        )
        .edge("finish", END)
        .build()
        .expect("retry graph builds")
}

/// A two-branch fan-out with a join, shaped like the hint pipeline.
fn fan_out_graph() -> Graph<CounterState> {
    Graph::builder("fan_out")
        .node("split", Tally)
        .node("left", Tally)
        .node("right", Spin)
        .node("gather", Tally)
        .entry("split")
        .fan_out(
            "split",
            Selector::new(|_: &CounterState| vec!["left".to_string(), "right".to_string()]),
            ["left", "right"],
            "gather",
        )
        .edge("gather", END)
        .build()
        .expect("fan-out graph builds")
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    group.bench_function("linear_8_nodes", |b| {
        b.iter(|| black_box(linear_graph(8)));
    });

    group.bench_function("branch_with_retry", |b| {
        b.iter(|| black_box(retry_graph(4)));
    });

    group.bench_function("fan_out_2_workers", |b| {
        b.iter(|| black_box(fan_out_graph()));
    });

    group.finish();
}

fn bench_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("execution");
    let rt = tokio::runtime::Runtime::new().expect("runtime");

    group.bench_function("linear_8_nodes", |b| {
        let executor = Executor::new(linear_graph(8));
        b.to_async(&rt).iter(|| async {
            executor
                .run(CounterState::default())
                .await
                .expect("run succeeds")
        });
    });

    group.bench_function("retry_loop_4_rounds", |b| {
        let executor = Executor::new(retry_graph(4));
        b.to_async(&rt).iter(|| async {
            executor
                .run(CounterState::default())
                .await
                .expect("run succeeds")
        });
    });

    group.bench_function("fan_out_2_workers", |b| {
        let executor = Executor::new(fan_out_graph());
        b.to_async(&rt).iter(|| async {
            executor
                .run(CounterState::default())
                .await
                .expect("run succeeds")
        });
    });

    group.finish();
}

fn bench_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("state");

    let state = CounterState { hits: 3, rounds: 1 };
    let update = CounterUpdate {
        hits: Some(4),
        rounds: None,
    };

    group.bench_function("apply_update", |b| {
        b.iter(|| black_box(state.apply_update(update.clone())));
    });

    group.bench_function("merge_two_updates", |b| {
        let left = CounterUpdate {
            hits: Some(9),
            rounds: None,
        };
        let right = CounterUpdate {
            hits: None,
            rounds: Some(2),
        };
        b.iter(|| black_box(CounterState::merge_updates(vec![left.clone(), right.clone()])));
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_execution, bench_state);
criterion_main!(benches);
