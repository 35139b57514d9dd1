//! End-to-end runs of the actor loop against a scratch store.
//!
//! A [`CannedGenerator`] stands in for the language model so every test is
//! offline and deterministic given its RNG seed.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use kommunity_core::{
    Action, ActionPolicy, CannedGenerator, LoopError, LoopSettings, PromptEngine,
    SimulationLoop, StepOutcome,
};
use kommunity_store::{RecordStore, seed_if_empty};
use kommunity_types::{Actor, SEED_AUTHOR};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn actors() -> Vec<Actor> {
    [("agent_1", "Ada"), ("agent_2", "Linus")]
        .iter()
        .map(|(id, name)| Actor {
            id: (*id).to_owned(),
            name: (*name).to_owned(),
            style: "an opinionated engineer".to_owned(),
            courage: 0.6,
            empathy: 0.5,
            elegance: 0.4,
        })
        .collect()
}

fn seeded_store(dir: &Path) -> Arc<RecordStore> {
    let seed = dir.join("config.json");
    std::fs::write(
        &seed,
        serde_json::json!({
            "domain": "software engineering",
            "tags": ["rust"],
            "seed_topics": [
                {"title": "Ownership", "body": "Worth the friction?"},
                {"title": "Testing", "body": "Unit or integration first?"}
            ]
        })
        .to_string(),
    )
    .unwrap();
    let store = Arc::new(RecordStore::new(dir.join("community")));
    assert_eq!(seed_if_empty(&store, &seed).unwrap(), 2);
    store
}

fn build_loop(
    store: Arc<RecordStore>,
    policy: ActionPolicy,
    generator: CannedGenerator,
    seed: u64,
) -> SimulationLoop<CannedGenerator, SmallRng> {
    let settings = LoopSettings {
        recent_limit: 5,
        interval: Duration::from_millis(5),
        jitter: Duration::ZERO,
    };
    SimulationLoop::new(
        store,
        actors(),
        policy,
        PromptEngine::new().unwrap(),
        generator,
        SmallRng::seed_from_u64(seed),
        settings,
    )
    .unwrap()
}

#[tokio::test]
async fn seeded_store_grows_by_originate_and_respond() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());

    let seeded = store.list_all().unwrap();
    assert_eq!(seeded.len(), 2);
    assert!(seeded.iter().all(|t| t.author == SEED_AUTHOR && t.replies.is_empty()));

    let sim = build_loop(
        Arc::clone(&store),
        ActionPolicy::default(),
        CannedGenerator::new(["What makes a good API?\nDiscuss.", "Great point."]),
        1,
    );
    let actor = &actors()[0];

    let outcome = sim.execute(actor, Action::Originate).await.unwrap();
    let title = match outcome {
        StepOutcome::Originated { title, .. } => title,
        StepOutcome::Replied { .. } => String::new(),
    };
    assert_eq!(title, "What makes a good API?");
    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 3);
    let created = all.iter().find(|t| t.title == title).unwrap();
    assert_eq!(created.author, "agent_1");
    assert_eq!(created.body, "What makes a good API?\nDiscuss.");

    let target = store
        .list_all()
        .unwrap()
        .into_iter()
        .find(|t| t.title == "Ownership")
        .unwrap();
    let outcome = sim.execute(actor, Action::RespondTo(&target)).await.unwrap();
    assert!(matches!(outcome, StepOutcome::Replied { reply_count: 1, .. }));

    let after = store.list_all().unwrap();
    assert_eq!(after.len(), 3);
    for topic in &after {
        if topic.title == "Ownership" {
            assert_eq!(topic.replies.len(), 1);
            assert_eq!(topic.replies[0].author, "agent_1");
            assert_eq!(topic.replies[0].content, "Great point.");
        } else {
            assert!(topic.replies.is_empty());
        }
    }

    let prompt = sim.generator().last_prompt().unwrap();
    assert!(prompt.contains("Original Topic: Ownership\n\nWorth the friction?"));
}

#[tokio::test]
async fn respond_only_policy_never_adds_topics() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());
    let mut sim = build_loop(
        Arc::clone(&store),
        ActionPolicy::new(0.0).unwrap(),
        CannedGenerator::new(["Agreed."]),
        7,
    );

    let outcomes = sim.run_iterations(6).await;
    assert_eq!(outcomes.len(), 6);

    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 2);
    let total: usize = all.iter().map(|t| t.replies.len()).sum();
    assert_eq!(total, 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn loop_shares_a_single_worker_with_other_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());
    let mut sim = build_loop(
        Arc::clone(&store),
        ActionPolicy::new(0.5).unwrap(),
        CannedGenerator::new(["Fair point.", "New idea"]),
        11,
    );

    let actor = tokio::spawn(async move { sim.run_iterations(4).await });
    let reader_store = Arc::clone(&store);
    let reader = tokio::spawn(async move {
        let mut seen = 0;
        for _ in 0..4 {
            let store = Arc::clone(&reader_store);
            seen = tokio::task::spawn_blocking(move || store.list_all().unwrap().len())
                .await
                .unwrap();
            tokio::task::yield_now().await;
        }
        seen
    });

    let outcomes = actor.await.unwrap();
    assert_eq!(outcomes.len(), 4);
    assert!(reader.await.unwrap() >= 2);
    assert!(store.list_all().unwrap().len() >= 2);
}

#[tokio::test]
async fn empty_store_always_originates() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordStore::new(dir.path().join("community")));
    let mut sim = build_loop(
        Arc::clone(&store),
        ActionPolicy::new(0.0).unwrap(),
        CannedGenerator::new(["First!"]),
        3,
    );

    let outcome = sim.step().await.unwrap();
    assert!(matches!(outcome, StepOutcome::Originated { .. }));
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn generator_failure_leaves_store_untouched_and_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());
    let before = store.list_all().unwrap();

    let mut sim = build_loop(
        Arc::clone(&store),
        ActionPolicy::default(),
        CannedGenerator::failing(),
        11,
    );

    assert!(matches!(sim.step().await, Err(LoopError::Generator(_))));
    let outcomes = sim.run_iterations(3).await;
    assert!(outcomes.is_empty());
    assert_eq!(sim.generator().prompts().len(), 4);
    assert_eq!(store.list_all().unwrap(), before);
}

#[tokio::test]
async fn blank_generation_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());
    let sim = build_loop(
        Arc::clone(&store),
        ActionPolicy::default(),
        CannedGenerator::new(["   \n  "]),
        5,
    );

    let result = sim.execute(&actors()[1], Action::Originate).await;
    assert!(matches!(result, Err(LoopError::EmptyGeneration)));
    assert_eq!(store.list_all().unwrap().len(), 2);
}

#[test]
fn empty_roster_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let result = SimulationLoop::new(
        Arc::new(RecordStore::new(dir.path())),
        Vec::new(),
        ActionPolicy::default(),
        PromptEngine::new().unwrap(),
        CannedGenerator::new(["x"]),
        SmallRng::seed_from_u64(0),
        LoopSettings::default(),
    );
    assert!(matches!(result, Err(LoopError::EmptyRoster)));
}

#[tokio::test(start_paused = true)]
async fn jitter_stays_within_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = SimulationLoop::new(
        Arc::new(RecordStore::new(dir.path())),
        actors(),
        ActionPolicy::default(),
        PromptEngine::new().unwrap(),
        CannedGenerator::new(["x"]),
        SmallRng::seed_from_u64(9),
        LoopSettings {
            recent_limit: 5,
            interval: Duration::from_millis(100),
            jitter: Duration::from_millis(40),
        },
    )
    .unwrap();

    for _ in 0..50 {
        let delay = sim.next_delay();
        assert!(delay >= Duration::from_millis(100));
        assert!(delay <= Duration::from_millis(140));
    }
}
