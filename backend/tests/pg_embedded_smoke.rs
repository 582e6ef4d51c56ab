//! Optional embedded Postgres smoke test gated by RUN_PG_EMBEDDED.
//! Use `cargo test -- --ignored` with `RUN_PG_EMBEDDED=1` to run it.

use hello_assistant::domain::GreetingMessage;
use hello_assistant::domain::ports::{GreetingRepository, GreetingRepositoryErrorKind};
use hello_assistant::outbound::persistence::{
    Datastore, DatabaseSettings, DatabaseTarget, DieselGreetingRepository,
};

/// Optional smoke test; enable with `RUN_PG_EMBEDDED=1`.
#[tokio::test]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
async fn embedded_datastore_seeds_and_reads_a_greeting() {
    if std::env::var("RUN_PG_EMBEDDED").as_deref() != Ok("1") {
        eprintln!("SKIP-EMBEDDED-PG: set RUN_PG_EMBEDDED=1 to run");
        return;
    }

    let data_dir = tempfile::tempdir().expect("temporary data directory");
    let settings = DatabaseSettings {
        target: DatabaseTarget::Embedded {
            data_path: data_dir.path().to_path_buf(),
        },
        max_connections: 2,
        ssl: false,
    };
    let datastore = Datastore::connect(&settings)
        .await
        .expect("embedded datastore should start");
    let repository = DieselGreetingRepository::new(datastore.pool().clone());

    let empty = repository.get_latest().await.expect_err("fresh table is empty");
    assert_eq!(empty.kind(), GreetingRepositoryErrorKind::NotFound);

    let message = GreetingMessage::new("Hello from Rust + PostgreSQL!").expect("valid message");
    assert!(repository.insert_if_empty(&message).await.expect("first seed"));
    assert!(!repository.insert_if_empty(&message).await.expect("second seed"));

    let greeting = repository.get_latest().await.expect("seeded greeting");
    assert_eq!(greeting.message(), &message);

    datastore.shutdown().await.expect("embedded datastore should stop");
}
