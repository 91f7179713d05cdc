//! Transactional properties of the registration coordinator, run against a
//! per-test database provisioned by `#[sqlx::test]` (migrations applied
//! automatically).

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use voluntaria_server::registration::{RegistrationCoordinator, RegistrationError};

async fn seed_user(pool: &PgPool, role: &str) -> Uuid {
    let tag = Uuid::new_v4().simple().to_string();
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, full_name, role)
         VALUES ($1, $2, 'x', 'Test User', $3)
         RETURNING id",
    )
    .bind(format!("user-{tag}"))
    .bind(format!("{tag}@example.com"))
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("seed user")
}

async fn seed_event(pool: &PgPool, organizer_id: Uuid, volunteer_limit: Option<i32>) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO events (organizer_id, title, description, event_date, location, volunteer_limit)
         VALUES ($1, 'Beach cleanup', 'Bring gloves', $2, 'Valencia', $3)
         RETURNING id",
    )
    .bind(organizer_id)
    .bind(Utc::now() + Duration::days(7))
    .bind(volunteer_limit)
    .fetch_one(pool)
    .await
    .expect("seed event")
}

async fn counter(pool: &PgPool, event_id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT registered_volunteers FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .expect("read counter")
}

async fn ledger_count(pool: &PgPool, event_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .expect("count registrations")
}

#[sqlx::test]
async fn register_unregister_register_round_trip(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let volunteer = seed_user(&pool, "volunteer").await;
    let event = seed_event(&pool, org, Some(10)).await;

    coordinator
        .register(volunteer, event, Utc::now())
        .await
        .expect("first register");
    assert_eq!(counter(&pool, event).await, 1);

    coordinator
        .unregister(volunteer, event)
        .await
        .expect("unregister");
    assert_eq!(counter(&pool, event).await, 0);

    coordinator
        .register(volunteer, event, Utc::now())
        .await
        .expect("second register");
    assert_eq!(counter(&pool, event).await, 1);
    assert_eq!(ledger_count(&pool, event).await, 1);
}

#[sqlx::test]
async fn duplicate_register_is_rejected_and_counter_untouched(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let volunteer = seed_user(&pool, "volunteer").await;
    let event = seed_event(&pool, org, None).await;

    coordinator
        .register(volunteer, event, Utc::now())
        .await
        .expect("register");

    let err = coordinator
        .register(volunteer, event, Utc::now())
        .await
        .expect_err("duplicate register must fail");
    assert!(matches!(err, RegistrationError::AlreadyRegistered));

    assert_eq!(counter(&pool, event).await, 1);
    assert_eq!(ledger_count(&pool, event).await, 1);
}

#[sqlx::test]
async fn unregister_without_registration_fails_and_counter_untouched(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let volunteer = seed_user(&pool, "volunteer").await;
    let event = seed_event(&pool, org, Some(5)).await;

    let err = coordinator
        .unregister(volunteer, event)
        .await
        .expect_err("unregister of a missing pair must fail");
    assert!(matches!(err, RegistrationError::RegistrationNotFound));

    assert_eq!(counter(&pool, event).await, 0);
}

#[sqlx::test]
async fn register_for_unknown_event_fails(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let volunteer = seed_user(&pool, "volunteer").await;

    let err = coordinator
        .register(volunteer, Uuid::new_v4(), Utc::now())
        .await
        .expect_err("unknown event must fail");
    assert!(matches!(err, RegistrationError::EventNotFound));
}

#[sqlx::test]
async fn zero_limit_event_admits_nobody(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let volunteer = seed_user(&pool, "volunteer").await;
    let event = seed_event(&pool, org, Some(0)).await;

    let err = coordinator
        .register(volunteer, event, Utc::now())
        .await
        .expect_err("zero-limit event must reject");
    assert!(matches!(err, RegistrationError::CapacityExceeded));
    assert_eq!(ledger_count(&pool, event).await, 0);
}

#[sqlx::test]
async fn null_limit_means_unlimited(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let event = seed_event(&pool, org, None).await;

    for _ in 0..5 {
        let volunteer = seed_user(&pool, "volunteer").await;
        coordinator
            .register(volunteer, event, Utc::now())
            .await
            .expect("unlimited event admits everyone");
    }

    assert_eq!(counter(&pool, event).await, 5);
    assert_eq!(ledger_count(&pool, event).await, 5);
}

#[sqlx::test]
async fn worked_example_limit_two(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let v1 = seed_user(&pool, "volunteer").await;
    let v2 = seed_user(&pool, "volunteer").await;
    let v3 = seed_user(&pool, "volunteer").await;
    let event = seed_event(&pool, org, Some(2)).await;

    coordinator.register(v1, event, Utc::now()).await.expect("v1");
    assert_eq!(counter(&pool, event).await, 1);

    coordinator.register(v2, event, Utc::now()).await.expect("v2");
    assert_eq!(counter(&pool, event).await, 2);

    let err = coordinator
        .register(v3, event, Utc::now())
        .await
        .expect_err("event is full");
    assert!(matches!(err, RegistrationError::CapacityExceeded));
    assert_eq!(counter(&pool, event).await, 2);

    coordinator.unregister(v1, event).await.expect("v1 leaves");
    assert_eq!(counter(&pool, event).await, 1);

    coordinator.register(v3, event, Utc::now()).await.expect("v3 takes the slot");
    assert_eq!(counter(&pool, event).await, 2);
    assert_eq!(ledger_count(&pool, event).await, 2);
}

#[sqlx::test]
async fn counter_matches_ledger_after_serial_churn(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let event = seed_event(&pool, org, Some(50)).await;

    let mut volunteers = Vec::new();
    for _ in 0..6 {
        volunteers.push(seed_user(&pool, "volunteer").await);
    }

    for &v in &volunteers {
        coordinator.register(v, event, Utc::now()).await.expect("register");
    }
    for &v in &volunteers[..3] {
        coordinator.unregister(v, event).await.expect("unregister");
    }
    for &v in &volunteers[..2] {
        coordinator.register(v, event, Utc::now()).await.expect("re-register");
    }

    let current = counter(&pool, event).await;
    assert_eq!(current, 5);
    assert_eq!(i64::from(current), ledger_count(&pool, event).await);
}

#[sqlx::test]
async fn concurrent_registrations_never_exceed_the_limit(pool: PgPool) {
    const LIMIT: i32 = 2;
    const RACERS: usize = 5;

    let org = seed_user(&pool, "organization").await;
    let event = seed_event(&pool, org, Some(LIMIT)).await;

    let mut volunteers = Vec::new();
    for _ in 0..RACERS {
        volunteers.push(seed_user(&pool, "volunteer").await);
    }

    let attempts = volunteers.into_iter().map(|v| {
        let coordinator = RegistrationCoordinator::new(pool.clone());
        tokio::spawn(async move { coordinator.register(v, event, Utc::now()).await })
    });
    let outcomes = futures::future::join_all(attempts).await;

    let mut successes: i32 = 0;
    for outcome in outcomes {
        match outcome.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(RegistrationError::CapacityExceeded) => {}
            Err(other) => panic!("unexpected error under contention: {other:?}"),
        }
    }

    assert_eq!(successes, LIMIT);
    assert_eq!(counter(&pool, event).await, LIMIT);
    assert_eq!(ledger_count(&pool, event).await, i64::from(LIMIT));
}

#[sqlx::test]
async fn deleting_an_event_cascades_to_its_registrations(pool: PgPool) {
    let coordinator = RegistrationCoordinator::new(pool.clone());
    let org = seed_user(&pool, "organization").await;
    let volunteer = seed_user(&pool, "volunteer").await;
    let event = seed_event(&pool, org, None).await;

    coordinator
        .register(volunteer, event, Utc::now())
        .await
        .expect("register");

    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event)
        .execute(&pool)
        .await
        .expect("delete event");

    assert_eq!(ledger_count(&pool, event).await, 0);
}
