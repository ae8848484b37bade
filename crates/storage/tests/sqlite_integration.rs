use chrono::Duration;
use dedaena_core::model::{Preferences, StoredSession, UserSession};
use dedaena_core::time::fixed_now;
use storage::repository::{PreferencesRepository, SessionRepository, Storage};
use storage::sqlite::SqliteRepository;

fn moderator_session(token: &str) -> StoredSession {
    StoredSession {
        token: token.to_string(),
        user: UserSession {
            username: "luka".to_string(),
            email: "luka@example.com".to_string(),
            is_admin: false,
            is_moder: true,
            is_active: true,
        },
        saved_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_preferences_round_trip_and_overwrite() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_prefs?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.get_preferences().await.unwrap().is_none());

    let quiet = Preferences::default().with_sound_enabled(false);
    repo.save_preferences(&quiet).await.unwrap();
    assert_eq!(repo.get_preferences().await.unwrap(), Some(quiet));

    repo.save_preferences(&Preferences::default()).await.unwrap();
    let stored = repo.get_preferences().await.unwrap().expect("stored");
    assert!(stored.sound_enabled());
}

#[tokio::test]
async fn sqlite_session_save_replace_and_clear() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_session?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_session(&moderator_session("first")).await.unwrap();
    repo.save_session(&moderator_session("second")).await.unwrap();
    let stored = repo.get_session().await.unwrap().expect("session");
    assert_eq!(stored, moderator_session("second"));
    assert!(stored.user.can_moderate());

    repo.clear_session().await.unwrap();
    assert!(repo.get_session().await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_session_keeps_the_given_save_time() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_saved_at?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut session = moderator_session("tok");
    session.saved_at = fixed_now() - Duration::days(3);
    repo.save_session(&session).await.unwrap();

    let stored = repo.get_session().await.unwrap().expect("session");
    assert_eq!(stored.saved_at, fixed_now() - Duration::days(3));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let count: i64 = sqlx_count(&repo).await;
    assert_eq!(count, 1);
}

async fn sqlx_count(repo: &SqliteRepository) -> i64 {
    use sqlx::Row;
    sqlx::query("SELECT COUNT(*) AS n FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .expect("count")
        .get("n")
}

#[tokio::test]
async fn storage_sqlite_wires_both_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .sessions
        .save_session(&moderator_session("tok"))
        .await
        .unwrap();
    storage
        .preferences
        .save_preferences(&Preferences::default().with_sound_enabled(false))
        .await
        .unwrap();

    assert_eq!(
        storage.sessions.get_session().await.unwrap().map(|s| s.token),
        Some("tok".to_string())
    );
    assert!(
        !storage
            .preferences
            .get_preferences()
            .await
            .unwrap()
            .expect("prefs")
            .sound_enabled()
    );
}
