//! Integration tests for `PgStore` against a real PostgreSQL.
//!
//! Ignored by default; run with `DATABASE_URL` set and `--ignored`.

use sqlx::PgPool;
use studytrack_core::error::CoreError;
use studytrack_core::mock_test::{MockTestAttemptUpsert, ScoredMcqAttempt};
use studytrack_core::progress::{ShortFormMcqAttempt, ShortFormProgressUpsert, VideoProgressUpsert};
use studytrack_core::store::{
    CatalogStore, ProgressStore, ShortFormProgressFilter, VideoProgressFilter,
};
use studytrack_db::PgStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Class 1 with one subject, two chapters, one video, one short-form and
/// one two-question mock test.
async fn seed_catalog(pool: &PgPool) {
    let statements = [
        "INSERT INTO students (user_id, class_id) VALUES (7, 1)",
        "INSERT INTO subjects (id, class_id, name) VALUES (10, 1, 'Physics')",
        "INSERT INTO chapters (id, subject_id, name) VALUES (100, 10, 'Motion'), (101, 10, 'Forces')",
        "INSERT INTO long_form_videos (id, chapter_id, total_time_secs) VALUES (1000, 100, 600)",
        "INSERT INTO mcqs (id, question, correct_option) VALUES (1, 'q1', 'A'), (2, 'q2', 'C'), (3, 'q3', 'B')",
        "INSERT INTO mock_tests (id, subject_id, title) VALUES (50, 10, 'Mechanics')",
        "INSERT INTO mock_test_mcqs (mock_test_id, mcq_id, position) VALUES (50, 2, 1), (50, 1, 0)",
    ];
    for sql in statements {
        sqlx::query(sql).execute(pool).await.unwrap();
    }

    let sequence = serde_json::json!([
        {"kind": "clip", "duration_secs": 12.5},
        {"kind": "mcq", "mcq_id": 3},
    ]);
    sqlx::query(
        "INSERT INTO short_form_contents (id, chapter_id, title, sequence) VALUES (200, 101, 'Push', $1)",
    )
    .bind(sequence)
    .execute(pool)
    .await
    .unwrap();
}

fn video_upsert(resume_time: f64) -> VideoProgressUpsert {
    VideoProgressUpsert {
        user_id: 7,
        video_id: 1000,
        chapter_id: 100,
        resume_time,
        total_time: 600.0,
        progress_percent: resume_time / 6.0,
        is_watched: resume_time >= 570.0,
        mcqs_attempted: 1,
        correct_mcqs: 1,
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn catalog_reads_resolve_hierarchy(pool: PgPool) {
    seed_catalog(&pool).await;
    let store = PgStore::new(pool);

    let student = store.find_student_by_user_id(7).await.unwrap().unwrap();
    assert_eq!(student.class_id, 1);

    let subjects = store.find_subjects_by_class(1).await.unwrap();
    assert_eq!(subjects.len(), 1);

    let chapters = store.find_chapters_by_subjects(&[10]).await.unwrap();
    assert_eq!(chapters.len(), 2);

    let forms = store.find_short_forms_by_chapters(&[100, 101]).await.unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].total_clips(), 1);
    assert_eq!(forms[0].total_mcqs(), 1);

    let test = store.find_mock_test(50).await.unwrap().unwrap();
    let ids: Vec<i64> = test.mcqs.iter().map(|m| m.mcq_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(test.correct_option(2), Some("C"));

    assert!(store.find_mock_test(51).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Progress upserts
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore]
async fn video_upsert_replaces_on_natural_key(pool: PgPool) {
    seed_catalog(&pool).await;
    let store = PgStore::new(pool.clone());

    let first = store.upsert_video_progress(&video_upsert(60.0)).await.unwrap();
    let second = store.upsert_video_progress(&video_upsert(590.0)).await.unwrap();
    assert_eq!(first.id, second.id);
    assert!(second.is_watched);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM video_progress")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);

    let filter = VideoProgressFilter {
        chapter_id: Some(101),
        video_id: None,
    };
    assert!(store.find_video_progress(7, filter).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore]
async fn short_form_upsert_round_trips_arrays_and_json(pool: PgPool) {
    seed_catalog(&pool).await;
    let store = PgStore::new(pool);

    let input = ShortFormProgressUpsert {
        user_id: 7,
        short_form_id: 200,
        chapter_id: 101,
        watched_clip_indexes: vec![0],
        attempted_mcq_ids: vec![3],
        mcq_attempts: vec![ShortFormMcqAttempt {
            mcq_id: 3,
            selected_option: "B".into(),
            is_correct: true,
        }],
        total_mcqs_attempted: 1,
        correct_count: 1,
        incorrect_count: 0,
        is_watched: true,
        percentage: 100.0,
    };
    store.upsert_short_form_progress(&input).await.unwrap();

    let filter = ShortFormProgressFilter {
        chapter_id: None,
        short_form_id: Some(200),
    };
    let rows = store.find_short_form_progress(7, filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].watched_clip_indexes, vec![0]);
    assert_eq!(rows[0].attempted_mcq_ids, vec![3]);
    assert_eq!(rows[0].mcq_attempts, input.mcq_attempts);
}

#[sqlx::test]
#[ignore]
async fn attempt_upsert_replaces_batch_and_keeps_created_at(pool: PgPool) {
    seed_catalog(&pool).await;
    let store = PgStore::new(pool);

    let batch = |mcq_id: i64, option: &str, correct: bool| MockTestAttemptUpsert {
        user_id: 7,
        subject_id: 10,
        mock_test_id: 50,
        mcq_attempts: vec![ScoredMcqAttempt {
            mcq_id,
            selected_option: option.to_string(),
            is_correct: correct,
            incorrect_option: (!correct).then(|| option.to_string()),
        }],
        total_mcqs_attempted: 1,
        correct_count: i32::from(correct),
        incorrect_count: i32::from(!correct),
    };

    let first = store.upsert_mock_test_attempt(&batch(1, "A", true)).await.unwrap();
    let second = store.upsert_mock_test_attempt(&batch(2, "D", false)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(second.mcq_attempts.len(), 1);
    assert_eq!(second.mcq_attempts[0].incorrect_option.as_deref(), Some("D"));

    let listed = store.find_mock_test_attempts(7, Some(10)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(store.find_mock_test_attempts(7, Some(11)).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore]
async fn overlapping_attempt_is_rejected_without_writing(pool: PgPool) {
    seed_catalog(&pool).await;
    let store = PgStore::new(pool);

    let batch = |mcq_ids: &[i64]| MockTestAttemptUpsert {
        user_id: 7,
        subject_id: 10,
        mock_test_id: 50,
        mcq_attempts: mcq_ids
            .iter()
            .map(|&mcq_id| ScoredMcqAttempt {
                mcq_id,
                selected_option: "A".to_string(),
                is_correct: mcq_id == 1,
                incorrect_option: (mcq_id != 1).then(|| "A".to_string()),
            })
            .collect(),
        total_mcqs_attempted: mcq_ids.len() as i32,
        correct_count: mcq_ids.iter().filter(|&&id| id == 1).count() as i32,
        incorrect_count: mcq_ids.iter().filter(|&&id| id != 1).count() as i32,
    };

    store.upsert_mock_test_attempt(&batch(&[1])).await.unwrap();
    let err = store
        .upsert_mock_test_attempt(&batch(&[2, 1]))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let stored = store.find_mock_test_attempt(7, 50, 10).await.unwrap().unwrap();
    assert_eq!(stored.total_mcqs_attempted, 1);
    assert_eq!(stored.mcq_attempts[0].mcq_id, 1);
}

#[sqlx::test]
#[ignore]
async fn ping_succeeds_on_live_pool(pool: PgPool) {
    let store = PgStore::new(pool);
    store.ping().await.unwrap();
}
