use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    Engine, EngineError, RecommendedEntry, RecordStatus, TemplateDraft, TemplateItem,
    VaccinationGroup, VaccinationKey,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_pen(db: &DatabaseConnection, name: &str, intake_date: NaiveDate) -> Uuid {
    let id = Uuid::new_v4();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO pens (id, name, intake_date) VALUES (?, ?, ?)",
        vec![
            id.to_string().into(),
            name.into(),
            intake_date.to_string().into(),
        ],
    ))
    .await
    .unwrap();
    id
}

async fn seed_vaccine(db: &DatabaseConnection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO vaccines (id, name) VALUES (?, ?)",
        vec![id.to_string().into(), name.into()],
    ))
    .await
    .unwrap();
    id
}

async fn save_template(
    engine: &Engine,
    vaccine_id: Uuid,
    stage: i32,
    days_old: i32,
) -> TemplateItem {
    engine
        .save_templates(vec![TemplateDraft {
            id: None,
            vaccine_id,
            stage,
            days_old,
            dosage: "2ml".to_string(),
            notes: None,
        }])
        .await
        .unwrap()
        .into_iter()
        .find(|t| t.vaccine_id == vaccine_id && t.stage == stage)
        .unwrap()
}

fn group<'a>(groups: &'a [VaccinationGroup], vaccine_name: &str, stage: i32) -> &'a VaccinationGroup {
    groups
        .iter()
        .find(|g| g.vaccine_name == vaccine_name && g.stage == stage)
        .unwrap_or_else(|| panic!("missing group {vaccine_name}/{stage}"))
}

async fn count_records(db: &DatabaseConnection) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS cnt FROM schedule_records".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "cnt").unwrap()
}

#[tokio::test]
async fn pen_is_due_as_forecast_on_the_threshold_day() {
    let (engine, db) = engine_with_db().await;
    let pen_id = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    let group = group(&groups, "Suyễn heo", 1);

    assert_eq!(group.total_pens, 1);
    let pen = &group.pens[0];
    assert_eq!(pen.pen_id, pen_id);
    assert_eq!(pen.pen_name, "A1");
    assert!(!pen.is_real);
    assert_eq!(pen.status, RecordStatus::Pending);
    assert!(!pen.is_overdue);
    assert_eq!(pen.template_id, Some(template.id));
    assert_eq!(pen.original_due_date, date(2025, 1, 8));
}

#[tokio::test]
async fn unmet_obligation_is_carried_forward_as_overdue() {
    let (engine, db) = engine_with_db().await;
    seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    save_template(&engine, vaccine_id, 1, 7).await;

    for query_date in [date(2025, 1, 9), date(2025, 1, 20), date(2025, 3, 1)] {
        let groups = engine.get_vaccination_groups(query_date).await.unwrap();
        let group = group(&groups, "Suyễn heo", 1);
        let pen = &group.pens[0];
        assert!(pen.is_overdue, "expected overdue on {query_date}");
        assert_eq!(pen.original_due_date, date(2025, 1, 8));
    }
}

#[tokio::test]
async fn pen_younger_than_threshold_is_not_due() {
    let (engine, db) = engine_with_db().await;
    seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    save_template(&engine, vaccine_id, 1, 7).await;

    let groups = engine.get_vaccination_groups(date(2025, 1, 5)).await.unwrap();
    assert!(groups.is_empty());

    // A date before the pen's intake is simply an empty roster, not an error.
    let groups = engine
        .get_vaccination_groups(date(2024, 12, 1))
        .await
        .unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn mark_vaccinated_materializes_exactly_one_record() {
    let (engine, db) = engine_with_db().await;
    let pen_id = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    let key = VaccinationKey::Forecast {
        pen_id,
        template_id: template.id,
    };

    let completed = engine.mark_vaccinated(&[key], Utc::now()).await.unwrap();
    assert_eq!(completed, 1);
    assert_eq!(count_records(&db).await, 1);

    // Idempotent re-submission: still exactly one record, nothing flips.
    let completed = engine.mark_vaccinated(&[key], Utc::now()).await.unwrap();
    assert_eq!(completed, 0);
    assert_eq!(count_records(&db).await, 1);

    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    let pen = &group(&groups, "Suyễn heo", 1).pens[0];
    assert!(pen.is_real);
    assert_eq!(pen.status, RecordStatus::Completed);
    assert!(!pen.is_overdue);
}

#[tokio::test]
async fn revert_round_trip_shows_pen_pending_again() {
    let (engine, db) = engine_with_db().await;
    let pen_id = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    engine
        .mark_vaccinated(
            &[VaccinationKey::Forecast {
                pen_id,
                template_id: template.id,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    let schedule_id = group(&groups, "Suyễn heo", 1).pens[0].schedule_id.unwrap();

    engine.revert_vaccination(schedule_id).await.unwrap();

    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    let group = group(&groups, "Suyễn heo", 1);
    // No duplicate rows for the pen: the pending record replaces the
    // forecast instead of showing next to it.
    assert_eq!(group.pens.len(), 1);
    let pen = &group.pens[0];
    assert!(pen.is_real);
    assert_eq!(pen.status, RecordStatus::Pending);
    assert_eq!(pen.schedule_id, Some(schedule_id));

    // Reverting a pending record is rejected.
    let err = engine.revert_vaccination(schedule_id).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn reverted_record_can_be_completed_again_as_real_entry() {
    let (engine, db) = engine_with_db().await;
    let pen_id = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    engine
        .mark_vaccinated(
            &[VaccinationKey::Forecast {
                pen_id,
                template_id: template.id,
            }],
            Utc::now(),
        )
        .await
        .unwrap();
    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    let schedule_id = group(&groups, "Suyễn heo", 1).pens[0].schedule_id.unwrap();
    engine.revert_vaccination(schedule_id).await.unwrap();

    let completed = engine
        .mark_vaccinated(&[VaccinationKey::Real { schedule_id }], Utc::now())
        .await
        .unwrap();
    assert_eq!(completed, 1);
    assert_eq!(count_records(&db).await, 1);

    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    assert_eq!(
        group(&groups, "Suyễn heo", 1).pens[0].status,
        RecordStatus::Completed
    );
}

#[tokio::test]
async fn batch_with_invalid_item_is_rejected_without_writes() {
    let (engine, db) = engine_with_db().await;
    let pen_id = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    let items = [
        VaccinationKey::Forecast {
            pen_id,
            template_id: template.id,
        },
        VaccinationKey::Forecast {
            pen_id: Uuid::new_v4(),
            template_id: template.id,
        },
    ];

    let err = engine.mark_vaccinated(&items, Utc::now()).await.unwrap_err();
    match err {
        EngineError::BatchRejected(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
            assert_eq!(failures[0].reason, "pen not exists");
        }
        other => panic!("expected batch rejection, got {other:?}"),
    }

    // Atomicity: the valid item was not applied either.
    assert_eq!(count_records(&db).await, 0);
}

#[tokio::test]
async fn deleted_template_stops_forecasting_but_keeps_history() {
    let (engine, db) = engine_with_db().await;
    let pen_a = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    seed_pen(&db, "B2", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    engine
        .mark_vaccinated(
            &[VaccinationKey::Forecast {
                pen_id: pen_a,
                template_id: template.id,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    engine.delete_template(template.id).await.unwrap();

    // B2 is no longer forecast, but A1's record stays visible under its
    // stored snapshot on the original due date.
    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    let group = group(&groups, "Suyễn heo", 1);
    assert_eq!(group.pens.len(), 1);
    assert_eq!(group.pens[0].pen_id, pen_a);
    assert!(group.pens[0].is_real);
}

#[tokio::test]
async fn groups_and_pens_are_ordered() {
    let (engine, db) = engine_with_db().await;
    // C3 intake makes it overdue, A1/B2 due exactly on the queried date.
    let pen_c = seed_pen(&db, "C3", date(2025, 1, 1)).await;
    seed_pen(&db, "B2", date(2025, 1, 5)).await;
    let pen_a = seed_pen(&db, "A1", date(2025, 1, 5)).await;
    let dich_ta = seed_vaccine(&db, "Dịch tả").await;
    let suyen = seed_vaccine(&db, "Suyễn heo").await;
    let t1 = save_template(&engine, suyen, 1, 7).await;
    save_template(&engine, dich_ta, 2, 7).await;

    engine
        .mark_vaccinated(
            &[VaccinationKey::Forecast {
                pen_id: pen_a,
                template_id: t1.id,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    let groups = engine
        .get_vaccination_groups(date(2025, 1, 12))
        .await
        .unwrap();

    // Stage ascending, then vaccine name.
    assert_eq!(groups.len(), 2);
    assert_eq!((groups[0].stage, groups[0].vaccine_name.as_str()), (1, "Suyễn heo"));
    assert_eq!((groups[1].stage, groups[1].vaccine_name.as_str()), (2, "Dịch tả"));

    // Within the stage-1 group: overdue C3 first, pending B2, completed A1.
    let order: Vec<_> = groups[0].pens.iter().map(|p| p.pen_name.as_str()).collect();
    assert_eq!(order, ["C3", "B2", "A1"]);
    assert!(groups[0].pens[0].is_overdue);
    assert_eq!(groups[0].pens[0].pen_id, pen_c);
    assert_eq!(groups[0].pens[2].status, RecordStatus::Completed);
}

#[tokio::test]
async fn duplicate_vaccine_stage_pair_is_a_conflict() {
    let (engine, db) = engine_with_db().await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    save_template(&engine, vaccine_id, 1, 7).await;

    let err = engine
        .save_templates(vec![TemplateDraft {
            id: None,
            vaccine_id,
            stage: 1,
            days_old: 10,
            dosage: "1ml".to_string(),
            notes: None,
        }])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Updating the existing item under its own id is fine.
    let existing = engine.list_templates().await.unwrap().remove(0);
    let saved = engine
        .save_templates(vec![TemplateDraft {
            id: Some(existing.id),
            vaccine_id,
            stage: 1,
            days_old: 10,
            dosage: "1ml".to_string(),
            notes: Some("booster".to_string()),
        }])
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].days_old, 10);
}

#[tokio::test]
async fn template_validation_rejects_bad_drafts() {
    let (engine, db) = engine_with_db().await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;

    let err = engine
        .save_templates(vec![TemplateDraft {
            id: None,
            vaccine_id,
            stage: 0,
            days_old: 7,
            dosage: "2ml".to_string(),
            notes: None,
        }])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .save_templates(vec![TemplateDraft {
            id: None,
            vaccine_id: Uuid::new_v4(),
            stage: 1,
            days_old: 7,
            dosage: "2ml".to_string(),
            notes: None,
        }])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn suggestions_list_only_unconfigured_pairs() {
    let (engine, db) = engine_with_db().await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    save_template(&engine, vaccine_id, 1, 7).await;
    save_template(&engine, vaccine_id, 2, 21).await;

    let reference = vec![
        RecommendedEntry {
            vaccine_id,
            stage: 1,
            recommended_days_old: 7,
            dosage: "2ml".to_string(),
            description: None,
        },
        RecommendedEntry {
            vaccine_id,
            stage: 2,
            recommended_days_old: 21,
            dosage: "2ml".to_string(),
            description: None,
        },
        RecommendedEntry {
            vaccine_id,
            stage: 3,
            recommended_days_old: 35,
            dosage: "2ml".to_string(),
            description: Some("third booster".to_string()),
        },
    ];

    let suggestions = engine.list_suggestions(&reference).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].stage, 3);
    assert_eq!(suggestions[0].days_old, 35);
    assert_eq!(suggestions[0].vaccine_name, "Suyễn heo");

    let accepted = engine
        .accept_suggestion(&suggestions[0], None)
        .await
        .unwrap();
    assert_eq!(accepted.stage, 3);
    assert_eq!(accepted.days_old, 35);

    // The accepted pair disappears from the diff on the next call.
    let suggestions = engine.list_suggestions(&reference).await.unwrap();
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn accept_suggestion_honors_age_override() {
    let (engine, db) = engine_with_db().await;
    let vaccine_id = seed_vaccine(&db, "Dịch tả").await;

    let reference = vec![RecommendedEntry {
        vaccine_id,
        stage: 1,
        recommended_days_old: 14,
        dosage: "1ml".to_string(),
        description: None,
    }];

    let suggestions = engine.list_suggestions(&reference).await.unwrap();
    let accepted = engine
        .accept_suggestion(&suggestions[0], Some(18))
        .await
        .unwrap();
    assert_eq!(accepted.days_old, 18);
}

#[tokio::test]
async fn protocol_edits_do_not_rewrite_materialized_records() {
    let (engine, db) = engine_with_db().await;
    let pen_id = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    engine
        .mark_vaccinated(
            &[VaccinationKey::Forecast {
                pen_id,
                template_id: template.id,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    // Push the threshold later; the already-materialized record keeps its
    // original scheduled date.
    engine
        .save_templates(vec![TemplateDraft {
            id: Some(template.id),
            vaccine_id,
            stage: 1,
            days_old: 14,
            dosage: "2ml".to_string(),
            notes: None,
        }])
        .await
        .unwrap();

    let groups = engine.get_vaccination_groups(date(2025, 1, 8)).await.unwrap();
    let group = group(&groups, "Suyễn heo", 1);
    assert_eq!(group.pens.len(), 1);
    assert!(group.pens[0].is_real);
    assert_eq!(group.pens[0].original_due_date, date(2025, 1, 8));
}

#[tokio::test]
async fn edited_threshold_does_not_shift_a_real_records_due_date() {
    let (engine, db) = engine_with_db().await;
    let pen_id = seed_pen(&db, "A1", date(2025, 1, 1)).await;
    let vaccine_id = seed_vaccine(&db, "Suyễn heo").await;
    let template = save_template(&engine, vaccine_id, 1, 7).await;

    engine
        .mark_vaccinated(
            &[VaccinationKey::Forecast {
                pen_id,
                template_id: template.id,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    engine
        .save_templates(vec![TemplateDraft {
            id: Some(template.id),
            vaccine_id,
            stage: 1,
            days_old: 14,
            dosage: "2ml".to_string(),
            notes: None,
        }])
        .await
        .unwrap();

    // On a date where the edited threshold is met the record is matched
    // through the live template, and still reports its stored date.
    let groups = engine
        .get_vaccination_groups(date(2025, 1, 15))
        .await
        .unwrap();
    let completed = &group(&groups, "Suyễn heo", 1).pens[0];
    assert!(completed.is_real);
    assert_eq!(completed.status, RecordStatus::Completed);
    assert_eq!(completed.original_due_date, date(2025, 1, 8));

    // A reverted record is overdue relative to its stored date, not the
    // edited threshold.
    engine
        .revert_vaccination(completed.schedule_id.unwrap())
        .await
        .unwrap();
    let groups = engine
        .get_vaccination_groups(date(2025, 1, 15))
        .await
        .unwrap();
    let pending = &group(&groups, "Suyễn heo", 1).pens[0];
    assert_eq!(pending.status, RecordStatus::Pending);
    assert!(pending.is_overdue);
    assert_eq!(pending.original_due_date, date(2025, 1, 8));
}
