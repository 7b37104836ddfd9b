//! Consensus scoring over recipes read back from a database file

use fxr_analyze::consensus::{score, FieldConsensus, FieldValue, ScoredField};
use fxr_analyze::db::connect_readonly;
use fxr_analyze::report::render_recipe_card;
use fxr_common::db::{init_database, load_all_recipes, save_recipe};
use fxr_common::{RecipeRecord, StepField};
use tempfile::TempDir;

fn recipe(slug: &str, sim: &str, highlight: &str, shadow: &str, red: i64) -> RecipeRecord {
    let mut r = RecipeRecord::new(slug, "X-Trans V", format!("https://example.com/{}", slug));
    r.film_simulation = Some(sim.to_string());
    r.dynamic_range = Some("DR400".to_string());
    r.highlight = Some(highlight.to_string());
    r.shadow = Some(shadow.to_string());
    r.wb_shift_red = Some(red);
    r
}

#[tokio::test]
async fn test_consensus_from_stored_recipes() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("film_recipes.db");

    let writer = init_database(&db_path).await.unwrap();
    for r in [
        recipe("portra", "Classic Chrome", "-2", "+1", 2),
        recipe("gold", "Classic Chrome", "-2 (Soft)", "-1", 2),
        recipe("velvia", "Velvia", "+1", "-1", -1),
        recipe("superia", "Classic Negative", "0 to +2", "+1", 2),
    ] {
        save_recipe(&writer, &r).await.unwrap();
    }
    writer.close().await;

    let pool = connect_readonly(&db_path).await.unwrap();
    let records = load_all_recipes(&pool).await.unwrap();
    let report = score(&records, &ScoredField::ALL);

    assert_eq!(
        report.profile.modal(ScoredField::Step(StepField::Highlight)),
        Some(&FieldValue::Number(-2.0))
    );
    // +1 and -1 tie at two each; the negative side wins
    assert_eq!(
        report.profile.modal(ScoredField::Step(StepField::Shadow)),
        Some(&FieldValue::Number(-1.0))
    );
    assert_eq!(
        report.profile.get(ScoredField::DynamicRange),
        Some(&FieldConsensus::Modal {
            value: FieldValue::Label("DR400".to_string()),
            count: 4,
            support: 4
        })
    );
    assert!(report
        .profile
        .missing_fields()
        .contains(&ScoredField::WbShiftBlue));

    // film sim, DR, highlight, shadow, red
    let closest = report.closest().unwrap();
    assert_eq!(closest.record.name, "gold");
    assert_eq!(closest.matches, 5);
    assert_eq!(report.profile.possible_score(), 5);

    let card = render_recipe_card(&report.profile);
    assert!(card.contains("| Highlight | -2 |"));
    assert!(card.contains("| WB Shift Red | +2 |"));
}
