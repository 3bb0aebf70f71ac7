use crate::catalog::Batch;
use crate::documents::{to_bson_document, UpdateCommand};
use crate::pipeline::{load_batches, RunTracker};
use crate::state::{CheckpointManager, RunKind, RunStatus};
use crate::store::CatalogStore;
use crate::translation::Language;
use crate::utils::{CatalogError, DataLayout, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTally {
    pub updated: usize,
    /// Matched, but already held the same values.
    pub unchanged: usize,
    pub not_found: usize,
    pub errors: usize,
}

impl AddAssign for UpdateTally {
    fn add_assign(&mut self, other: Self) {
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.not_found += other.not_found;
        self.errors += other.errors;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateSummary {
    pub number: usize,
    pub skipped: bool,
    #[serde(flatten)]
    pub tally: UpdateTally,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub run_id: String,
    pub language: Language,
    pub commands: usize,
    pub batches: Vec<BatchUpdateSummary>,
    pub totals: UpdateTally,
    pub status: RunStatus,
}

pub fn run_kind(language: Language) -> RunKind {
    match language {
        Language::English => RunKind::EnglishUpdates,
        Language::Arabic => RunKind::ArabicUpdates,
    }
}

pub fn load_update_batches(layout: &DataLayout, language: Language) -> Result<Vec<Batch<UpdateCommand>>> {
    load_batches(layout, language.update_batch_prefix())
}

async fn apply_command<S: CatalogStore>(store: &S, command: &UpdateCommand) -> Result<UpdateTally> {
    let filter = to_bson_document(JsonValue::Object(command.filter.clone()))?;
    let update = to_bson_document(serde_json::to_value(&command.update)?)?;
    let outcome = store.update_products(filter, update).await?;

    let mut tally = UpdateTally::default();
    if outcome.matched == 0 {
        tally.not_found += 1;
    } else if outcome.modified > 0 {
        tally.updated += 1;
    } else {
        tally.unchanged += 1;
    }
    Ok(tally)
}

/// Runs every command of every batch through `update_many`. A batch with any
/// failed command is recorded as failed and retried on resume.
pub async fn apply_updates<S: CatalogStore>(
    store: &S,
    batches: &[Batch<UpdateCommand>],
    checkpoints: &CheckpointManager,
    language: Language,
    resume: Option<&str>,
) -> Result<UpdateReport> {
    let mut tracker = RunTracker::start(checkpoints, run_kind(language), batches.len(), resume)?;
    let mut totals = UpdateTally::default();
    let mut summaries = Vec::with_capacity(batches.len());

    for batch in batches {
        if tracker.should_skip(batch.number) {
            summaries.push(BatchUpdateSummary {
                number: batch.number,
                skipped: true,
                tally: UpdateTally::default(),
            });
            continue;
        }

        let mut tally = UpdateTally::default();
        let mut first_error = None;
        for command in &batch.items {
            match apply_command(store, command).await {
                Ok(t) => tally += t,
                Err(e) => {
                    tracing::warn!(
                        batch = batch.number,
                        shufersal_id = ?command.shufersal_id(),
                        error = %e,
                        "Update failed"
                    );
                    tally.errors += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            None => tracker.completed(batch.number)?,
            Some(e) => tracker.failed(
                batch.number,
                &CatalogError::DatabaseError(format!("{} of {} updates failed: {}", tally.errors, batch.len(), e)),
            )?,
        }

        tracing::info!(
            language = %language,
            batch = batch.number,
            updated = tally.updated,
            unchanged = tally.unchanged,
            not_found = tally.not_found,
            errors = tally.errors,
            "Update batch applied"
        );

        totals += tally;
        summaries.push(BatchUpdateSummary {
            number: batch.number,
            skipped: false,
            tally,
        });
    }

    let run_id = tracker.run_id().to_string();
    let checkpoint = tracker.finish()?;

    tracing::info!(
        language = %language,
        updated = totals.updated,
        unchanged = totals.unchanged,
        not_found = totals.not_found,
        errors = totals.errors,
        "Updates finished"
    );

    Ok(UpdateReport {
        run_id,
        language,
        commands: batches.iter().map(|b| b.len()).sum(),
        batches: summaries,
        totals,
        status: checkpoint.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Batcher;
    use crate::state::open_state;
    use crate::store::MemoryStore;
    use mongodb::bson::doc;
    use serde_json::json;

    fn command(id: &str, name: &str) -> UpdateCommand {
        UpdateCommand::by_shufersal_id(id)
            .set("name_en", json!(name))
            .set("aliases.en", json!([name]))
    }

    #[tokio::test]
    async fn classifies_each_command() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoints = CheckpointManager::new(open_state(&dir.path().join("s.redb")).unwrap()).unwrap();
        let store = MemoryStore::new();
        store
            .insert_products(vec![
                doc! { "metadata": { "shufersal_id": "P_1" } },
                doc! { "metadata": { "shufersal_id": "P_2" }, "name_en": "Eggs", "aliases": { "en": ["Eggs"] } },
            ])
            .await
            .unwrap();

        let batches = Batcher::new(2).split(vec![
            command("P_1", "Milk"),
            command("P_2", "Eggs"),
            command("P_9", "Cheese"),
        ]);
        let report = apply_updates(&store, &batches, &checkpoints, Language::English, None)
            .await
            .unwrap();

        assert_eq!(report.commands, 3);
        assert_eq!(
            report.totals,
            UpdateTally { updated: 1, unchanged: 1, not_found: 1, errors: 0 }
        );
        assert_eq!(report.batches.len(), 2);
        assert_eq!(report.status, RunStatus::Completed);

        let run = checkpoints.require_run(&report.run_id).unwrap();
        assert_eq!(run.kind, RunKind::EnglishUpdates);
        assert_eq!(run.batches_completed, vec![1, 2]);
    }

    #[tokio::test]
    async fn resumed_updates_skip_completed_batches() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoints = CheckpointManager::new(open_state(&dir.path().join("s.redb")).unwrap()).unwrap();
        let store = MemoryStore::new();
        store
            .insert_products(vec![doc! { "metadata": { "shufersal_id": "P_1" } }])
            .await
            .unwrap();

        let batches = Batcher::new(1).split(vec![command("P_1", "Milk"), command("P_1", "Fresh Milk")]);
        let run = checkpoints.create_run(RunKind::ArabicUpdates, 2).unwrap();
        checkpoints.mark_batch_completed(&run.run_id, 2).unwrap();

        let report = apply_updates(&store, &batches, &checkpoints, Language::Arabic, Some(&run.run_id))
            .await
            .unwrap();

        assert!(report.batches[1].skipped);
        assert_eq!(report.totals.updated, 1);
        let stored = &store.products().await[0];
        assert_eq!(stored.get_str("name_en").unwrap(), "Milk");
    }

    #[tokio::test]
    async fn store_errors_fail_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoints = CheckpointManager::new(open_state(&dir.path().join("s.redb")).unwrap()).unwrap();
        let store = MemoryStore::new();

        let mut bad = command("P_1", "Milk");
        bad.update.set.insert("when".to_string(), json!({"$date": "not a date"}));
        let batches = Batcher::new(5).split(vec![bad]);

        let report = apply_updates(&store, &batches, &checkpoints, Language::English, None)
            .await
            .unwrap();
        assert_eq!(report.totals.errors, 1);
        assert_eq!(report.status, RunStatus::Failed);
        let run = checkpoints.require_run(&report.run_id).unwrap();
        assert_eq!(run.failed_batches[0].number, 1);
    }
}
