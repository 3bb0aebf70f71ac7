use crate::catalog::{read_json, write_json, BatchWriter, Batcher};
use crate::documents::{ProductDocument, UpdateCommand};
use crate::pipeline::prepare::ALL_PRODUCTS_FILE;
use crate::translation::{translate_products, translator_for, Language, ProductTranslation};
use crate::utils::{AppConfig, DataLayout, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranslationSample {
    pub name_he: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranslateReport {
    pub language: Language,
    pub products: usize,
    pub commands: usize,
    /// Records without a product id get no update command.
    pub skipped_without_id: usize,
    pub batch_size: usize,
    pub batches: usize,
    pub samples: Vec<TranslationSample>,
}

pub fn build_update_commands(records: &[ProductTranslation], clear_other_aliases: bool) -> Vec<UpdateCommand> {
    records
        .iter()
        .filter_map(|r| UpdateCommand::from_translation(r, clear_other_aliases))
        .collect()
}

/// Name of the file holding every update command of a language in one array.
pub fn all_updates_file(language: Language) -> &'static str {
    match language {
        Language::English => "mongodb_updates.json",
        Language::Arabic => "mongodb_updates_arabic.json",
    }
}

/// Prepared products → translation records and update command batches.
pub fn translate_catalog(config: &AppConfig, layout: &DataLayout, language: Language) -> Result<TranslateReport> {
    let products: Vec<ProductDocument> = read_json(layout, ALL_PRODUCTS_FILE)?;
    let translator = translator_for(language, config.translation.extra_terms_file.as_deref())?;
    tracing::info!(
        language = %language,
        products = products.len(),
        terms = translator.dictionary().len(),
        "Translating catalog"
    );

    let records = translate_products(&products, &translator);
    write_json(layout, language.translations_file(), &records)?;

    let commands = build_update_commands(&records, config.translation.clear_other_aliases);
    write_json(layout, all_updates_file(language), &commands)?;

    let command_count = commands.len();
    let batcher = Batcher::new(config.batching.update_batch_size);
    let batches = batcher.split(commands);
    let writer = BatchWriter::new(layout, language.update_batch_prefix());
    writer.remove_all()?;
    writer.write_all(&batches)?;

    tracing::info!(
        language = %language,
        commands = command_count,
        batches = batches.len(),
        "Update batches written"
    );

    Ok(TranslateReport {
        language,
        products: records.len(),
        commands: command_count,
        skipped_without_id: records.len() - command_count,
        batch_size: batcher.batch_size(),
        batches: batches.len(),
        samples: records
            .iter()
            .take(SAMPLE_SIZE)
            .map(|r| TranslationSample {
                name_he: r.name_he.clone(),
                name: r.name.clone(),
            })
            .collect(),
    })
}
