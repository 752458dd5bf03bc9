// crates/lexalign-cli/src/commands/translate.rs
//
// `lexalign translate <ALIGNER> <WORDS>...` ranks target-vocabulary
// candidates for each source word. Unknown words are reported per word.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lexalign_align::{Candidate, WordTranslation};
use lexalign_store::DirectoryStore;

use crate::config::LexalignConfig;
use crate::output::{render, similarity, OutputFormat};

/// Word translation command.
#[derive(Debug, Args)]
pub struct TranslateCmd {
    /// Path to a saved `.aligner` file.
    pub aligner: PathBuf,

    /// Source-vocabulary words to translate.
    #[arg(required = true)]
    pub words: Vec<String>,

    /// Candidates per word (default from config).
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// A row in the translation table.
#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Word")]
    word: String,
    #[tabled(rename = "Rank")]
    rank: String,
    #[tabled(rename = "Candidate")]
    candidate: String,
    #[tabled(rename = "Similarity")]
    similarity: String,
}

#[derive(Serialize)]
struct TranslationJson {
    word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<Candidate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn to_rows(translations: &[WordTranslation]) -> Vec<CandidateRow> {
    let mut rows = Vec::new();
    for t in translations {
        match &t.result {
            Ok(candidates) => {
                for (rank, c) in candidates.iter().enumerate() {
                    rows.push(CandidateRow {
                        word: t.word.clone(),
                        rank: (rank + 1).to_string(),
                        candidate: c.word.clone(),
                        similarity: similarity(c.similarity),
                    });
                }
            }
            Err(e) => rows.push(CandidateRow {
                word: t.word.clone(),
                rank: "-".to_string(),
                candidate: e.to_string(),
                similarity: "-".to_string(),
            }),
        }
    }
    rows
}

fn to_json(translations: Vec<WordTranslation>) -> Vec<TranslationJson> {
    translations
        .into_iter()
        .map(|t| match t.result {
            Ok(candidates) => TranslationJson {
                word: t.word,
                candidates: Some(candidates),
                error: None,
            },
            Err(e) => TranslationJson {
                word: t.word,
                candidates: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

/// Run the translate command.
pub async fn run(cmd: &TranslateCmd, config: &LexalignConfig) -> Result<(), Box<dyn std::error::Error>> {
    let aligner = DirectoryStore::read_file(&cmd.aligner)?;
    let k = cmd.top_k.unwrap_or(config.top_k);
    tracing::debug!("Translating {} words with {} (top {})", cmd.words.len(), aligner.name(), k);

    let translations = aligner.translate_words(&cmd.words[..], k)?;
    let rows = to_rows(&translations);
    println!("{}", render(cmd.format, &rows, &to_json(translations)));

    Ok(())
}
