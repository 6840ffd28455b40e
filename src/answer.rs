//! Grounded answer composition: retrieved chunks + question → prompt → generator.

use std::fmt::Write;

use crate::corpus::CorpusManager;
use crate::llm::Generator;
use crate::models::{Retrieval, RetrievedChunk};

/// Returned instead of a generated answer when nothing has been uploaded.
pub const EMPTY_CORPUS_ANSWER: &str = "Please upload a document first!";

/// Placed after every context block.
const CONTEXT_SEPARATOR: &str = "\n...\n";

fn instructions() -> &'static str {
    "You are a supportive AI tutor. Answer the question using ONLY the context below.\n\
     If the context does not contain the answer, say so instead of guessing.\n\
     Cite your sources as (Source: Page X)."
}

/// One labeled block per chunk, in rank order.
pub fn build_context(hits: &[RetrievedChunk]) -> String {
    let mut ctx = String::new();
    for hit in hits {
        let r = &hit.record;
        let _ = write!(
            ctx,
            "[Source: {}, Page {}]: {}{CONTEXT_SEPARATOR}",
            r.filename, r.page, r.text
        );
    }
    ctx
}

pub fn build_prompt(hits: &[RetrievedChunk], question: &str) -> String {
    format!(
        "{}\n\nCONTEXT:\n{}\nQUESTION: {question}",
        instructions(),
        build_context(hits)
    )
}

/// Retrieve the `k` best chunks for `question` and have the generator answer
/// from them. The generator output is returned verbatim.
pub async fn answer(
    corpus: &CorpusManager,
    generator: &dyn Generator,
    question: &str,
    k: usize,
) -> anyhow::Result<String> {
    let hits = match corpus.retrieve(question, k).await? {
        Retrieval::EmptyCorpus => return Ok(EMPTY_CORPUS_ANSWER.to_string()),
        Retrieval::Hits(hits) => hits,
    };

    tracing::debug!("Answering from {} retrieved chunks", hits.len());
    let prompt = build_prompt(&hits, question);
    generator.generate(&prompt).await
}
