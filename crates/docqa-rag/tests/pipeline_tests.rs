use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

use docqa_rag::ingestion::{FileParser, IngestPipeline, TextChunker};
use docqa_rag::providers::HashingEmbedder;
use docqa_rag::retrieval::{ChunkStore, DistanceMetric};
use docqa_rag::{identify, Error};

const AI_TEXT: &str = "Artificial intelligence is a broad field of computer science. \
Machine learning is a subset of artificial intelligence that learns from data. \
Neural networks are loosely inspired by the brain and power deep learning. \
Rivers carry sediment from mountains down to the sea. \
Bakers knead dough so that gluten develops before it rises in the oven.";

async fn open_pipeline(root: &TempDir, metric: DistanceMetric, bound: usize) -> IngestPipeline {
    let store = ChunkStore::open(root.path(), Arc::new(HashingEmbedder::new(384)), metric)
        .await
        .expect("Failed to open store");
    IngestPipeline::new(
        Arc::new(FileParser::new()),
        TextChunker::new(bound),
        Arc::new(store),
    )
}

fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = docx_rs::Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)));
    }
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).expect("Failed to pack docx");
    cursor.into_inner()
}

#[tokio::test]
async fn test_same_bytes_same_id_and_replaced_collection() {
    let root = TempDir::new().unwrap();
    let pipeline = open_pipeline(&root, DistanceMetric::L2, 120).await;

    let first = pipeline.ingest(AI_TEXT.as_bytes().to_vec(), "ai.txt").await.unwrap();
    let second = pipeline.ingest(AI_TEXT.as_bytes().to_vec(), "copy-of-ai.txt").await.unwrap();

    assert_eq!(first.doc_id, second.doc_id);
    assert_eq!(first.doc_id, identify(AI_TEXT.as_bytes()));
    assert_eq!(pipeline.store().collections().len(), 1);
    assert_eq!(pipeline.store().get_chunks(&first.doc_id).len(), first.chunks.len());
}

#[tokio::test]
async fn test_different_bytes_are_separate_documents() {
    let root = TempDir::new().unwrap();
    let pipeline = open_pipeline(&root, DistanceMetric::L2, 1000).await;

    let a = pipeline.ingest(b"Alpha text.".to_vec(), "a.txt").await.unwrap();
    let b = pipeline.ingest(b"Alpha text. ".to_vec(), "b.txt").await.unwrap();

    assert_ne!(a.doc_id, b.doc_id);
    let mut expected = vec![format!("doc_{}", a.doc_id), format!("doc_{}", b.doc_id)];
    expected.sort();
    assert_eq!(pipeline.store().collections(), expected);
}

#[tokio::test]
async fn test_chunks_respect_bound_and_reconstruct_text() {
    let root = TempDir::new().unwrap();
    let pipeline = open_pipeline(&root, DistanceMetric::L2, 100).await;

    let outcome = pipeline.ingest(AI_TEXT.as_bytes().to_vec(), "ai.txt").await.unwrap();

    for (i, chunk) in outcome.chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(chunk.id, format!("{}_chunk_{}", outcome.doc_id, i));
        assert!(chunk.text.chars().count() <= 100, "{:?}", chunk.text);
    }

    let joined = outcome
        .chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let squash = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(squash(&joined), squash(&outcome.full_text));
}

#[tokio::test]
async fn test_retrieval_prefers_matching_chunk() {
    for metric in [DistanceMetric::L2, DistanceMetric::Cosine] {
        let root = TempDir::new().unwrap();
        let pipeline = open_pipeline(&root, metric, 100).await;
        let outcome = pipeline.ingest(AI_TEXT.as_bytes().to_vec(), "ai.txt").await.unwrap();

        let results = pipeline
            .answer_context("rivers carry sediment to the sea", &[outcome.doc_id.clone()], 2)
            .await;

        assert_eq!(results.len(), 2, "{:?}", metric);
        assert!(results[0].text.contains("Rivers"), "{:?}: {:?}", metric, results[0]);
        assert!(results[0].distance <= results[1].distance);
    }
}

#[tokio::test]
async fn test_ingest_docx() {
    let root = TempDir::new().unwrap();
    let pipeline = open_pipeline(&root, DistanceMetric::L2, 1000).await;
    let bytes = docx_bytes(&["First paragraph here.", "Second paragraph follows."]);

    let outcome = pipeline.ingest(bytes.clone(), "Report.DOCX").await.unwrap();
    assert_eq!(outcome.doc_id, identify(&bytes));
    assert!(outcome.full_text.contains("First paragraph here."));
    assert!(outcome.full_text.contains("Second paragraph follows."));
    assert_eq!(outcome.chunks.len(), 1);
}

#[tokio::test]
async fn test_failures_create_no_collection() {
    let root = TempDir::new().unwrap();
    let pipeline = open_pipeline(&root, DistanceMetric::L2, 1000).await;

    let unsupported = pipeline.ingest(b"GIF89a".to_vec(), "cat.gif").await.unwrap_err();
    assert!(matches!(unsupported, Error::UnsupportedFormat(_)));

    let bad_pdf = pipeline.ingest(b"not a pdf at all".to_vec(), "broken.pdf").await.unwrap_err();
    assert!(matches!(bad_pdf, Error::Extraction { .. }));

    let bad_docx = pipeline.ingest(b"not a zip".to_vec(), "broken.docx").await.unwrap_err();
    assert!(matches!(bad_docx, Error::Extraction { .. }));

    assert!(pipeline.store().collections().is_empty());
    let files = std::fs::read_dir(root.path().join("collections")).unwrap().count();
    assert_eq!(files, 0);
}

#[tokio::test]
async fn test_empty_text_file_stores_empty_collection() {
    let root = TempDir::new().unwrap();
    let pipeline = open_pipeline(&root, DistanceMetric::L2, 1000).await;

    let outcome = pipeline.ingest(b"   \n\n ".to_vec(), "blank.txt").await.unwrap();
    assert!(outcome.chunks.is_empty());
    assert!(pipeline
        .answer_context("anything", &[outcome.doc_id], 5)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_concurrent_ingestion_of_different_documents() {
    let root = TempDir::new().unwrap();
    let pipeline = Arc::new(open_pipeline(&root, DistanceMetric::L2, 200).await);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                let text = format!("Document number {}. It talks about topic {}.", i, i * 7);
                pipeline.ingest(text.into_bytes(), &format!("doc{}.txt", i)).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(pipeline.store().collections().len(), 8);
}

#[tokio::test]
async fn test_collections_survive_restart() {
    let root = TempDir::new().unwrap();
    let doc_id = {
        let pipeline = open_pipeline(&root, DistanceMetric::L2, 100).await;
        pipeline.ingest(AI_TEXT.as_bytes().to_vec(), "ai.txt").await.unwrap().doc_id
    };

    let reopened = open_pipeline(&root, DistanceMetric::L2, 100).await;
    let results = reopened
        .answer_context("neural networks and deep learning", &[doc_id], 1)
        .await;
    assert_eq!(results.len(), 1);
    assert!(results[0].text.contains("Neural networks"));
}

#[tokio::test]
async fn test_retrieve_multi_takes_top_k_per_document() {
    let root = TempDir::new().unwrap();
    let pipeline = open_pipeline(&root, DistanceMetric::L2, 40).await;

    let doc_a = pipeline
        .ingest(
            b"Ships sail across the ocean. Sailors read the stars. Harbors shelter boats. Tides move with the moon."
                .to_vec(),
            "sea.txt",
        )
        .await
        .unwrap();
    let doc_b = pipeline
        .ingest(
            b"Farmers plant wheat in spring. Tractors plough the fields. Rain waters the crops. Barns store the harvest."
                .to_vec(),
            "farm.txt",
        )
        .await
        .unwrap();
    assert!(doc_a.chunks.len() >= 3 && doc_b.chunks.len() >= 3);

    let results = pipeline
        .answer_context(
            "boats on the ocean",
            &[doc_a.doc_id.clone(), doc_b.doc_id.clone()],
            3,
        )
        .await;

    assert_eq!(results.len(), 6);
    for result in &results[..3] {
        assert!(result.id.starts_with(&format!("{}_chunk_", doc_a.doc_id)), "{}", result.id);
    }
    for result in &results[3..] {
        assert!(result.id.starts_with(&format!("{}_chunk_", doc_b.doc_id)), "{}", result.id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_restore_is_never_observed_half_done() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let root = TempDir::new().unwrap();
    let store = Arc::new(
        ChunkStore::open(root.path(), Arc::new(HashingEmbedder::new(128)), DistanceMetric::L2)
            .await
            .unwrap(),
    );
    let doc_id = identify(b"shared document");
    let chunker = TextChunker::new(30);

    let set_x = chunker.chunk(
        "Alpha one is here. Alpha two is here. Alpha three is here.",
        &doc_id,
    );
    let set_y = chunker.chunk(
        "Beta one is here. Beta two is here. Beta three is here. Beta four is here. Beta five is here.",
        &doc_id,
    );
    assert_eq!(set_x.len(), 3);
    assert_eq!(set_y.len(), 5);

    store.store(&set_x, &doc_id).await.unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            let doc_id = doc_id.clone();
            tokio::spawn(async move {
                let mut reads = 0usize;
                while !done.load(Ordering::Acquire) || reads == 0 {
                    let results = store.retrieve("one two three four five", &doc_id, 10).await;
                    let alpha = results.iter().filter(|r| r.text.starts_with("Alpha")).count();
                    let beta = results.iter().filter(|r| r.text.starts_with("Beta")).count();
                    assert!(
                        (alpha == 3 && beta == 0) || (alpha == 0 && beta == 5),
                        "mixed or partial collection: {} alpha, {} beta",
                        alpha,
                        beta
                    );
                    reads += 1;
                    tokio::task::yield_now().await;
                }
                reads
            })
        })
        .collect();

    for round in 0..40 {
        let chunks = if round % 2 == 0 { &set_y } else { &set_x };
        store.store(chunks, &doc_id).await.unwrap();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        assert!(reader.await.unwrap() > 0);
    }
}
