use super::*;
use crate::ArchiveError;
use std::cell::Cell;

/// Embeds text as (length, count of 'a', 1.0) and counts calls
#[derive(Default)]
struct CountingEmbedder {
    query_calls: Cell<usize>,
}

impl CountingEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        vec![
            text.chars().count() as f32,
            text.chars().filter(|c| *c == 'a').count() as f32,
            1.0,
        ]
    }
}

impl Embedder for CountingEmbedder {
    fn embed_query(&self, text: &str) -> crate::Result<Vec<f32>> {
        self.query_calls.set(self.query_calls.get() + 1);
        Ok(Self::vector(text))
    }

    fn embed_documents(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

struct ShortEmbedder;

impl Embedder for ShortEmbedder {
    fn embed_query(&self, _text: &str) -> crate::Result<Vec<f32>> {
        Ok(vec![0.0])
    }

    fn embed_documents(&self, _texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        Ok(vec![vec![0.0]])
    }
}

fn chunk(text: &str, index: usize) -> Chunk {
    Chunk {
        text: text.to_string(),
        index,
        source: None,
        title: None,
    }
}

fn store_with(vectors: &[(&str, Vec<f32>)]) -> VectorStore {
    let mut store = VectorStore::new();
    for (i, (text, vector)) in vectors.iter().enumerate() {
        store.add(&chunk(text, i), vector).expect("add should succeed");
    }
    store
}

#[test]
fn empty_store_cannot_be_searched() {
    let store = VectorStore::new();

    assert!(store.is_empty());
    assert_eq!(store.dimension(), None);
    assert_eq!(store.search_by_vector(&[1.0], 3), Err(IndexError::Empty));
}

#[test]
fn dimension_is_fixed_by_first_vector() {
    let mut store = store_with(&[("a", vec![1.0, 2.0])]);

    assert_eq!(store.dimension(), Some(2));
    assert_eq!(
        store.add(&chunk("b", 1), &[1.0, 2.0, 3.0]),
        Err(IndexError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn zero_length_vectors_are_rejected() {
    let mut store = VectorStore::new();

    assert_eq!(store.add(&chunk("a", 0), &[]), Err(IndexError::ZeroDimension));
    assert!(store.is_empty());
}

#[test]
fn nearest_records_come_first() {
    let store = store_with(&[
        ("far", vec![10.0, 10.0]),
        ("near", vec![1.0, 1.0]),
        ("middle", vec![3.0, 4.0]),
    ]);

    let results = store.search_by_vector(&[0.0, 0.0], 3).expect("search");

    let texts: Vec<&str> = results.iter().map(|r| r.record.text.as_str()).collect();
    assert_eq!(texts, vec!["near", "middle", "far"]);
    assert!((results[1].distance - 5.0).abs() < 1e-6);
    assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[test]
fn result_count_is_min_of_k_and_len() {
    let store = store_with(&[("a", vec![0.0]), ("b", vec![1.0]), ("c", vec![2.0])]);

    assert_eq!(store.search_by_vector(&[0.0], 2).expect("search").len(), 2);
    assert_eq!(store.search_by_vector(&[0.0], 10).expect("search").len(), 3);
    assert!(store.search_by_vector(&[0.0], 0).expect("search").is_empty());
}

#[test]
fn ties_keep_insertion_order() {
    let store = store_with(&[
        ("first", vec![1.0, 0.0]),
        ("second", vec![0.0, 1.0]),
        ("third", vec![-1.0, 0.0]),
    ]);

    let results = store.search_by_vector(&[0.0, 0.0], 3).expect("search");

    let texts: Vec<&str> = results.iter().map(|r| r.record.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[test]
fn query_dimension_must_match() {
    let store = store_with(&[("a", vec![1.0, 2.0])]);

    assert_eq!(
        store.search_by_vector(&[1.0], 1),
        Err(IndexError::DimensionMismatch {
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn records_get_unique_ids() {
    let store = store_with(&[("a", vec![1.0]), ("b", vec![2.0])]);

    let ids: Vec<Uuid> = store.records().iter().map(|r| r.id).collect();
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn from_chunks_embeds_every_chunk() {
    let chunks = vec![
        Chunk {
            text: "banana".to_string(),
            index: 0,
            source: Some("https://example.com/fruit".to_string()),
            title: Some("Fruit".to_string()),
        },
        chunk("kiwi", 1),
        chunk("apple pie", 2),
    ];

    let store = VectorStore::from_chunks(&chunks, &CountingEmbedder::default())
        .expect("index should build");

    assert_eq!(store.len(), 3);
    assert_eq!(store.dimension(), Some(3));
    assert_eq!(
        store.records()[0].source.as_deref(),
        Some("https://example.com/fruit")
    );
    assert_eq!(store.records()[0].title.as_deref(), Some("Fruit"));
    assert_eq!(store.records()[2].chunk_index, 2);
}

#[test]
fn from_chunks_requires_chunks() {
    let err = VectorStore::from_chunks(&[], &CountingEmbedder::default())
        .expect_err("empty input should fail");

    assert!(matches!(err, ArchiveError::Index(IndexError::Empty)));
}

#[test]
fn from_chunks_detects_count_mismatch() {
    let chunks = vec![chunk("one", 0), chunk("two", 1)];

    let err = VectorStore::from_chunks(&chunks, &ShortEmbedder).expect_err("should fail");

    assert!(matches!(
        err,
        ArchiveError::Index(IndexError::CountMismatch {
            texts: 2,
            vectors: 1
        })
    ));
}

#[test]
fn similarity_search_embeds_the_query() {
    let chunks = vec![chunk("aaaa", 0), chunk("bb", 1), chunk("aaaaaaaaaa", 2)];
    let embedder = CountingEmbedder::default();
    let store = VectorStore::from_chunks(&chunks, &embedder).expect("index should build");

    let results = store
        .similarity_search("aaa", &embedder, 2)
        .expect("search should succeed");

    assert_eq!(embedder.query_calls.get(), 1);
    assert_eq!(results[0].record.text, "aaaa");
    assert_eq!(results[1].record.text, "bb");
}

#[test]
fn similarity_search_on_empty_store_skips_embedding() {
    let embedder = CountingEmbedder::default();
    let store = VectorStore::new();

    let err = store
        .similarity_search("anything", &embedder, 3)
        .expect_err("empty store should fail");

    assert!(matches!(err, ArchiveError::Index(IndexError::Empty)));
    assert_eq!(embedder.query_calls.get(), 0);
}
