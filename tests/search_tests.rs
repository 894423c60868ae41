//! Search ranking tests over a hand-built index

use lemmaseek::config::{
    Config, CrawlerConfig, IdentityConfig, MorphologyConfig, SearchConfig, SiteEntry,
    StorageConfig,
};
use lemmaseek::indexer::IndexBuilder;
use lemmaseek::lemma::LemmaExtractor;
use lemmaseek::morphology::{Language, StemmerMorphology};
use lemmaseek::search::UNTITLED;
use lemmaseek::storage::{SqliteStorage, Storage};
use lemmaseek::{Engine, LemmaseekError};
use std::collections::HashMap;
use std::sync::Arc;

const SITE_A: &str = "https://a.example.com";
const SITE_B: &str = "https://b.example.com";

fn config() -> Config {
    Config {
        crawler: CrawlerConfig {
            parallelism: 2,
            request_delay_ms: 0,
            request_timeout_secs: 5,
        },
        identity: IdentityConfig {
            user_agent: "LemmaseekTest/1.0".to_string(),
            referrer: None,
        },
        storage: StorageConfig {
            database_path: ":memory:".to_string(),
        },
        morphology: MorphologyConfig::default(),
        search: SearchConfig {
            snippet_words: 10,
            default_limit: 20,
        },
        sites: vec![
            SiteEntry {
                url: SITE_A.to_string(),
                name: "Site A".to_string(),
            },
            SiteEntry {
                url: SITE_B.to_string(),
                name: "Site B".to_string(),
            },
        ],
    }
}

fn extractor() -> LemmaExtractor {
    LemmaExtractor::new(
        Arc::new(StemmerMorphology::new(Language::English)),
        Language::English,
    )
}

/// Base form of a single word
fn form(word: &str) -> String {
    extractor().lemma_set(word).into_iter().next().unwrap()
}

struct Fixture {
    storage: Arc<SqliteStorage>,
    indexer: IndexBuilder,
    engine: Engine,
    site_a: i64,
    site_b: i64,
}

impl Fixture {
    fn new() -> Self {
        let storage = Arc::new(SqliteStorage::new_in_memory().unwrap());
        let site_a = storage.create_site(SITE_A, "Site A").unwrap();
        let site_b = storage.create_site(SITE_B, "Site B").unwrap();
        let indexer = IndexBuilder::new(storage.clone(), extractor());
        let engine = Engine::with_storage(config(), storage.clone()).unwrap();
        Self {
            storage,
            indexer,
            engine,
            site_a,
            site_b,
        }
    }

    /// Stores an HTML page and indexes its visible text
    fn page(&self, site_id: i64, path: &str, html: &str) -> i64 {
        let id = self
            .storage
            .insert_page(site_id, path, 200, html)
            .unwrap()
            .unwrap();
        let record = self.storage.get_page(id).unwrap();
        self.indexer.index_page(&record).unwrap();
        id
    }

    /// Stores a page and indexes explicit ranks for the base forms of `ranks` words
    fn ranked_page(&self, site_id: i64, path: &str, ranks: &[(&str, u32)]) -> i64 {
        let id = self
            .storage
            .insert_page(site_id, path, 200, "<html><body></body></html>")
            .unwrap()
            .unwrap();
        let counts: HashMap<String, u32> = ranks
            .iter()
            .map(|(word, rank)| (form(word), *rank))
            .collect();
        self.storage.index_page_lemmas(site_id, id, &counts).unwrap();
        id
    }
}

fn body(text: &str) -> String {
    format!("<html><body><p>{}</p></body></html>", text)
}

#[test]
fn test_blank_query_is_rejected() {
    let fixture = Fixture::new();
    for query in ["", "   ", "\t\n"] {
        assert!(matches!(
            fixture.engine.search(query, None, 0, None),
            Err(LemmaseekError::EmptyQuery)
        ));
    }
}

#[test]
fn test_service_words_only_yield_no_results() {
    let fixture = Fixture::new();
    fixture.page(fixture.site_a, "/", &body("the cat and the dog"));

    let response = fixture.engine.search("the and of", None, 0, None).unwrap();
    assert_eq!(response.count, 0);
    assert!(response.results.is_empty());
}

#[test]
fn test_every_query_lemma_must_match() {
    let fixture = Fixture::new();
    fixture.page(fixture.site_a, "/cats", &body("Cats sleep all day"));
    fixture.page(fixture.site_a, "/dogs", &body("Dogs bark at night"));

    // Both lemmas exist, but never on the same page
    let disjoint = fixture.engine.search("cat dog", None, 0, None).unwrap();
    assert_eq!(disjoint.count, 0);

    let unknown = fixture.engine.search("cat unicorn", None, 0, None).unwrap();
    assert_eq!(unknown.count, 0);

    let single = fixture.engine.search("cats", None, 0, None).unwrap();
    assert_eq!(single.count, 1);
    assert_eq!(single.results[0].uri, "/cats");
}

#[test]
fn test_top_result_has_relevance_one() {
    let fixture = Fixture::new();
    fixture.page(fixture.site_a, "/once", &body("A zebra crossing"));
    fixture.page(
        fixture.site_a,
        "/thrice",
        &body("Zebra stripes, zebra herds and a zebra foal"),
    );

    let response = fixture.engine.search("zebra", None, 0, None).unwrap();
    assert_eq!(response.count, 2);
    assert_eq!(response.results[0].uri, "/thrice");
    assert_eq!(response.results[0].relevance, 1.0);
    assert_eq!(response.results[1].uri, "/once");
    assert!((response.results[1].relevance - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_relevance_sums_ranks_of_all_query_lemmas() {
    let fixture = Fixture::new();
    fixture.ranked_page(fixture.site_a, "/p1", &[("river", 1), ("stone", 5)]);
    fixture.ranked_page(fixture.site_a, "/p2", &[("river", 4), ("stone", 4)]);
    fixture.ranked_page(fixture.site_a, "/p3", &[("river", 9)]);

    let response = fixture.engine.search("river stone", None, 0, None).unwrap();
    let uris: Vec<&str> = response.results.iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(uris, vec!["/p2", "/p1"]);
    assert_eq!(response.results[0].relevance, 1.0);
    assert!((response.results[1].relevance - 6.0 / 8.0).abs() < 1e-9);
}

#[test]
fn test_relevance_is_scale_invariant() {
    let base = Fixture::new();
    let scaled = Fixture::new();
    for (path, rank) in [("/a", 1), ("/b", 4), ("/c", 2)] {
        base.ranked_page(base.site_a, path, &[("river", rank)]);
        scaled.ranked_page(scaled.site_a, path, &[("river", rank * 10)]);
    }

    let summarize = |fixture: &Fixture| {
        fixture
            .engine
            .search("river", None, 0, None)
            .unwrap()
            .results
            .into_iter()
            .map(|r| (r.uri, r.relevance))
            .collect::<Vec<_>>()
    };

    let base_results = summarize(&base);
    assert_eq!(base_results, summarize(&scaled));
    assert_eq!(base_results[0], ("/b".to_string(), 1.0));
}

#[test]
fn test_site_filter() {
    let fixture = Fixture::new();
    fixture.page(fixture.site_a, "/", &body("Lighthouse keepers of the north"));
    fixture.page(fixture.site_b, "/", &body("A lighthouse on the southern cape"));

    let all = fixture.engine.search("lighthouse", None, 0, None).unwrap();
    assert_eq!(all.count, 2);

    let only_b = fixture
        .engine
        .search("lighthouse", Some("https://B.example.com/"), 0, None)
        .unwrap();
    assert_eq!(only_b.count, 1);
    assert_eq!(only_b.results[0].site, SITE_B);
    assert_eq!(only_b.results[0].site_name, "Site B");

    assert!(matches!(
        fixture
            .engine
            .search("lighthouse", Some("https://c.example.com"), 0, None),
        Err(LemmaseekError::SiteNotIndexed { .. })
    ));
}

#[test]
fn test_frequency_spans_sites_when_unfiltered() {
    let fixture = Fixture::new();
    fixture.page(fixture.site_a, "/1", &body("Orchard apples"));
    fixture.page(fixture.site_b, "/1", &body("Orchard pears"));
    fixture.page(fixture.site_b, "/2", &body("Orchard plums and apples"));

    let response = fixture.engine.search("apple orchard", None, 0, None).unwrap();
    assert_eq!(response.count, 2);
    let sites: Vec<&str> = response.results.iter().map(|r| r.site.as_str()).collect();
    assert!(sites.contains(&SITE_A));
    assert!(sites.contains(&SITE_B));
}

#[test]
fn test_title_and_snippet() {
    let fixture = Fixture::new();
    fixture.page(
        fixture.site_a,
        "/guide",
        "<html><head><title>Field Guide</title></head><body>\
         <p>one two three four five six seven eight Walrus colonies gather on ice</p>\
         <script>var walrus = 1;</script></body></html>",
    );
    fixture.page(fixture.site_a, "/plain", &body("A lonely walrus"));

    let response = fixture.engine.search("walrus", None, 0, None).unwrap();
    assert_eq!(response.count, 2);

    let guide = response.results.iter().find(|r| r.uri == "/guide").unwrap();
    assert_eq!(guide.title, "Field Guide");
    assert_eq!(
        guide.snippet,
        "four five six seven eight <b>Walrus</b> colonies gather on ice"
    );

    let plain = response.results.iter().find(|r| r.uri == "/plain").unwrap();
    assert_eq!(plain.title, UNTITLED);
    assert!(plain.snippet.contains("<b>walrus</b>"));
}

#[test]
fn test_pagination_reports_total_count() {
    let fixture = Fixture::new();
    for i in 0..5 {
        fixture.page(fixture.site_a, &format!("/p{}", i), &body("Comet tails"));
    }

    let response = fixture.engine.search("comet", None, 2, Some(2)).unwrap();
    assert_eq!(response.count, 5);
    let uris: Vec<&str> = response.results.iter().map(|r| r.uri.as_str()).collect();
    // Equal relevance falls back to page order
    assert_eq!(uris, vec!["/p2", "/p3"]);

    let past_end = fixture.engine.search("comet", None, 10, None).unwrap();
    assert_eq!(past_end.count, 5);
    assert!(past_end.results.is_empty());
}

#[test]
fn test_statistics_after_indexing() {
    let fixture = Fixture::new();
    fixture.page(fixture.site_a, "/", &body("Glacier"));
    fixture.page(fixture.site_b, "/", &body("Glacier valley"));

    let stats = fixture.engine.statistics().unwrap();
    assert_eq!(stats.total.sites, 2);
    assert_eq!(stats.total.pages, 2);
    assert_eq!(stats.total.lemmas, 3);
    assert!(!stats.total.indexing);
    assert_eq!(stats.detailed[1].lemmas, 2);
}
