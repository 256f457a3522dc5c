//! Conversation Engine Integration Tests
//!
//! Cascade order, language selection and reply selection over small corpora.

use murmur::corpus::{Corpus, LanguageDataset, ResponseGroup};
use murmur::nlp::{BasicExtractor, FeatureExtractor, Message, Neighbor, Thesaurus};
use murmur::{BotConfig, CategoryResolver, ConversationEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn group(entries: &[&str]) -> ResponseGroup {
    ResponseGroup::from_entries(entries.iter().map(|e| e.to_string()).collect()).unwrap()
}

fn engine_with(dataset: LanguageDataset) -> ConversationEngine {
    let mut corpus = Corpus::new();
    corpus.insert("english", dataset);
    ConversationEngine::new(
        Arc::new(corpus),
        Arc::new(BotConfig::default()),
        Arc::new(BasicExtractor::default()),
    )
}

#[test]
fn test_hello_scenario() {
    let mut english = LanguageDataset::new();
    english.insert("greetings", vec![group(&["hello", "hi there!", "hey!"])]);
    let engine = engine_with(english);

    let extractor = BasicExtractor::default();
    let message = extractor.extract("Hello there friend", "alice");
    assert_eq!(message.language.as_deref(), Some("en"));
    assert!(message.tokens.len() > 2);

    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let reply = engine.process(&message, &mut rng).expect("a greeting reply");
        assert!(reply == "hi there!" || reply == "hey!", "unexpected reply {}", reply);
    }
}

#[test]
fn test_lemma_step_short_circuits() {
    let mut english = LanguageDataset::new();
    english.insert("weather", vec![group(&["rain", "from lemma"])]);
    english.insert("conversations", vec![group(&["rain", "from conversations"])]);
    english.insert("aardvark", vec![group(&["rain", "from scan"])]);
    let engine = engine_with(english);

    let message = Message::new("rain", "alice")
        .with_language("en")
        .with_tokens(&["rain"])
        .with_lemmas(&["weather"]);

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        assert_eq!(engine.process(&message, &mut rng), Some("from lemma".to_string()));
    }
}

#[test]
fn test_neighbor_step_before_fixed_categories() {
    let mut english = LanguageDataset::new();
    english.insert("humor", vec![group(&["joke", "from neighbor"])]);
    english.insert("greetings", vec![group(&["joke", "from greetings"])]);
    let engine = engine_with(english);

    let message = Message::new("joke", "alice")
        .with_language("en")
        .with_tokens(&["joke"])
        .with_neighbors("joke", vec![Neighbor::new("humor", 0.2)]);

    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(engine.process(&message, &mut rng), Some("from neighbor".to_string()));
}

#[test]
fn test_exhaustive_scan_reaches_any_category() {
    let mut english = LanguageDataset::new();
    english.insert("science", vec![group(&["photosynthesis", "Plants eat light"])]);
    let engine = engine_with(english);

    let message = Message::new("what is photosynthesis", "alice")
        .with_language("en")
        .with_tokens(&["what", "is", "photosynthesis"])
        .with_symbol_text("photosynthesis");

    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(engine.process(&message, &mut rng), Some("Plants eat light".to_string()));
}

#[test]
fn test_scan_finishes_each_category_before_the_next() {
    // "a" only matches fuzzily, "b" contains the text outright
    let mut english = LanguageDataset::new();
    english.insert("a", vec![group(&["hello", "from fuzzy"])]);
    english.insert("b", vec![group(&["hel", "from substring"])]);
    let engine = engine_with(english);

    let message = Message::new("helo", "alice")
        .with_language("en")
        .with_tokens(&["helo"])
        .with_lemmas(&["zzz"]);

    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        assert_eq!(engine.process(&message, &mut rng), Some("from fuzzy".to_string()));
    }
}

#[test]
fn test_no_reply_when_nothing_matches() {
    let mut english = LanguageDataset::new();
    english.insert("greetings", vec![group(&["hello", "hi"])]);
    let engine = engine_with(english);

    let message = Message::new("zzz", "alice").with_language("en").with_tokens(&["zzz"]);
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(engine.process(&message, &mut rng), None);
}

#[test]
fn test_empty_corpus_never_replies() {
    let engine = ConversationEngine::new(
        Arc::new(Corpus::new()),
        Arc::new(BotConfig::default()),
        Arc::new(BasicExtractor::default()),
    );
    let message = Message::new("hello", "alice").with_language("en").with_tokens(&["hello"]);
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(engine.process(&message, &mut rng), None);
}

#[test]
fn test_language_code_selects_dataset() {
    let mut english = LanguageDataset::new();
    english.insert("greetings", vec![group(&["bonjour", "english reply"])]);
    let mut french = LanguageDataset::new();
    french.insert("greetings", vec![group(&["bonjour", "salut !"])]);

    let mut corpus = Corpus::new();
    corpus.insert("english", english);
    corpus.insert("french", french);
    let engine = ConversationEngine::new(
        Arc::new(corpus),
        Arc::new(BotConfig::default()),
        Arc::new(BasicExtractor::default()),
    );

    let message = Message::new("bonjour", "alice").with_language("fr").with_tokens(&["bonjour"]);
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(engine.process(&message, &mut rng), Some("salut !".to_string()));
}

#[test]
fn test_resolver_without_key_or_neighbors() {
    let mut english = LanguageDataset::new();
    english.insert("humor", vec![group(&["joke", "ha"])]);

    let thesaurus = Thesaurus::new().with("music", "song", 0.1).with("music", "band", 0.3);
    let resolver = CategoryResolver::new(Arc::new(BasicExtractor::new(thesaurus, "en")));
    for key in ["music", "song", "weather"] {
        assert!(resolver.resolve(&english, key).is_none(), "resolved {}", key);
    }
}
