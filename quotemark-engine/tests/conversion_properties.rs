//! Document-level conversion and detection properties

use proptest::prelude::*;
use quotemark_engine::{
    standard_quote_convention, standard_quote_conventions, Document, QuotationMarkUpdater,
    QuoteConvention, QuoteConventionDetector, UpdateStrategy,
};

/// Four-level conventions whose marks never collide with each other
const ROUND_TRIP_PAIRS: [(&str, &str); 4] = [
    ("standard_english", "standard_french"),
    ("standard_english", "typewriter_french"),
    ("british_english", "central_european"),
    ("standard_french", "eastern_european"),
];

/// `He said O1w1 O2w2 ... Cn w(n-1) ... C1 end.` nested to `depth`
fn nested_sample(convention: &QuoteConvention, depth: usize, words: &[String]) -> String {
    let mut text = String::from("He said ");
    for d in 1..=depth {
        text.push_str(convention.opening_mark_at_depth(d).unwrap());
        text.push_str(&words[d - 1]);
        if d < depth {
            text.push(' ');
        }
    }
    for d in (1..=depth).rev() {
        text.push_str(convention.closing_mark_at_depth(d).unwrap());
        text.push(' ');
        if d > 1 {
            text.push_str(&words[d - 2]);
        } else {
            text.push_str("end.");
        }
    }
    text
}

fn single_verse(text: &str) -> Document {
    let mut builder = Document::builder();
    builder.chapter().verse();
    builder.text(text);
    builder.build()
}

fn verse_text(document: &Document) -> String {
    document.chapters()[0]
        .verses()
        .iter()
        .flat_map(|verse| verse.segments())
        .map(|&id| document.text(id))
        .collect()
}

fn convert(text: &str, source: &str, target: &str) -> String {
    let updater = QuotationMarkUpdater::builder()
        .source(source)
        .target(target)
        .build()
        .unwrap();
    let mut document = single_verse(text);
    let reports = updater.update_document(&mut document).unwrap();
    assert!(reports.iter().all(|r| r.strategy == UpdateStrategy::ApplyFull));
    verse_text(&document)
}

fn default_words() -> Vec<String> {
    ["one", "two", "three", "four"].iter().map(|w| w.to_string()).collect()
}

#[test]
fn test_round_trip_restores_original_text() {
    let words = default_words();
    for (a, b) in ROUND_TRIP_PAIRS {
        let convention_a = standard_quote_convention(a).unwrap();
        let convention_b = standard_quote_convention(b).unwrap();
        let original = nested_sample(&convention_a, 4, &words);

        let converted = convert(&original, a, b);
        assert_eq!(converted, nested_sample(&convention_b, 4, &words), "{a} -> {b}");
        assert_eq!(convert(&converted, b, a), original, "{b} -> {a}");
    }
}

#[test]
fn test_same_convention_update_is_idempotent() {
    let words = default_words();
    for convention in standard_quote_conventions().unwrap().conventions() {
        let depth = convention.num_levels().min(4);
        let text = nested_sample(convention, depth, &words);
        assert_eq!(
            convert(&text, convention.name(), convention.name()),
            text,
            "{}",
            convention.name()
        );
    }
}

#[test]
fn test_chapters_get_independent_strategies() {
    let mut builder = Document::builder();
    builder.chapter().verse();
    builder.text("He said, “Go, ‘now’.”");
    builder.chapter().verse();
    builder.text("He said, “Go, ‘now.”");
    let mut document = builder.build();

    let updater = QuotationMarkUpdater::builder()
        .source("standard_english")
        .target("standard_french")
        .build()
        .unwrap();
    let reports = updater.update_document(&mut document).unwrap();

    let strategies: Vec<_> = reports.iter().map(|r| r.strategy).collect();
    assert_eq!(
        strategies,
        vec![UpdateStrategy::ApplyFull, UpdateStrategy::ApplyFallback]
    );
    let first = document.chapters()[0].verses()[0].segments()[0];
    let second = document.chapters()[1].verses()[0].segments()[0];
    assert_eq!(document.text(first), "He said, «Go, ‹now›.»");
    assert_eq!(document.text(second), "He said, «Go, «now.»");
}

#[test]
fn test_missing_strategy_uses_default() {
    let mut builder = Document::builder();
    builder.chapter().verse();
    builder.text("“One”");
    builder.chapter().verse();
    builder.text("“Two”");
    let mut document = builder.build();

    let updater = QuotationMarkUpdater::builder()
        .source("standard_english")
        .target("typewriter_french")
        .chapter_strategies(vec![UpdateStrategy::ApplyFull])
        .default_strategy(UpdateStrategy::Skip)
        .build()
        .unwrap();
    let reports = updater.update_document(&mut document).unwrap();

    assert_eq!(reports[1].strategy, UpdateStrategy::Skip);
    let first = document.chapters()[0].verses()[0].segments()[0];
    let second = document.chapters()[1].verses()[0].segments()[0];
    assert_eq!(document.text(first), "<<One>>");
    assert_eq!(document.text(second), "“Two”");
}

#[test]
fn test_detection_of_nested_samples() {
    let words = default_words();
    let detector = QuoteConventionDetector::with_standard_conventions().unwrap();
    for name in ["standard_english", "british_english", "standard_french", "typewriter_french"] {
        let convention = standard_quote_convention(name).unwrap();
        let document = single_verse(&nested_sample(&convention, 2, &words));
        let analysis = detector.detect(&document).unwrap();
        assert_eq!(analysis.convention_name(), name);
        assert!((analysis.similarity - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_detect_then_convert() {
    let text = "He said to the woman, “Has God really said, ‘You shall not eat of any tree of the garden’?”";
    let detector = QuoteConventionDetector::with_standard_conventions().unwrap();
    let analysis = detector.detect(&single_verse(text)).unwrap();

    let updater = QuotationMarkUpdater::builder()
        .source_convention(analysis.convention)
        .target("typewriter_french")
        .build()
        .unwrap();
    let mut document = single_verse(text);
    updater.update_document(&mut document).unwrap();
    assert_eq!(
        verse_text(&document),
        "He said to the woman, <<Has God really said, <You shall not eat of any tree of the garden>?>>"
    );
}

proptest! {
    #[test]
    fn test_round_trip_for_random_words(
        pair in 0usize..ROUND_TRIP_PAIRS.len(),
        depth in 1usize..=4,
        words in prop::collection::vec("[a-r]{1,8}", 4),
    ) {
        let (a, b) = ROUND_TRIP_PAIRS[pair];
        let convention_a = standard_quote_convention(a).unwrap();
        let original = nested_sample(&convention_a, depth, &words);
        let converted = convert(&original, a, b);
        prop_assert_eq!(convert(&converted, b, a), original);
    }
}
