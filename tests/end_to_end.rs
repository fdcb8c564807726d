// tests/end_to_end.rs
// Full-pipeline behavior over a realistic directory, driven through the
// public API only.

use matcher_lib::config::MatcherConfig;
use matcher_lib::embedder::HashedNgramEmbedder;
use matcher_lib::matching::pipeline::MatchPipeline;
use matcher_lib::matching::tables::{MisspellingTable, TransliterationTable};
use matcher_lib::models::core::User;
use matcher_lib::models::matching::MatchMethodType;

fn directory() -> Vec<User> {
    [
        ("u001", "Emma Brown"),
        ("u002", "John Smith"),
        ("u003", "Anna Lee"),
        ("u004", "Jack Cooper"),
        ("u005", "James Rodriguez"),
        ("u006", "Victoria Fisher"),
        ("u007", "Alex Kim"),
        ("u008", "Alex Kim"),
        ("u009", "Liam O'Brien"),
        ("u010", "José García"),
        ("u011", "Matthew Brooks"),
        ("u012", "Taylor Gonzalez"),
        ("u013", "Yang Chen"),
    ]
    .into_iter()
    .map(|(id, name)| User {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

async fn pipeline() -> MatchPipeline<HashedNgramEmbedder> {
    let mut pipeline = MatchPipeline::new(
        MatcherConfig::default(),
        HashedNgramEmbedder::default(),
        directory(),
        TransliterationTable::with_defaults(),
        MisspellingTable::with_defaults(),
    )
    .unwrap();
    pipeline.precompute_embeddings().await.unwrap();
    pipeline
}

#[tokio::test]
async fn exact_name_after_from_scores_hundred() {
    let pipeline = pipeline().await;
    let matches = pipeline
        .match_description("Payment from Emma Brown for Deel")
        .await
        .unwrap();
    assert_eq!(matches[0].id, "u001");
    assert_eq!(matches[0].match_metric, 100.0);
    assert_eq!(matches[0].method, MatchMethodType::Fuzzy);
}

#[tokio::test]
async fn scores_stay_in_range_with_two_decimals() {
    let pipeline = pipeline().await;
    let descriptions = [
        "Payment from Emma Brown for Deel",
        "Transfer from Jose Garcia",
        "Received from Anna Lee, cc ref: John Smith for Deel",
        "smith22 for Deel",
    ];
    for description in descriptions {
        for m in pipeline.match_description(description).await.unwrap() {
            assert!(m.match_metric >= 0.0 && m.match_metric <= 100.0);
            let scaled = m.match_metric * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }
}

#[tokio::test]
async fn reversed_token_order_still_matches() {
    let pipeline = pipeline().await;
    let matches = pipeline
        .match_description("Payment from Fisher Victoria for Deel")
        .await
        .unwrap();
    assert_eq!(matches[0].id, "u006");
    assert!(matches[0].match_metric >= 70.0);
}

#[tokio::test]
async fn diacritics_do_not_block_matching() {
    let pipeline = pipeline().await;
    let matches = pipeline
        .match_description("Transfer from Jose Garcia for Deel")
        .await
        .unwrap();
    assert_eq!(matches[0].id, "u010");
}

#[tokio::test]
async fn glued_name_is_deglued_against_directory_tokens() {
    let pipeline = pipeline().await;
    let matches = pipeline
        .match_description("matthewbrooks for Deel")
        .await
        .unwrap();
    assert_eq!(matches[0].id, "u011");
}

#[tokio::test]
async fn known_misspelling_is_corrected() {
    let pipeline = pipeline().await;
    let matches = pipeline
        .match_description("Payment from Talor Gonzalez")
        .await
        .unwrap();
    assert_eq!(matches[0].id, "u012");
}

#[tokio::test]
async fn duplicate_directory_names_return_both_users() {
    let pipeline = pipeline().await;
    let matches = pipeline
        .match_description("Payment from Alex Kim for Deel")
        .await
        .unwrap();
    let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["u007", "u008"]);
    assert_eq!(matches[0].match_metric, matches[1].match_metric);
}

#[tokio::test]
async fn results_never_mix_methods() {
    let pipeline = pipeline().await;
    let descriptions = [
        "Payment from Emma Brown for Deel",
        "杨陈 for Deel",
        "Received from Anna Lee, cc ref: John Smith for Deel",
    ];
    for description in descriptions {
        let matches = pipeline.match_description(description).await.unwrap();
        if let Some(first) = matches.first() {
            assert!(matches.iter().all(|m| m.method == first.method));
        }
    }
}

#[tokio::test]
async fn unmatchable_text_yields_empty_not_error() {
    let pipeline = pipeline().await;
    assert!(pipeline
        .match_description("qwe asd zxc for deel")
        .await
        .unwrap()
        .is_empty());
    assert!(pipeline.match_description("???!!!").await.unwrap().is_empty());
}
