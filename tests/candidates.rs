// tests/candidates.rs

//! Candidate aggregation and ranking across feed sources.

mod common;

use common::*;
use feedsolver::arch::{Cpu, Os};
use feedsolver::model::Element;
use feedsolver::paths;
use feedsolver::version::Constraint;
use feedsolver::{
    Architecture, CandidateProvider, Error, ExternalImplementation, FeedPreferences,
    FeedReference, InterfacePreferences, Requirements, SelectionCandidate, SourceKind, Stability,
};

fn summary(candidates: &[SelectionCandidate]) -> Vec<(String, String, String)> {
    candidates
        .iter()
        .map(|c| {
            (
                c.feed.to_string(),
                c.implementation.id.clone(),
                c.implementation.version.to_string(),
            )
        })
        .collect()
}

/// Main feed without sub-feed references or package placeholders.
fn plain_test_feed() -> feedsolver::Feed {
    let mut main = test_feed();
    main.feeds.clear();
    main.elements
        .retain(|e| matches!(e, Element::Implementation(_)));
    main
}

#[test]
fn test_sub_feed_with_higher_version_ranks_first() {
    let fixture = Fixture::new();
    let main = test_feed();
    fixture.add_feed(main);
    fixture.add_feed(feed(SUB1, vec![implementation("id1", "2.0")]));

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();

    assert_eq!(
        summary(&candidates),
        vec![
            (SUB1.to_string(), "id1".to_string(), "2.0".to_string()),
            (TEST1.to_string(), "id1".to_string(), "1.0".to_string()),
        ]
    );
    assert_eq!(candidates[0].source, SourceKind::SubFeed);
    assert!(candidates.iter().all(|c| c.is_suitable()));
    assert_eq!(candidates[0].preferences, FeedPreferences::default());
}

#[test]
fn test_incompatible_sub_feed_is_skipped() {
    let fixture = Fixture::new();
    let mut main = plain_test_feed();
    let mut reference = FeedReference::new(uri(SUB1));
    reference.arch = Architecture::new(Os::Windows, Cpu::X86_64);
    main.feeds.push(reference);
    fixture.add_feed(main);
    fixture.add_feed(feed(SUB1, vec![implementation("id1", "2.0")]));

    let ctx = fixture.context();
    let reqs = Requirements::new(uri(TEST1))
        .with_architecture(Architecture::new(Os::Linux, Cpu::X86_64));
    let candidates = CandidateProvider::new(&ctx).get_sorted_candidates(&reqs).unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].feed, uri(TEST1));
}

#[test]
fn test_unreachable_sub_feed_is_not_fatal() {
    let fixture = Fixture::new();
    let mut main = plain_test_feed();
    main.feeds.push(FeedReference::new(uri(SUB2)));
    fixture.add_feed(main);

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();
    assert_eq!(summary(&candidates).len(), 1);
}

#[test]
fn test_missing_main_feed_is_fatal() {
    let fixture = Fixture::new();
    let ctx = fixture.context();
    let err = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap_err();
    assert!(matches!(err, Error::FeedUnavailable { .. }));
}

#[test]
fn test_interface_preferences_add_feed() {
    let fixture = Fixture::new();
    fixture.add_feed(plain_test_feed());
    fixture.add_feed(feed(SUB1, vec![implementation("id1", "2.0")]));
    fixture
        .preferences()
        .save_interface_preferences(
            &uri(TEST1),
            &InterfacePreferences {
                feeds: vec![FeedReference::new(uri(SUB1))],
                ..Default::default()
            },
        )
        .unwrap();

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();

    assert_eq!(
        summary(&candidates),
        vec![
            (SUB1.to_string(), "id1".to_string(), "2.0".to_string()),
            (TEST1.to_string(), "id1".to_string(), "1.0".to_string()),
        ]
    );
    assert_eq!(candidates[0].source, SourceKind::Preference);
}

#[test]
fn test_native_feed() {
    let fixture = Fixture::new();
    fixture.add_feed(plain_test_feed());

    let native_path = paths::native_feed_path(&fixture.data_dir(), &uri(TEST1));
    let local_uri = fixture.write_feed(&native_path, &feed(SUB1, vec![implementation("id1", "2.0")]));

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();

    assert_eq!(
        summary(&candidates),
        vec![
            (local_uri.to_string(), "id1".to_string(), "2.0".to_string()),
            (TEST1.to_string(), "id1".to_string(), "1.0".to_string()),
        ]
    );
    assert_eq!(candidates[0].source, SourceKind::NativeOverride);
}

#[test]
fn test_native_feed_wins_at_equal_version() {
    let fixture = Fixture::new();
    fixture.add_feed(plain_test_feed());

    let native_path = paths::native_feed_path(&fixture.data_dir(), &uri(TEST1));
    let local_uri = fixture.write_feed(&native_path, &feed(SUB1, vec![implementation("local", "1.0")]));

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();

    assert_eq!(candidates[0].feed, local_uri);
    assert_eq!(candidates[1].feed, uri(TEST1));
}

#[test]
fn test_network_higher_version_beats_native_override() {
    let fixture = Fixture::new();
    fixture.add_feed(feed(TEST1, vec![implementation("id1", "3.0")]));

    let native_path = paths::native_feed_path(&fixture.data_dir(), &uri(TEST1));
    fixture.write_feed(&native_path, &feed(SUB1, vec![implementation("local", "2.0")]));

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();
    assert_eq!(candidates[0].feed, uri(TEST1));
}

#[test]
fn test_site_packages() {
    let fixture = Fixture::new();
    let mut main = test_feed();
    main.feeds.clear();
    fixture.add_feed(main);

    let vendor_dir = paths::site_packages_dir(&fixture.data_dir(), &uri(TEST1)).join("xyz");
    let local_uri = fixture.write_feed(
        &paths::site_package_feed_path(&vendor_dir),
        &feed(SUB1, vec![implementation("id1", "2.0")]),
    );

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();

    assert!(local_uri
        .as_str()
        .contains("site-packages/http/example.com/test1.json/xyz/feedsolver/feed.json"));
    assert_eq!(
        summary(&candidates),
        vec![
            (local_uri.to_string(), "id1".to_string(), "2.0".to_string()),
            (TEST1.to_string(), "id1".to_string(), "1.0".to_string()),
        ]
    );
    assert_eq!(candidates[0].source, SourceKind::SitePackage);
    assert_eq!(fixture.packages.query_count(), 1);
}

#[test]
fn test_package_manager() {
    let fixture = Fixture::new();
    let mut main = test_feed();
    main.feeds.clear();
    fixture.add_feed(main);

    let mut native = ExternalImplementation::new("RPM", "firefox", v("1.0"));
    native.languages = vec!["en-US".to_string()];
    fixture.packages.add("firefox", native.clone());

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();

    let distribution = format!("distribution:{}", TEST1);
    assert_eq!(
        summary(&candidates),
        vec![
            (distribution, native.id(), "1.0".to_string()),
            (TEST1.to_string(), "id1".to_string(), "1.0".to_string()),
        ]
    );
    assert_eq!(candidates[0].source, SourceKind::Distribution);
    assert_eq!(candidates[0].effective_stability, Stability::Packaged);
    assert!(candidates[0].implementation.is_external());
}

#[test]
fn test_package_manager_lower_version_ranks_below() {
    let fixture = Fixture::new();
    let mut main = test_feed();
    main.feeds.clear();
    fixture.add_feed(main);
    fixture
        .packages
        .add("firefox", ExternalImplementation::new("RPM", "firefox", v("0.9")));

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();
    assert_eq!(candidates[0].feed, uri(TEST1));
    assert!(candidates[1].feed.is_distribution());
}

#[test]
fn test_unsuitable_candidates_are_retained() {
    let fixture = Fixture::new();
    fixture.add_feed(feed(
        TEST1,
        vec![implementation("old", "1.0"), implementation("new", "2.0")],
    ));

    let ctx = fixture.context();
    let reqs = Requirements::new(uri(TEST1)).with_constraint(Constraint::new(None, Some(v("2.0"))));
    let candidates = CandidateProvider::new(&ctx).get_sorted_candidates(&reqs).unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].implementation.id, "new");
    assert!(!candidates[0].is_suitable());
    assert!(candidates[0].rejection_reason().unwrap().contains("outside"));
    assert!(candidates[1].is_suitable());
}

#[test]
fn test_user_stability_override() {
    let fixture = Fixture::new();
    fixture.add_feed(feed(TEST1, vec![implementation("id1", "1.0")]));
    let mut prefs = FeedPreferences::default();
    prefs.set_user_stability("id1", Some(Stability::Buggy));
    fixture.preferences().save_for(&uri(TEST1), &prefs).unwrap();

    let ctx = fixture.context();
    let candidates = CandidateProvider::new(&ctx)
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();
    assert_eq!(candidates[0].effective_stability, Stability::Buggy);
    assert!(!candidates[0].is_suitable());
}

#[test]
fn test_ordering_is_deterministic() {
    let fixture = Fixture::new();
    fixture.add_feed(test_feed());
    fixture.add_feed(feed(
        SUB1,
        vec![
            implementation("b", "1.0"),
            implementation("a", "1.0"),
            implementation("c", "1.0-pre1"),
        ],
    ));
    fixture
        .packages
        .add("firefox", ExternalImplementation::new("Debian", "firefox", v("1.0")));

    let ctx = fixture.context();
    let provider = CandidateProvider::new(&ctx);
    let reqs = Requirements::new(uri(TEST1));
    let first = provider.get_sorted_candidates(&reqs).unwrap();
    let second = provider.get_sorted_candidates(&reqs).unwrap();
    assert_eq!(first, second);

    let ids: Vec<&str> = first.iter().map(|c| c.implementation.id.as_str()).collect();
    // Version, then stability, then feed and ID
    assert_eq!(ids, vec!["package:debian:firefox:1.0:*", "a", "b", "id1", "c"]);
}

#[test]
fn test_lookup_original_implementation() {
    let fixture = Fixture::new();
    let mut main = test_feed();
    main.feeds.clear();
    let main = fixture.add_feed(main);

    let ctx = fixture.context();
    let provider = CandidateProvider::new(&ctx);
    let candidates = provider
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();
    assert_eq!(candidates.len(), 1);
    let selection = candidates[0].to_selection(&candidates);

    let original = provider.lookup_original_implementation(&selection).unwrap();
    assert_eq!(&original, main.find_implementation("id1").unwrap());
}

#[test]
fn test_lookup_distribution_implementation() {
    let fixture = Fixture::new();
    let mut main = test_feed();
    main.feeds.clear();
    fixture.add_feed(main);
    fixture
        .packages
        .add("firefox", ExternalImplementation::new("RPM", "firefox", v("1.0")));

    let ctx = fixture.context();
    let provider = CandidateProvider::new(&ctx);
    let candidates = provider
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();
    let selection = candidates[0].to_selection(&candidates);
    assert!(selection.feed().is_distribution());

    let original = provider.lookup_original_implementation(&selection).unwrap();
    assert_eq!(original, candidates[0].implementation);
}

#[test]
fn test_lookup_after_feed_changed_is_not_found() {
    let fixture = Fixture::new();
    fixture.add_feed(feed(TEST1, vec![implementation("id1", "1.0")]));

    let ctx = fixture.context();
    let provider = CandidateProvider::new(&ctx);
    let candidates = provider
        .get_sorted_candidates(&Requirements::new(uri(TEST1)))
        .unwrap();
    let selection = candidates[0].to_selection(&candidates);

    fixture.add_feed(feed(TEST1, vec![implementation("id2", "2.0")]));
    let err = provider.lookup_original_implementation(&selection).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
