// src/solver/candidate.rs

//! An implementation under evaluation for one set of requirements

use crate::error::Rejection;
use crate::feeds::{FeedPreferences, SourceKind};
use crate::model::{FeedUri, Implementation, Requirements, Retrieval, Selection, Stability};
use crate::store::ImplementationStore;
use std::cmp::Ordering;
use std::fmt;

/// Policy values a suitability check needs
pub(crate) struct SuitabilityPolicy<'a> {
    /// Lowest stability accepted without a user pin
    pub minimum_stability: Stability,
    pub offline: bool,
    pub store: &'a dyn ImplementationStore,
}

/// An implementation annotated with where it came from and whether it fits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCandidate {
    /// Feed the implementation was found in
    pub feed: FeedUri,
    pub source: SourceKind,
    /// Stored preferences of that feed
    pub preferences: FeedPreferences,
    pub implementation: Implementation,
    pub requirements: Requirements,
    /// The user's stability override, or the feed's rating
    pub effective_stability: Stability,
    rejection: Option<String>,
}

impl SelectionCandidate {
    pub(crate) fn new(
        feed: FeedUri,
        source: SourceKind,
        preferences: FeedPreferences,
        implementation: Implementation,
        requirements: &Requirements,
        policy: &SuitabilityPolicy<'_>,
    ) -> Self {
        let user_stability = preferences.user_stability(&implementation.id);
        let effective_stability = user_stability.unwrap_or(implementation.stability);
        let rejection = check(
            &implementation,
            requirements,
            effective_stability,
            user_stability.is_some(),
            policy,
        );
        Self {
            feed,
            source,
            preferences,
            implementation,
            requirements: requirements.clone(),
            effective_stability,
            rejection,
        }
    }

    pub fn is_suitable(&self) -> bool {
        self.rejection.is_none()
    }

    /// Why the candidate cannot be used, if it can't
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// One-line summary for diagnostics
    pub fn describe(&self) -> String {
        let verdict = self.rejection.as_deref().unwrap_or("suitable");
        format!(
            "{} {} from {} ({}, {}): {}",
            self.implementation.id,
            self.implementation.version,
            self.feed,
            self.source,
            self.effective_stability,
            verdict
        )
    }

    pub fn to_rejection(&self) -> Rejection {
        Rejection {
            feed: self.feed.to_string(),
            implementation: self.implementation.id.clone(),
            version: self.implementation.version.to_string(),
            reason: self
                .rejection
                .clone()
                .unwrap_or_else(|| "not selected".to_string()),
        }
    }

    /// Bind this candidate to its interface, keeping every candidate considered
    pub fn to_selection(&self, candidates: &[SelectionCandidate]) -> Selection {
        let imp = &self.implementation;
        let interface = self.requirements.interface.clone();
        let from_feed = (self.feed != interface).then(|| self.feed.clone());

        let mut requires: Vec<FeedUri> = imp
            .dependencies_for(self.requirements.command.as_deref())
            .into_iter()
            .map(|d| d.interface.clone())
            .collect();
        requires.sort();
        requires.dedup();

        let package = match &imp.retrieval {
            Retrieval::Distribution(package) => Some(package.clone()),
            _ => None,
        };

        Selection {
            interface,
            from_feed,
            id: imp.id.clone(),
            version: imp.version.clone(),
            arch: imp.arch,
            stability: self.effective_stability,
            digests: imp.digests.clone(),
            local_path: imp.local_path().map(|p| p.to_path_buf()),
            package,
            commands: imp.commands.keys().cloned().collect(),
            requires,
            candidates: candidates.to_vec(),
        }
    }

    /// Ranking: best first
    ///
    /// Higher version, then override sources, then higher stability, then
    /// feed identity and implementation ID for a total order.
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .implementation
            .version
            .cmp(&self.implementation.version)
            .then_with(|| other.source.is_override().cmp(&self.source.is_override()))
            .then_with(|| other.effective_stability.cmp(&self.effective_stability))
            .then_with(|| self.feed.cmp(&other.feed))
            .then_with(|| self.implementation.id.cmp(&other.implementation.id))
    }
}

impl fmt::Display for SelectionCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn check(
    imp: &Implementation,
    reqs: &Requirements,
    stability: Stability,
    pinned: bool,
    policy: &SuitabilityPolicy<'_>,
) -> Option<String> {
    if !imp.arch.runs_on(&reqs.architecture) {
        return Some(format!(
            "incompatible architecture {} (need {})",
            imp.arch, reqs.architecture
        ));
    }

    let range = reqs.effective_range();
    if !range.contains(&imp.version) {
        return Some(format!("version {} is outside {}", imp.version, range));
    }

    if stability.is_blacklisted() {
        return Some(format!("marked as {}", stability));
    }
    if !pinned && stability < policy.minimum_stability {
        return Some(format!(
            "stability {} is below {}",
            stability, policy.minimum_stability
        ));
    }

    if let Some(ref command) = reqs.command {
        if !imp.commands.contains_key(command) {
            return Some(format!("no '{}' command", command));
        }
    }

    if !reqs.languages.is_empty()
        && !imp.languages.is_empty()
        && !imp.languages.iter().any(|l| reqs.languages.contains(l))
    {
        return Some(format!("unsupported language ({})", imp.languages.join(", ")));
    }

    if let Retrieval::Archives(ref archives) = imp.retrieval {
        let stored = policy.store.contains_any(&imp.digests);
        if archives.is_empty() && !stored {
            return Some("no retrieval methods".to_string());
        }
        if policy.offline && !stored {
            return Some("not cached and offline".to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::{Architecture, Cpu, Os};
    use crate::model::{Archive, Command, Dependency};
    use crate::store::{EmptyStore, ManifestDigest};
    use crate::version::{Constraint, ImplementationVersion};

    fn v(s: &str) -> ImplementationVersion {
        ImplementationVersion::parse(s).unwrap()
    }

    fn uri(s: &str) -> FeedUri {
        FeedUri::parse(s).unwrap()
    }

    fn implementation(id: &str, version: &str) -> Implementation {
        let mut imp = Implementation::new(id, v(version));
        imp.commands.insert("run".to_string(), Command::default());
        imp.retrieval = Retrieval::Archives(vec![Archive {
            href: "http://example.com/a.tgz".to_string(),
            size: 1,
            extract: None,
            mime_type: None,
        }]);
        imp
    }

    fn policy(store: &dyn ImplementationStore) -> SuitabilityPolicy<'_> {
        SuitabilityPolicy {
            minimum_stability: Stability::Developer,
            offline: false,
            store,
        }
    }

    fn candidate(imp: Implementation, reqs: &Requirements, policy: &SuitabilityPolicy<'_>) -> SelectionCandidate {
        SelectionCandidate::new(
            uri("http://example.com/test1.json"),
            SourceKind::Main,
            FeedPreferences::default(),
            imp,
            reqs,
            policy,
        )
    }

    fn reqs() -> Requirements {
        Requirements::new(uri("http://example.com/test1.json"))
            .with_architecture(Architecture::new(Os::Linux, Cpu::X86_64))
    }

    #[test]
    fn test_suitable() {
        let c = candidate(implementation("a", "1.0"), &reqs(), &policy(&EmptyStore));
        assert!(c.is_suitable());
        assert!(c.describe().ends_with("suitable"));
    }

    #[test]
    fn test_rejections() {
        let p = policy(&EmptyStore);

        let mut imp = implementation("a", "1.0");
        imp.arch = Architecture::new(Os::Windows, Cpu::X86_64);
        let c = candidate(imp, &reqs(), &p);
        assert!(c.rejection_reason().unwrap().contains("architecture"));

        let r = reqs().with_constraint(Constraint::new(Some(v("2.0")), None));
        let c = candidate(implementation("a", "1.0"), &r, &p);
        assert!(c.rejection_reason().unwrap().contains("outside"));

        let mut imp = implementation("a", "1.0");
        imp.stability = Stability::Buggy;
        assert!(candidate(imp, &reqs(), &p).rejection_reason().unwrap().contains("buggy"));

        let c = candidate(implementation("a", "1.0"), &reqs().with_command("test"), &p);
        assert_eq!(c.rejection_reason(), Some("no 'test' command"));

        let mut imp = implementation("a", "1.0");
        imp.retrieval = Retrieval::Archives(Vec::new());
        assert_eq!(
            candidate(imp, &reqs(), &p).rejection_reason(),
            Some("no retrieval methods")
        );

        let mut imp = implementation("a", "1.0");
        imp.languages = vec!["fr".to_string()];
        let c = candidate(imp, &reqs().with_language("de"), &p);
        assert!(c.rejection_reason().unwrap().contains("language"));
    }

    #[test]
    fn test_stability_floor_and_pin() {
        let store = EmptyStore;
        let strict = SuitabilityPolicy {
            minimum_stability: Stability::Stable,
            offline: false,
            store: &store,
        };
        let imp = implementation("a", "1.0");
        let c = candidate(imp.clone(), &reqs(), &strict);
        assert!(c.rejection_reason().unwrap().contains("below"));

        let mut prefs = FeedPreferences::default();
        prefs.set_user_stability("a", Some(Stability::Developer));
        let pinned = SelectionCandidate::new(
            uri("http://example.com/test1.json"),
            SourceKind::Main,
            prefs,
            imp,
            &reqs(),
            &strict,
        );
        assert!(pinned.is_suitable());
        assert_eq!(pinned.effective_stability, Stability::Developer);
    }

    #[test]
    fn test_offline_needs_store() {
        let temp = tempfile::TempDir::new().unwrap();
        let digest = crate::store::install_manifest(temp.path(), b"manifest").unwrap();
        let store = crate::store::DirectoryStore::new(vec![temp.path().to_path_buf()]);
        let offline = SuitabilityPolicy {
            minimum_stability: Stability::Developer,
            offline: true,
            store: &store,
        };

        let c = candidate(implementation("a", "1.0"), &reqs(), &offline);
        assert_eq!(c.rejection_reason(), Some("not cached and offline"));

        let mut imp = implementation("b", "1.0");
        imp.digests = vec![digest];
        assert!(candidate(imp, &reqs(), &offline).is_suitable());

        let mut imp = implementation("c", "1.0");
        imp.digests = vec![ManifestDigest::sha256_of(b"other")];
        imp.retrieval = Retrieval::LocalPath("/opt/c".into());
        assert!(candidate(imp, &reqs(), &offline).is_suitable());
    }

    #[test]
    fn test_to_selection() {
        let mut imp = implementation("a", "1.0");
        imp.dependencies.push(Dependency::new(uri("http://example.com/lib.json")));
        let mut c = candidate(imp, &reqs(), &policy(&EmptyStore));
        c.feed = uri("http://example.com/sub1.json");

        let selection = c.to_selection(std::slice::from_ref(&c));
        assert_eq!(selection.interface, uri("http://example.com/test1.json"));
        assert_eq!(selection.from_feed, Some(uri("http://example.com/sub1.json")));
        assert_eq!(selection.requires, vec![uri("http://example.com/lib.json")]);
        assert_eq!(selection.commands, vec!["run".to_string()]);
        assert_eq!(selection.candidates.len(), 1);
    }

    #[test]
    fn test_rank() {
        let p = policy(&EmptyStore);
        let old = candidate(implementation("a", "1.0"), &reqs(), &p);
        let new = candidate(implementation("b", "2.0"), &reqs(), &p);
        assert_eq!(new.rank(&old), Ordering::Less);

        let mut native = old.clone();
        native.source = SourceKind::NativeOverride;
        native.feed = uri("/data/native_feeds/x");
        assert_eq!(native.rank(&old), Ordering::Less);

        let mut stable = old.clone();
        stable.effective_stability = Stability::Stable;
        stable.feed = uri("http://example.com/z.json");
        assert_eq!(stable.rank(&old), Ordering::Less);
    }
}
