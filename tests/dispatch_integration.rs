//! Integration tests for priority chains and pattern dispatch

use pretty_assertions::assert_eq;

use interpol::{Config, DispatchKey, PatternDispatchRegistry, PriorityChain, SharedRegistry};

fn flatten(registry: &PatternDispatchRegistry<&'static str>, candidate: &str) -> Vec<&'static str> {
    registry.flatten(candidate).copied().collect()
}

#[test]
fn test_equal_priorities_keep_insertion_order() {
    let mut registry = PatternDispatchRegistry::new();
    registry.register(DispatchKey::exact("hei"), "A", 4).unwrap();
    registry.register(DispatchKey::exact("hei"), "B", 2).unwrap();
    registry.register(DispatchKey::exact("hei"), "C", 4).unwrap();
    assert_eq!(flatten(&registry, "hei"), vec!["A", "C", "B"]);
}

#[test]
fn test_exact_chain_precedes_patterns() {
    let mut registry = PatternDispatchRegistry::new();
    registry.register(DispatchKey::exact("hei"), "X", 0).unwrap();
    registry.register(DispatchKey::pattern("h.i"), "Y", 0).unwrap();
    assert_eq!(flatten(&registry, "hei"), vec!["X", "Y"]);
}

#[test]
fn test_non_matching_pattern_is_excluded() {
    let mut registry = PatternDispatchRegistry::new();
    registry.register(DispatchKey::pattern("h.i"), "Y", 0).unwrap();
    registry.register(DispatchKey::pattern("xyz"), "Z", 0).unwrap();
    assert_eq!(flatten(&registry, "hei"), vec!["Y"]);
}

#[test]
fn test_nothing_matches() {
    let empty: PatternDispatchRegistry<&str> = PatternDispatchRegistry::new();
    assert_eq!(flatten(&empty, "nomatch"), Vec::<&str>::new());

    let mut registry = PatternDispatchRegistry::new();
    registry.register(DispatchKey::exact("hei"), "X", 0).unwrap();
    assert_eq!(flatten(&registry, "nomatch"), Vec::<&str>::new());
}

#[test]
fn test_unregister_then_reregister() {
    let mut registry = PatternDispatchRegistry::new();
    let key = DispatchKey::pattern("cmd:");
    let first = registry.register(key.clone(), "first", 1).unwrap();
    registry.register(key.clone(), "second", 1).unwrap();

    assert_eq!(registry.unregister(&key, first), Some("first"));
    registry.register(key.clone(), "first", 1).unwrap();
    assert_eq!(flatten(&registry, "cmd:run"), vec!["second", "first"]);
}

#[test]
fn test_chain_standalone() {
    let mut chain = PriorityChain::new();
    chain.add("late", -1);
    chain.add("early", 1);
    chain.add("middle", 0);
    assert_eq!(chain.iter().copied().collect::<Vec<_>>(), vec!["early", "middle", "late"]);
}

#[test]
fn test_routes_from_config() {
    let config = Config::from_str(
        r#"
[[route]]
key = "re:git "
handler = "vcs"

[[route]]
key = "git status"
handler = "status"
priority = -1

[[route]]
key = "re:git s"
handler = "short"
priority = 3
"#,
    )
    .unwrap();
    let registry = config.registry().unwrap();
    let handlers: Vec<&str> = registry.flatten("git status").map(String::as_str).collect();
    assert_eq!(handlers, vec!["status", "vcs", "short"]);
}

#[test]
fn test_shared_registry_snapshot() {
    let registry = SharedRegistry::new();
    registry.register(DispatchKey::exact("k"), 'a', 0).unwrap();
    let reader = registry.clone();
    let snapshot = reader.flatten("k");
    registry.register(DispatchKey::exact("k"), 'b', 1).unwrap();

    assert_eq!(snapshot, vec!['a']);
    assert_eq!(reader.flatten("k"), vec!['b', 'a']);
}
