use crate::DFPatternMatcher;
use crate::config::MatchConfig;

#[test]
fn test_default() {
    let config = MatchConfig::default();
    assert!(config.commutative);
    assert!(config.associative);
    assert!(!config.auto_jump);
    assert_eq!(*DFPatternMatcher::new().config(), config);
}

#[test]
fn test_builder_defaults_match_default() {
    assert_eq!(MatchConfig::builder().build(), MatchConfig::default());
}

#[test]
fn test_builder_overrides() {
    let config = MatchConfig::builder().commutative(false).auto_jump(true).build();
    assert_eq!(config, MatchConfig { commutative: false, associative: true, auto_jump: true });
}

#[test]
fn test_with_auto_jump() {
    let config = MatchConfig::builder().associative(false).build().with_auto_jump();
    assert!(config.auto_jump);
    assert!(!config.associative);
}

#[test]
fn test_with_bindings_enables_auto_jump() {
    let bindings = crate::VarBindings::new();
    let matcher = DFPatternMatcher::new().with_bindings(&bindings);
    assert!(matcher.config().auto_jump);
}

#[test]
fn test_from_env() {
    // Only this test touches these variables.
    unsafe {
        std::env::remove_var("DFPAT_NO_COMMUTATIVE");
        std::env::remove_var("DFPAT_NO_ASSOCIATIVE");
    }
    assert_eq!(MatchConfig::from_env(), MatchConfig::default());

    unsafe { std::env::set_var("DFPAT_NO_ASSOCIATIVE", "1") };
    let config = MatchConfig::from_env();
    unsafe { std::env::remove_var("DFPAT_NO_ASSOCIATIVE") };
    assert!(config.commutative);
    assert!(!config.associative);
    assert!(!config.auto_jump);
}
