//! Property-based tests for the transition mapper.

use moodbridge_core::{normalize, MappingDomain, TransitionKey};
use moodbridge_mapping::CategoryMapper;
use proptest::prelude::*;

fn domain_strategy() -> impl Strategy<Value = MappingDomain> {
    prop::sample::select(MappingDomain::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any key absent from a domain's table yields exactly that domain's default.
    #[test]
    fn unknown_key_returns_default(raw in "[a-z]{1,12}_to_zz[a-z]{1,12}", domain in domain_strategy()) {
        let mapper = CategoryMapper::builtin().unwrap();
        let key = TransitionKey::from_raw(&raw);
        let lookup = mapper.lookup(&key, domain);
        prop_assert!(!lookup.exact);
        prop_assert_eq!(lookup.categories, mapper.default_for(domain));
        prop_assert!(!lookup.categories.is_empty());
    }

    /// Pair resolution never comes back empty, whatever the labels.
    #[test]
    fn pair_categories_never_empty(
        source in "[a-z]{1,12}",
        target in "[a-z]{1,12}",
        domain in domain_strategy(),
    ) {
        let mapper = CategoryMapper::builtin().unwrap();
        let pair = normalize(&source, &target).unwrap();
        prop_assert!(!mapper.categories_for_pair(&pair, domain).is_empty());
    }
}
