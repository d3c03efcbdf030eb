use crate::tables::{self, Table, DEFAULT_KEY};
use moodbridge_core::config::MappingConfig;
use moodbridge_core::{Category, EmotionLabel, Error, MappingDomain, MoodPair, Result, TransitionKey};
use std::collections::{BTreeMap, HashMap};

/// Raw, unvalidated tables: domain → key → category names.
pub type RawTables = BTreeMap<MappingDomain, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone)]
struct DomainTable {
    entries: HashMap<String, Vec<Category>>,
    default: Vec<Category>,
}

/// Result of a table lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookup<'a> {
    pub categories: &'a [Category],
    /// `false` when the domain default was used.
    pub exact: bool,
}

/// Immutable transition → category tables, validated once at startup.
///
/// Every domain is guaranteed to have a non-empty `default`, so lookups never
/// fail and never return an empty list.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    tables: BTreeMap<MappingDomain, DomainTable>,
}

impl CategoryMapper {
    /// Built-in tables only.
    pub fn builtin() -> Result<Self> {
        Self::load(&MappingConfig::default())
    }

    /// Built-in tables with config overrides merged on top.
    pub fn load(config: &MappingConfig) -> Result<Self> {
        let mut raw = builtin_tables();
        for domain in MappingDomain::ALL {
            let table = raw.entry(domain).or_default();
            for (key, names) in config.overrides_for(domain) {
                tracing::debug!("Mapping override {}[{}] = {:?}", domain, key, names);
                table.insert(normalize_key(key), names.clone());
            }
        }
        Self::from_raw(raw)
    }

    /// Validate and freeze raw tables. Every domain must be present with a
    /// non-empty `default`, and every entry must name at least one known category.
    pub fn from_raw(raw: RawTables) -> Result<Self> {
        let mut tables = BTreeMap::new();

        for domain in MappingDomain::ALL {
            let source = raw.get(&domain).ok_or_else(|| {
                Error::Configuration(format!("mapping domain {} is not defined", domain))
            })?;

            let mut entries = HashMap::new();
            let mut default = None;

            for (key, names) in source {
                let key = normalize_key(key);
                if key.is_empty() {
                    return Err(Error::Configuration(format!(
                        "empty key in mapping domain {}",
                        domain
                    )));
                }
                if names.is_empty() {
                    return Err(Error::Configuration(format!(
                        "entry '{}' in {} must list at least one category",
                        key, domain
                    )));
                }
                let categories = names
                    .iter()
                    .map(|n| domain.parse_category(n))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| Error::Configuration(format!("{} (entry '{}')", e, key)))?;

                if key == DEFAULT_KEY {
                    default = Some(categories);
                } else {
                    entries.insert(key, categories);
                }
            }

            let default = default.ok_or_else(|| {
                Error::Configuration(format!("mapping domain {} has no default entry", domain))
            })?;

            tracing::debug!(
                "Loaded mapping domain {} ({} curated entries)",
                domain,
                entries.len()
            );
            tables.insert(domain, DomainTable { entries, default });
        }

        Ok(Self { tables })
    }

    /// Exact transition lookup, falling back to the domain default.
    pub fn lookup(&self, key: &TransitionKey, domain: MappingDomain) -> Lookup<'_> {
        self.lookup_raw(key.as_str(), domain)
    }

    pub fn categories_for(&self, key: &TransitionKey, domain: MappingDomain) -> &[Category] {
        self.lookup(key, domain).categories
    }

    /// The emotion-keyed search-term dictionary.
    pub fn terms_for_emotion(&self, emotion: &EmotionLabel) -> &[Category] {
        self.lookup_raw(emotion.as_str(), MappingDomain::EmotionSearchTerms)
            .categories
    }

    /// Categories the assembler should try for a pair, in order.
    ///
    /// A curated transition entry wins. Without one, music search first tries
    /// the target emotion's curated search terms, then the domain default.
    pub fn categories_for_pair(&self, pair: &MoodPair, domain: MappingDomain) -> Vec<Category> {
        let lookup = match domain {
            MappingDomain::EmotionSearchTerms => {
                self.lookup_raw(pair.target.as_str(), MappingDomain::EmotionSearchTerms)
            }
            _ => self.lookup(&pair.key, domain),
        };
        if lookup.exact || domain != MappingDomain::MusicSearch {
            return lookup.categories.to_vec();
        }

        let by_emotion =
            self.lookup_raw(pair.target.as_str(), MappingDomain::EmotionSearchTerms);
        if !by_emotion.exact {
            return lookup.categories.to_vec();
        }

        let mut combined = by_emotion.categories.to_vec();
        for category in lookup.categories {
            if !combined.contains(category) {
                combined.push(category.clone());
            }
        }
        combined
    }

    /// The domain default list.
    pub fn default_for(&self, domain: MappingDomain) -> &[Category] {
        &self.table(domain).default
    }

    /// Curated keys of a domain, sorted.
    pub fn keys(&self, domain: MappingDomain) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .table(domain)
            .entries
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    fn lookup_raw(&self, key: &str, domain: MappingDomain) -> Lookup<'_> {
        let table = self.table(domain);
        match table.entries.get(key) {
            Some(categories) => Lookup {
                categories,
                exact: true,
            },
            None => Lookup {
                categories: &table.default,
                exact: false,
            },
        }
    }

    fn table(&self, domain: MappingDomain) -> &DomainTable {
        // from_raw inserts every domain in MappingDomain::ALL.
        &self.tables[&domain]
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// The compiled-in tables in raw form.
pub fn builtin_tables() -> RawTables {
    let mut raw = RawTables::new();
    raw.insert(MappingDomain::MovieGenres, to_raw(tables::MOVIE_GENRES));
    raw.insert(MappingDomain::CuisineAreas, to_raw(tables::CUISINE_AREAS));
    raw.insert(MappingDomain::MusicSearch, to_raw(tables::MUSIC_SEARCH));
    raw.insert(
        MappingDomain::EmotionSearchTerms,
        to_raw(tables::EMOTION_SEARCH_TERMS),
    );
    raw
}

fn to_raw(table: Table) -> BTreeMap<String, Vec<String>> {
    table
        .iter()
        .map(|(key, names)| {
            (
                key.to_string(),
                names.iter().map(|n| n.to_string()).collect(),
            )
        })
        .collect()
}
