use std::{
    fmt::{self, Formatter},
    str::FromStr,
};

use crate::{Error, Result};

/// Identity and classification of a buildable map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapDescriptor {
    pub name: &'static str,
    /// Test maps are read from and written to the test asset roots.
    pub is_test: bool,
}

impl MapDescriptor {
    pub const fn production(name: &'static str) -> Self {
        Self { name, is_test: false }
    }

    pub const fn test(name: &'static str) -> Self {
        Self { name, is_test: true }
    }
}

impl fmt::Display for MapDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_test {
            write!(f, "'{}' (test)", self.name)
        } else {
            write!(f, "'{}'", self.name)
        }
    }
}

/// Maps known to the build. New maps have to be added here before they can be built.
///
/// `giantworldmap` is listed twice. The production and the test variant are built independently
/// because they are read from and written to different roots.
pub const BUILTIN_MAPS: &[MapDescriptor] = &[
    MapDescriptor::production("africa"),
    MapDescriptor::production("asia"),
    MapDescriptor::production("australia"),
    MapDescriptor::production("achiran"),
    MapDescriptor::production("baikal"),
    MapDescriptor::production("baikalnukewars"),
    MapDescriptor::production("betweentwoseas"),
    MapDescriptor::production("blacksea"),
    MapDescriptor::production("britannia"),
    MapDescriptor::production("deglaciatedantarctica"),
    MapDescriptor::production("eastasia"),
    MapDescriptor::production("europe"),
    MapDescriptor::production("europeclassic"),
    MapDescriptor::production("falklandislands"),
    MapDescriptor::production("faroeislands"),
    MapDescriptor::production("fourislands"),
    MapDescriptor::production("gatewaytotheatlantic"),
    MapDescriptor::production("giantworldmap"),
    MapDescriptor::production("gulfofstlawrence"),
    MapDescriptor::production("halkidiki"),
    MapDescriptor::production("iceland"),
    MapDescriptor::production("italia"),
    MapDescriptor::production("japan"),
    MapDescriptor::production("lisbon"),
    MapDescriptor::production("manicouagan"),
    MapDescriptor::production("mars"),
    MapDescriptor::production("mena"),
    MapDescriptor::production("montreal"),
    MapDescriptor::production("newyorkcity"),
    MapDescriptor::production("northamerica"),
    MapDescriptor::production("oceania"),
    MapDescriptor::production("pangaea"),
    MapDescriptor::production("pluto"),
    MapDescriptor::production("southamerica"),
    MapDescriptor::production("straitofgibraltar"),
    MapDescriptor::production("surrounded"),
    MapDescriptor::production("svalmel"),
    MapDescriptor::production("world"),
    MapDescriptor::production("lemnos"),
    MapDescriptor::production("twolakes"),
    MapDescriptor::test("big_plains"),
    MapDescriptor::test("half_land_half_ocean"),
    MapDescriptor::test("ocean_and_land"),
    MapDescriptor::test("plains"),
    MapDescriptor::test("giantworldmap"),
];

/// Which maps a build should process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every map in the registry.
    #[default]
    All,
    /// Only the maps with these names, in the order they were given and without repetitions.
    Names(Vec<String>),
}

impl Selection {
    /// Parses a comma-separated list of map names. An empty string selects all maps.
    ///
    /// Names are taken verbatim, so `"world, plains"` refers to a map called `" plains"`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mapforge_content::Selection;
    /// assert_eq!(Selection::parse(""), Selection::All);
    /// let selection = Selection::parse("world,plains,world");
    /// assert_eq!(selection, Selection::Names(vec!["world".to_owned(), "plains".to_owned()]));
    /// ```
    pub fn parse(value: &str) -> Self {
        if value.is_empty() {
            return Selection::All;
        }
        Selection::names(value.split(','))
    }

    /// Selects the maps with the given names. Repeated names are dropped.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Selection::Names(unique)
    }
}

impl FromStr for Selection {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Selection::parse(value))
    }
}

/// The resolved intent of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildRequest {
    pub selection: Selection,
}

impl BuildRequest {
    pub fn all() -> Self {
        Self { selection: Selection::All }
    }

    pub fn new(selection: Selection) -> Self {
        Self { selection }
    }
}

/// Fixed catalog of maps. Read-only after construction.
#[derive(Debug, Clone, Copy)]
pub struct MapRegistry {
    maps: &'static [MapDescriptor],
}

impl MapRegistry {
    /// The catalog compiled into the tool.
    pub fn builtin() -> Self {
        Self::from_static(BUILTIN_MAPS)
    }

    /// A catalog consisting of the given maps.
    pub const fn from_static(maps: &'static [MapDescriptor]) -> Self {
        Self { maps }
    }

    /// All maps in registration order.
    pub fn list_all(&self) -> &'static [MapDescriptor] {
        self.maps
    }

    /// Returns `true` if at least one map with the given name is registered.
    pub fn is_valid(&self, name: &str) -> bool {
        self.maps.iter().any(|map| map.name == name)
    }

    /// Returns the maps the selection refers to in registration order.
    ///
    /// A name that is registered as a production and a test map selects both. The first unknown
    /// name in selection order fails the resolution.
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<MapDescriptor>> {
        match selection {
            Selection::All => Ok(self.maps.to_vec()),
            Selection::Names(names) => {
                if let Some(unknown) = names.iter().find(|name| !self.is_valid(name)) {
                    return Err(Error::UnknownMap(unknown.clone()));
                }
                Ok(self
                    .maps
                    .iter()
                    .filter(|map| names.iter().any(|name| name == map.name))
                    .copied()
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    static SMALL: &[MapDescriptor] = &[MapDescriptor::test("plains"), MapDescriptor::production("world")];

    #[test]
    fn builtin_names_are_unique_per_classification() {
        let registry = MapRegistry::builtin();
        let unique = registry
            .list_all()
            .iter()
            .map(|map| (map.name, map.is_test))
            .collect::<HashSet<_>>();
        assert_eq!(unique.len(), registry.list_all().len());
        assert!(registry.list_all().iter().all(|map| !map.name.is_empty()));
    }

    #[test]
    fn builtin_contains_giantworldmap_twice() {
        let registry = MapRegistry::builtin();
        let resolved = registry.resolve(&Selection::names(["giantworldmap"])).unwrap();
        assert_eq!(
            resolved,
            vec![MapDescriptor::production("giantworldmap"), MapDescriptor::test("giantworldmap")]
        );
    }

    #[test]
    fn is_valid() {
        let registry = MapRegistry::from_static(SMALL);
        assert!(registry.is_valid("plains"));
        assert!(registry.is_valid("world"));
        assert!(!registry.is_valid("mars"));
        assert!(!registry.is_valid(""));
    }

    #[test]
    fn resolve_all_keeps_registration_order() {
        let registry = MapRegistry::from_static(SMALL);
        assert_eq!(registry.resolve(&Selection::All).unwrap(), SMALL.to_vec());
    }

    #[test]
    fn resolve_subset() {
        let registry = MapRegistry::from_static(SMALL);
        let resolved = registry.resolve(&Selection::names(["world"])).unwrap();
        assert_eq!(resolved, vec![MapDescriptor::production("world")]);
    }

    #[test]
    fn resolve_unknown_name() {
        let registry = MapRegistry::from_static(SMALL);
        let result = registry.resolve(&Selection::names(["world", "atlantis"]));
        assert!(matches!(result, Err(Error::UnknownMap(name)) if name == "atlantis"));
    }

    #[test]
    fn resolve_reports_the_first_unknown_name_in_selection_order() {
        let registry = MapRegistry::from_static(SMALL);
        let result = registry.resolve(&Selection::parse("zzz,plains,aaa"));
        assert!(matches!(result, Err(Error::UnknownMap(name)) if name == "zzz"));
    }

    #[test]
    fn parse_selection() {
        assert_eq!(Selection::parse(""), Selection::All);
        assert_eq!(Selection::parse("world"), Selection::names(["world"]));
        assert_eq!(Selection::parse("world,plains,world"), Selection::names(["world", "plains"]));
        assert_eq!(Selection::parse("plains,world"), Selection::names(["plains", "world"]));
    }

    #[test]
    fn names_with_whitespace_are_not_trimmed() {
        let registry = MapRegistry::from_static(SMALL);
        assert_eq!(Selection::parse(" world"), Selection::names([" world"]));
        assert!(matches!(registry.resolve(&Selection::parse("plains, world")), Err(Error::UnknownMap(name)) if name == " world"));
        assert!(matches!(registry.resolve(&Selection::parse("  ")), Err(Error::UnknownMap(name)) if name == "  "));
    }

    #[test]
    fn parse_selection_with_empty_element_is_rejected_on_resolve() {
        let registry = MapRegistry::from_static(SMALL);
        let selection = Selection::parse("world,,plains");
        assert!(matches!(registry.resolve(&selection), Err(Error::UnknownMap(name)) if name.is_empty()));
    }

    #[test]
    fn display() {
        assert_eq!(MapDescriptor::test("plains").to_string(), "'plains' (test)");
        assert_eq!(MapDescriptor::production("world").to_string(), "'world'");
    }
}
