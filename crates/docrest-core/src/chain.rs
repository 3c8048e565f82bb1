//! Per-class field cache for polymorphic document hierarchies.

use crate::{
    error::SerializerError,
    field::{BuildContext, FieldTree, SerializerField},
};
use docrest_schema::{field::FieldDescriptor, registry::SchemaRegistry};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

type ChainKey = (String, ChainScope);

///
/// ChainScope
///
/// Build settings a cached link depends on besides its schema. Links built
/// with different reference settings never share a slot.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ChainScope {
    pub depth: usize,
    pub dereference: bool,
    pub hyperlink: bool,
}

impl ChainScope {
    #[must_use]
    pub const fn new(depth: usize) -> Self {
        Self {
            depth,
            dereference: true,
            hyperlink: false,
        }
    }

    #[must_use]
    pub const fn of(ctx: &BuildContext<'_>, depth: usize) -> Self {
        Self {
            depth,
            dereference: ctx.dereference,
            hyperlink: ctx.hyperlink,
        }
    }
}

impl From<usize> for ChainScope {
    fn from(depth: usize) -> Self {
        Self::new(depth)
    }
}

///
/// ChainLink
///
/// Immutable view of one schema's fields: its own delta plus a link to the
/// nearest ancestor's view. Lookups walk toward the root, so the most
/// derived definition of a name wins and siblings never see each other.
///

#[derive(Debug)]
pub struct ChainLink {
    pub schema: String,
    pub delta: FieldTree,
    pub parent: Option<Arc<Self>>,
}

impl ChainLink {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<SerializerField>> {
        self.delta
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(name)))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True when any link in the chain was built from `descriptor` itself.
    #[must_use]
    pub fn holds_descriptor(&self, descriptor: &Arc<FieldDescriptor>) -> bool {
        let own = self.delta.values().any(|field| {
            field
                .descriptor
                .as_ref()
                .is_some_and(|d| Arc::ptr_eq(d, descriptor))
        });

        own || self
            .parent
            .as_ref()
            .is_some_and(|p| p.holds_descriptor(descriptor))
    }

    /// Every visible name, root first; overrides keep the ancestor's slot.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names = self.parent.as_ref().map(|p| p.names()).unwrap_or_default();
        for name in self.delta.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }

        names
    }

    /// Flatten into one tree in `names()` order.
    #[must_use]
    pub fn flatten(&self) -> FieldTree {
        self.names()
            .into_iter()
            .filter_map(|name| self.get(&name).map(|f| (name, Arc::clone(f))))
            .collect()
    }
}

///
/// PolymorphicChainMap
///
/// Directed cache keyed by schema and `ChainScope`. Built lazily on miss and
/// cleared only by an explicit `clear()` when schemas are reloaded.
/// Optionally seeded with a base schema's tree; a seeded map refuses
/// schemas outside that base's hierarchy.
///

#[derive(Debug, Default)]
pub struct PolymorphicChainMap {
    seed: Option<(ChainKey, Arc<ChainLink>)>,
    links: RwLock<HashMap<ChainKey, Arc<ChainLink>>>,
}

impl PolymorphicChainMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A map whose `base` view in `scope` is `tree`.
    #[must_use]
    pub fn seeded(base: impl Into<String>, scope: impl Into<ChainScope>, tree: FieldTree) -> Self {
        let base = base.into();
        let link = Arc::new(ChainLink {
            schema: base.clone(),
            delta: tree,
            parent: None,
        });
        let key = (base, scope.into());

        let mut links = HashMap::new();
        links.insert(key.clone(), Arc::clone(&link));

        Self {
            seed: Some((key, link)),
            links: RwLock::new(links),
        }
    }

    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.seed.as_ref().map(|((name, _), _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_cached(&self, schema: &str, scope: impl Into<ChainScope>) -> bool {
        self.cached(&(schema.to_string(), scope.into())).is_some()
    }

    /// Drop every computed link; the seed, if any, survives.
    pub fn clear(&self) {
        let mut links = self.links.write().unwrap_or_else(PoisonError::into_inner);
        links.clear();
        if let Some((key, link)) = &self.seed {
            links.insert(key.clone(), Arc::clone(link));
        }
    }

    /// Resolve the view for `schema` in `scope`, building missing links.
    ///
    /// `build` turns one descriptor into its node; it is only called for
    /// descriptors absent (by identity) from the nearest cached ancestor.
    pub fn resolve<F>(
        &self,
        registry: &SchemaRegistry,
        schema: &str,
        scope: impl Into<ChainScope>,
        mut build: F,
    ) -> Result<Arc<ChainLink>, SerializerError>
    where
        F: FnMut(&Arc<FieldDescriptor>) -> Result<Arc<SerializerField>, SerializerError>,
    {
        let scope = scope.into();
        let key = (schema.to_string(), scope);
        if let Some(link) = self.cached(&key) {
            return Ok(link);
        }

        let mut chain = registry.ancestors(schema)?;
        if let Some(base) = self.base() {
            let Some(pos) = chain.iter().position(|s| s.name == base) else {
                return Err(SerializerError::NotASubclass {
                    schema: schema.to_string(),
                    base: base.to_string(),
                });
            };
            chain.drain(..pos);
        }

        tracing::debug!(schema, depth = scope.depth, "chain map miss");

        let mut links = self.links.write().unwrap_or_else(PoisonError::into_inner);
        let mut parent: Option<Arc<ChainLink>> = None;

        for ancestor in chain {
            let key = (ancestor.name.clone(), scope);
            if let Some(link) = links.get(&key) {
                parent = Some(Arc::clone(link));
                continue;
            }

            let mut delta = FieldTree::new();
            for descriptor in ancestor.fields_and_pk() {
                let inherited = parent
                    .as_ref()
                    .is_some_and(|p| p.holds_descriptor(descriptor));
                if !inherited {
                    delta.insert(descriptor.name.clone(), build(descriptor)?);
                }
            }

            let link = Arc::new(ChainLink {
                schema: ancestor.name.clone(),
                delta,
                parent: parent.take(),
            });
            links.insert(key, Arc::clone(&link));
            parent = Some(link);
        }

        parent.ok_or_else(|| SerializerError::NotASubclass {
            schema: schema.to_string(),
            base: self.base().unwrap_or_default().to_string(),
        })
    }

    fn cached(&self, key: &ChainKey) -> Option<Arc<ChainLink>> {
        self.links
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        field::{BuildContext, FieldBuilder},
        test_support::fixtures,
    };
    use std::cell::Cell;

    fn resolve(
        map: &PolymorphicChainMap,
        reg: &SchemaRegistry,
        schema: &str,
    ) -> Result<Arc<ChainLink>, SerializerError> {
        let builder = FieldBuilder::new(BuildContext::new(reg));
        map.resolve(reg, schema, 2, |d| builder.build_field(d, 2).map(Arc::new))
    }

    #[test]
    fn siblings_only_see_their_own_delta() {
        let reg = fixtures::shapes();
        let map = PolymorphicChainMap::new();

        let a = resolve(&map, &reg, "A").expect("A resolves");
        let b = resolve(&map, &reg, "B").expect("B resolves");
        let base = resolve(&map, &reg, "Base").expect("Base resolves");

        assert!(a.contains("x") && !a.contains("y"));
        assert!(b.contains("y") && !b.contains("x"));
        assert!(!base.contains("x") && !base.contains("y"));
        assert!(a.contains("label") && b.contains("label"));
    }

    #[test]
    fn inherited_nodes_are_shared_between_siblings() {
        let reg = fixtures::shapes();
        let map = PolymorphicChainMap::new();

        let a = resolve(&map, &reg, "A").expect("A resolves");
        let b = resolve(&map, &reg, "B").expect("B resolves");

        let la = a.get("label").expect("inherited");
        let lb = b.get("label").expect("inherited");
        assert!(Arc::ptr_eq(la, lb));
    }

    #[test]
    fn most_derived_override_wins() {
        let reg = fixtures::registry();
        let map = PolymorphicChainMap::new();

        let car = resolve(&map, &reg, "Car").expect("Car resolves");
        let vehicle = resolve(&map, &reg, "Vehicle").expect("Vehicle resolves");

        assert!(car.get("manufacturer").is_some_and(|f| f.children().is_some()));
        assert!(vehicle.get("manufacturer").is_some_and(|f| f.children().is_none()));
        assert_eq!(car.names(), vec!["id", "name", "weight", "manufacturer", "mpg"]);
    }

    #[test]
    fn deep_hierarchy_builds_each_delta_once() {
        let reg = fixtures::shapes();
        let map = PolymorphicChainMap::new();
        let calls = Cell::new(0);
        let builder = FieldBuilder::new(BuildContext::new(&reg));
        let mut build = |d: &Arc<FieldDescriptor>| {
            calls.set(calls.get() + 1);
            builder.build_field(d, 1).map(Arc::new)
        };

        map.resolve(&reg, "AA", 1, &mut build).expect("AA resolves");
        let first = calls.get();
        map.resolve(&reg, "A", 1, &mut build).expect("A resolves");
        map.resolve(&reg, "AA", 1, &mut build).expect("AA cached");

        // id + label + x + z, each built exactly once
        assert_eq!(first, 4);
        assert_eq!(calls.get(), first);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn seeded_map_rejects_outsiders() {
        let reg = fixtures::shapes();
        let map = PolymorphicChainMap::seeded("A", 2, FieldTree::new());

        assert!(resolve(&map, &reg, "AA").is_ok());
        let err = resolve(&map, &reg, "B").expect_err("B is outside A");
        assert!(matches!(err, SerializerError::NotASubclass { .. }));
    }

    #[test]
    fn reference_settings_get_separate_links() {
        let reg = fixtures::registry();
        let map = PolymorphicChainMap::new();
        let expand = BuildContext::new(&reg);
        let flat = BuildContext::new(&reg).dereference(false);

        let flat_car = map
            .resolve(&reg, "Car", ChainScope::of(&flat, 2), |d| {
                FieldBuilder::new(flat).build_field(d, 2).map(Arc::new)
            })
            .expect("flat Car resolves");
        let expanded_car = map
            .resolve(&reg, "Car", ChainScope::of(&expand, 2), |d| {
                FieldBuilder::new(expand).build_field(d, 2).map(Arc::new)
            })
            .expect("expanded Car resolves");

        assert!(flat_car.get("manufacturer").is_some_and(|f| f.children().is_none()));
        assert!(expanded_car.get("manufacturer").is_some_and(|f| f.children().is_some()));
        assert!(map.is_cached("Car", ChainScope::of(&flat, 2)));
        assert!(map.is_cached("Car", 2));
    }

    #[test]
    fn clear_keeps_only_the_seed() {
        let reg = fixtures::shapes();
        let map = PolymorphicChainMap::seeded("A", 2, FieldTree::new());
        resolve(&map, &reg, "AA").expect("AA resolves");
        assert_eq!(map.len(), 2);

        map.clear();

        assert_eq!(map.len(), 1);
        assert!(map.is_cached("A", 2));
        assert!(!map.is_cached("AA", 2));
    }
}
