//! Type-keyed registry of link generators and CURIE definitions.
//!
//! A [`Registry`] maps a record's concrete type (by [`TypeId`], exact match
//! only) to a generator function that computes its links, and maps CURIE
//! prefixes to URI templates. All registry state sits behind one
//! `parking_lot::RwLock`: registration takes the write lock, lookups and
//! CURIE resolution take the read lock. Generators run outside the lock.
//!
//! `C` is the caller's context type, passed through to generators untouched.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace};

use crate::envelope::Envelope;
use crate::error::WrapError;
use crate::link::{Link, LinkMap};

/// Erased generator: downcasts the record back to its concrete type.
type ErasedGenerator<C> = Arc<dyn Fn(&C, &dyn Any) -> Vec<Link> + Send + Sync>;

struct Registered<C> {
    run: ErasedGenerator<C>,
    type_name: &'static str,
}

/// Identifies a registered record type. Returned by
/// [`Registry::registered_types`] for external tooling (e.g. schema
/// document generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub id: TypeId,
    pub name: &'static str,
}

struct Tables<C> {
    generators: HashMap<TypeId, Registered<C>>,
    /// `TypeId::of::<Box<T>>()` for every registered `T`, so strict mode
    /// can name the registered type when a boxed value is wrapped.
    boxed_aliases: HashMap<TypeId, &'static str>,
    curies: HashMap<String, String>,
}

/// Registry of per-type link generators, CURIE prefixes, and the strict
/// flag. Safe for concurrent use; registration is expected at service
/// initialization, wrapping on the hot path.
pub struct Registry<C = ()> {
    tables: RwLock<Tables<C>>,
    strict: bool,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Registry<C> {
    /// Create a permissive registry: wrapping an unregistered type yields
    /// an envelope with no links.
    pub fn new() -> Self {
        Self::with_strict(false)
    }

    /// Create a strict registry: wrapping an unregistered structured type,
    /// or mixing up a type and its boxed form, fails with [`WrapError`].
    ///
    /// Strict mode is a development-time contract checker. Do not enable
    /// it where partially-decorated output is acceptable.
    pub fn strict() -> Self {
        Self::with_strict(true)
    }

    fn with_strict(strict: bool) -> Self {
        Registry {
            tables: RwLock::new(Tables {
                generators: HashMap::new(),
                boxed_aliases: HashMap::new(),
                curies: HashMap::new(),
            }),
            strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Bind a generator to type `T`. The generator is invoked whenever a
    /// `T` is wrapped. Registering the same type twice keeps the last
    /// generator.
    pub fn register<T, F>(&self, generator: F)
    where
        T: Any,
        F: Fn(&C, &T) -> Vec<Link> + Send + Sync + 'static,
    {
        let run: ErasedGenerator<C> = Arc::new(move |ctx, value| match value.downcast_ref::<T>() {
            Some(record) => generator(ctx, record),
            None => Vec::new(),
        });
        let mut tables = self.tables.write();
        tables.generators.insert(
            TypeId::of::<T>(),
            Registered {
                run,
                type_name: type_name::<T>(),
            },
        );
        tables
            .boxed_aliases
            .insert(TypeId::of::<Box<T>>(), type_name::<T>());
        debug!(ty = type_name::<T>(), "registered link generator");
    }

    /// Bind a CURIE prefix to a URI template (typically containing a
    /// `{rel}` placeholder). Registering the same prefix twice keeps the
    /// last template.
    pub fn register_curie(&self, prefix: impl Into<String>, href: impl Into<String>) {
        let prefix = prefix.into();
        debug!(prefix = %prefix, "registered curie");
        self.tables.write().curies.insert(prefix, href.into());
    }

    /// All types with a registered generator. Introspection only.
    pub fn registered_types(&self) -> Vec<TypeKey> {
        self.tables
            .read()
            .generators
            .iter()
            .map(|(id, registered)| TypeKey {
                id: *id,
                name: registered.type_name,
            })
            .collect()
    }

    /// Emit one synthetic `curies` link per distinct registered prefix used
    /// by a relation in `links`, in first-use order. Relations without a
    /// `:` separator or with an unregistered prefix contribute nothing.
    pub(crate) fn resolve_curies(&self, links: &LinkMap) -> Vec<Link> {
        let tables = self.tables.read();
        if tables.curies.is_empty() || links.is_empty() {
            return Vec::new();
        }

        let mut used: Vec<Link> = Vec::new();
        for (rel, _) in links.iter() {
            let Some(split) = rel.find(':') else { continue };
            if split == 0 {
                continue;
            }
            let prefix = &rel[..split];
            if used.iter().any(|link| link.name.as_deref() == Some(prefix)) {
                continue;
            }
            if let Some(href) = tables.curies.get(prefix) {
                used.push(Link::new("curies", href.clone()).templated().with_name(prefix));
            }
        }
        used
    }

    fn lookup(&self, id: TypeId) -> Option<ErasedGenerator<C>> {
        self.tables
            .read()
            .generators
            .get(&id)
            .map(|registered| Arc::clone(&registered.run))
    }

    /// Wrap a record in an envelope, computing its links immediately.
    ///
    /// The record is borrowed, not copied; the envelope cannot outlive it.
    /// In permissive mode a missing generator simply yields no links. In
    /// strict mode it fails for structured types and for boxed/unboxed
    /// mix-ups, see [`WrapError`].
    pub fn wrap<'a, T>(&'a self, ctx: &C, record: &'a T) -> Result<Envelope<'a, C>, WrapError>
    where
        T: Serialize + Any,
    {
        let mut envelope = Envelope::with_record(self, record);
        if let Some(generator) = self.lookup(TypeId::of::<T>()) {
            trace!(ty = type_name::<T>(), "running link generator");
            for link in generator(ctx, record) {
                envelope.add_link(link);
            }
            return Ok(envelope);
        }
        if self.strict {
            self.check_strict(record)?;
        }
        trace!(ty = type_name::<T>(), "no link generator registered");
        Ok(envelope)
    }

    /// An envelope with no record. Serializes as `{}` unless links or
    /// embedded resources are added.
    pub fn empty_envelope(&self) -> Envelope<'_, C> {
        Envelope::bare(self)
    }

    fn check_strict<T: Serialize + Any>(&self, record: &T) -> Result<(), WrapError> {
        let tables = self.tables.read();
        // Registered for Box<T>, wrapped a plain T.
        if let Some(registered) = tables.generators.get(&TypeId::of::<Box<T>>()) {
            return Err(WrapError::TypeMismatch {
                passed: type_name::<T>(),
                registered: registered.type_name,
            });
        }
        // Registered for U, wrapped a Box<U>.
        if let Some(inner) = tables.boxed_aliases.get(&TypeId::of::<T>()) {
            return Err(WrapError::TypeMismatch {
                passed: type_name::<T>(),
                registered: inner,
            });
        }
        drop(tables);
        if crate::shape::is_struct_like(record) {
            return Err(WrapError::MissingGenerator(type_name::<T>()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct User {
        id: u64,
    }

    #[derive(Serialize)]
    struct Team {
        name: String,
    }

    fn self_link(user: &User) -> Vec<Link> {
        vec![Link::new("self", format!("/users/{}", user.id))]
    }

    #[test]
    fn wrap_invokes_registered_generator() {
        let registry: Registry = Registry::new();
        registry.register(|_: &(), user: &User| self_link(user));
        let user = User { id: 7 };
        let envelope = registry.wrap(&(), &user).unwrap();
        match envelope.links().get("self") {
            Some(crate::LinkValue::One(link)) => assert_eq!(link.href, "/users/7"),
            other => panic!("expected self link, got {other:?}"),
        }
    }

    #[test]
    fn last_registration_wins() {
        let registry: Registry = Registry::new();
        registry.register(|_: &(), _: &User| vec![Link::new("self", "/old")]);
        registry.register(|_: &(), _: &User| vec![Link::new("self", "/new")]);
        let user = User { id: 1 };
        let envelope = registry.wrap(&(), &user).unwrap();
        match envelope.links().get("self") {
            Some(crate::LinkValue::One(link)) => assert_eq!(link.href, "/new"),
            other => panic!("expected single self link, got {other:?}"),
        }
    }

    #[test]
    fn lookup_is_exact_type_only() {
        let registry: Registry = Registry::new();
        registry.register(|_: &(), user: &User| self_link(user));
        let team = Team {
            name: "ops".into(),
        };
        let envelope = registry.wrap(&(), &team).unwrap();
        assert!(envelope.links().is_empty());
    }

    #[test]
    fn registered_types_reports_generator_keys() {
        let registry: Registry = Registry::new();
        registry.register(|_: &(), user: &User| self_link(user));
        let types = registry.registered_types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].id, TypeId::of::<User>());
        assert!(types[0].name.ends_with("User"));
    }

    #[test]
    fn context_is_passed_through() {
        struct RequestCtx {
            base: String,
        }
        let registry: Registry<RequestCtx> = Registry::new();
        registry.register(|ctx: &RequestCtx, user: &User| {
            vec![Link::new("self", format!("{}/users/{}", ctx.base, user.id))]
        });
        let ctx = RequestCtx {
            base: "https://api.example.com".into(),
        };
        let user = User { id: 3 };
        let envelope = registry.wrap(&ctx, &user).unwrap();
        match envelope.links().get("self") {
            Some(crate::LinkValue::One(link)) => {
                assert_eq!(link.href, "https://api.example.com/users/3");
            }
            other => panic!("expected self link, got {other:?}"),
        }
    }

    #[test]
    fn resolve_curies_emits_one_entry_per_prefix() {
        let registry: Registry = Registry::new();
        registry.register_curie("acme", "https://docs.acme.com/rels/{rel}");
        let mut links = LinkMap::default();
        links.add(Link::new("acme:orders", "/orders"));
        links.add(Link::new("acme:invoices", "/invoices"));
        links.add(Link::new("self", "/users/1"));
        let curies = registry.resolve_curies(&links);
        assert_eq!(curies.len(), 1);
        assert_eq!(curies[0].name.as_deref(), Some("acme"));
        assert_eq!(curies[0].href, "https://docs.acme.com/rels/{rel}");
        assert!(curies[0].templated);
    }

    #[test]
    fn resolve_curies_skips_unregistered_prefixes() {
        let registry: Registry = Registry::new();
        registry.register_curie("acme", "https://docs.acme.com/rels/{rel}");
        let mut links = LinkMap::default();
        links.add(Link::new("other:thing", "/thing"));
        links.add(Link::new(":broken", "/broken"));
        assert!(registry.resolve_curies(&links).is_empty());
    }

    #[test]
    fn curie_last_registration_wins() {
        let registry: Registry = Registry::new();
        registry.register_curie("acme", "https://old/{rel}");
        registry.register_curie("acme", "https://new/{rel}");
        let mut links = LinkMap::default();
        links.add(Link::new("acme:orders", "/orders"));
        let curies = registry.resolve_curies(&links);
        assert_eq!(curies[0].href, "https://new/{rel}");
    }

    // Strict mode contract checks.

    #[test]
    fn strict_missing_generator_for_struct_fails() {
        let registry: Registry = Registry::strict();
        assert!(registry.is_strict());
        let user = User { id: 1 };
        let err = registry.wrap(&(), &user).unwrap_err();
        assert!(matches!(err, WrapError::MissingGenerator(_)));
    }

    #[test]
    fn strict_primitive_without_generator_is_exempt() {
        let registry: Registry = Registry::strict();
        assert!(registry.wrap(&(), &42u32).is_ok());
        assert!(registry.wrap(&(), &"plain").is_ok());
        assert!(registry.wrap(&(), &vec![1, 2, 3]).is_ok());
    }

    #[test]
    fn strict_map_without_generator_is_exempt() {
        let registry: Registry = Registry::strict();
        let map = std::collections::HashMap::from([("k", 1)]);
        assert!(registry.wrap(&(), &map).is_ok());
        let value = serde_json::json!({"k": 1});
        assert!(registry.wrap(&(), &value).is_ok());
    }

    #[test]
    fn strict_boxed_registration_plain_value_fails() {
        let registry: Registry = Registry::strict();
        registry.register(|_: &(), user: &Box<User>| self_link(user.as_ref()));
        let user = User { id: 1 };
        let err = registry.wrap(&(), &user).unwrap_err();
        assert!(matches!(err, WrapError::TypeMismatch { .. }));
    }

    #[test]
    fn strict_plain_registration_boxed_value_fails() {
        let registry: Registry = Registry::strict();
        registry.register(|_: &(), user: &User| self_link(user));
        let user = Box::new(User { id: 1 });
        let err = registry.wrap(&(), &user).unwrap_err();
        assert!(matches!(err, WrapError::TypeMismatch { .. }));
    }

    #[test]
    fn permissive_missing_generator_is_not_an_error() {
        let registry: Registry = Registry::new();
        let user = User { id: 1 };
        let envelope = registry.wrap(&(), &user).unwrap();
        assert!(envelope.links().is_empty());
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        let registry: Arc<Registry> = Arc::new(Registry::new());
        registry.register(|_: &(), user: &User| self_link(user));
        let handles: Vec<_> = (0..4u64)
            .map(|id| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let user = User { id };
                    let envelope = registry.wrap(&(), &user).unwrap();
                    assert_eq!(envelope.links().len(), 1);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
