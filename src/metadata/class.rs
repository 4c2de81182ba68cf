use crate::controller::Controller;
use crate::di::{Container, Injectable};
use crate::error::Result;
use crate::metadata::MetadataStore;
use crate::module::Module;
use crate::router::BoundHandler;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased singleton held by the container.
pub type Instance = Arc<dyn Any + Send + Sync>;

type Constructor = fn(&Container) -> Result<Instance>;
type MethodBinder = fn(Instance, &str) -> Option<BoundHandler>;

/// Identity of a class: its `TypeId` plus a readable name.
///
/// Equality and hashing only look at the `TypeId`.
#[derive(Clone, Copy)]
pub struct ClassId {
    id: TypeId,
    name: &'static str,
}

impl ClassId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Type name without its module path, e.g. `UserController`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ClassId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassId {}

impl Hash for ClassId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A reference to a class together with what the framework can do with it.
///
/// `decorate` writes the class metadata into a store, `construct` builds a
/// new instance from a container and `bind` looks up a route handler on a
/// controller instance by method name.
#[derive(Clone, Copy)]
pub struct ClassRef {
    id: ClassId,
    decorate: fn(&MetadataStore),
    construct: Option<Constructor>,
    bind: Option<MethodBinder>,
}

impl ClassRef {
    pub fn injectable<T: Injectable>() -> Self {
        Self {
            id: ClassId::of::<T>(),
            decorate: <T as Injectable>::decorate,
            construct: Some(construct_instance::<T>),
            bind: None,
        }
    }

    pub fn controller<C: Controller>() -> Self {
        Self {
            bind: Some(bind_instance::<C>),
            ..Self::injectable::<C>()
        }
    }

    pub fn module<M: Module>() -> Self {
        Self {
            id: ClassId::of::<M>(),
            decorate: <M as Module>::decorate,
            construct: None,
            bind: None,
        }
    }

    /// A class the framework knows by identity only, such as `dyn Trait`.
    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self {
            id: ClassId::of::<T>(),
            decorate: undecorated,
            construct: None,
            bind: None,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }

    pub(crate) fn decorate(&self, store: &MetadataStore) {
        (self.decorate)(store)
    }

    pub(crate) fn constructor(&self) -> Option<Constructor> {
        self.construct
    }

    pub(crate) fn bind_method(&self, instance: Instance, method_name: &str) -> Option<BoundHandler> {
        self.bind.and_then(|bind| bind(instance, method_name))
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("name", &self.id.name())
            .field("constructible", &self.construct.is_some())
            .field("controller", &self.bind.is_some())
            .finish()
    }
}

fn construct_instance<T: Injectable>(container: &Container) -> Result<Instance> {
    Ok(Arc::new(T::inject(container)?))
}

fn bind_instance<C: Controller>(instance: Instance, method_name: &str) -> Option<BoundHandler> {
    let controller = instance.downcast::<C>().ok()?;
    C::bind_method(controller, method_name)
}

fn undecorated(_store: &MetadataStore) {}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UserController;
    trait Greeter {}

    #[test]
    fn names_drop_module_path() {
        assert_eq!(ClassId::of::<UserController>().name(), "UserController");
        assert_eq!(ClassId::of::<dyn Greeter>().name(), "Greeter");
        assert_eq!(ClassId::of::<Vec<String>>().name(), "Vec");
    }

    #[test]
    fn identity_ignores_capabilities() {
        assert_eq!(ClassRef::opaque::<UserController>(), ClassRef::opaque::<UserController>());
        assert_ne!(
            ClassRef::opaque::<UserController>().id(),
            ClassRef::opaque::<dyn Greeter>().id()
        );
    }
}
