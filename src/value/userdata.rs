//! Opaque host payloads.
//!
//! A [`UserData`] wraps any `Send + Sync` host value together with its type
//! lineage: the payload's own [`TypeTag`] followed by the tags of every host
//! class it should be assignable to. Class-filtered accessors test membership
//! in that lineage, which is how host-side inheritance is expressed without
//! runtime reflection.

use std::{
    any::{Any, TypeId},
    fmt,
    sync::{Arc, RwLock},
};

use crate::value::Table;

/// Runtime identity of a host type.
///
/// # Examples
///
/// ```rust
/// use luavalue::TypeTag;
///
/// struct Socket;
///
/// let tag = TypeTag::of::<Socket>();
/// assert_eq!(tag, TypeTag::of::<Socket>());
/// assert!(tag.name().ends_with("Socket"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeTag {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the fully qualified type name, for diagnostics only.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the short type name, without its module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl std::hash::Hash for TypeTag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

struct UserDataInner {
    payload: Arc<dyn Any + Send + Sync>,
    lineage: Vec<TypeTag>,
    metatable: RwLock<Option<Table>>,
}

/// Handle to a host payload.
///
/// Cloning shares the payload; equality is identity.
///
/// # Examples
///
/// ```rust
/// use luavalue::{TypeTag, UserData};
///
/// trait Shape {}
/// struct Circle(f64);
///
/// let data = UserData::with_lineage(Circle(2.0), [TypeTag::of::<dyn Shape>()]);
/// assert!(data.is::<Circle>());
/// assert!(data.is_instance_of(&TypeTag::of::<dyn Shape>()));
/// assert_eq!(data.downcast::<Circle>().map(|c| c.0), Some(2.0));
/// ```
#[derive(Clone)]
pub struct UserData {
    inner: Arc<UserDataInner>,
}

impl UserData {
    /// Wraps `payload`; its lineage holds only its own type.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self::with_lineage(payload, [])
    }

    /// Wraps `payload`, declaring it assignable to each of `supertypes`.
    #[must_use]
    pub fn with_lineage<T: Any + Send + Sync>(
        payload: T,
        supertypes: impl IntoIterator<Item = TypeTag>,
    ) -> Self {
        let mut lineage = vec![TypeTag::of::<T>()];
        lineage.extend(supertypes);

        UserData {
            inner: Arc::new(UserDataInner {
                payload: Arc::new(payload),
                lineage,
                metatable: RwLock::new(None),
            }),
        }
    }

    /// Returns the tag of the concrete payload type.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.inner.lineage[0]
    }

    /// Returns the payload's own tag followed by its declared supertypes.
    #[must_use]
    pub fn lineage(&self) -> &[TypeTag] {
        &self.inner.lineage
    }

    /// Returns `true` when the payload is exactly a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.payload.is::<T>()
    }

    /// Returns `true` when `class` is part of the payload's lineage.
    #[must_use]
    pub fn is_instance_of(&self, class: &TypeTag) -> bool {
        self.inner.lineage.contains(class)
    }

    /// Borrows the payload as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.payload.downcast_ref::<T>()
    }

    /// Returns a shared handle to the payload as a `T`.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner.payload).downcast::<T>().ok()
    }

    /// Returns the untyped payload.
    #[must_use]
    pub fn payload(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.inner.payload)
    }

    /// Returns the metatable, if one is set.
    #[must_use]
    pub fn metatable(&self) -> Option<Table> {
        read_lock!(self.inner.metatable).clone()
    }

    /// Replaces the metatable.
    pub fn set_metatable(&self, metatable: Option<Table>) {
        *write_lock!(self.inner.metatable) = metatable;
    }

    /// Returns `true` when both handles wrap the same payload.
    #[must_use]
    pub fn ptr_eq(&self, other: &UserData) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the identity of this userdata, stable for its lifetime.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl PartialEq for UserData {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "userdata<{}>: {:#016x}",
            self.type_tag().short_name(),
            self.id()
        )
    }
}
