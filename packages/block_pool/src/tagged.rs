use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::NonZero;
use std::result;

use tracing::trace;

use crate::{Error, GrowablePool, Handle, Result};

/// A closed set of types stored as one enum, for use with [`TaggedPool`].
///
/// Implemented by [`tagged_union!`][crate::tagged_union], together with one [`Variant`] impl per
/// member type.
pub trait TaggedUnion: Sized {
    /// Name of the variant the value currently holds.
    fn variant_name(&self) -> &'static str;
}

/// Conversion between a tagged union and one of its member types `V`.
///
/// Implemented by [`tagged_union!`][crate::tagged_union]; there is little reason to implement it
/// by hand.
pub trait Variant<V>: TaggedUnion {
    /// Wraps a `V` into the union.
    fn wrap(value: V) -> Self;

    /// The `V` the union holds, if it holds one.
    fn narrow(&self) -> Option<&V>;

    /// The `V` the union holds, if it holds one.
    fn narrow_mut(&mut self) -> Option<&mut V>;

    /// Unwraps the union into a `V`, or gives the union back if it holds another variant.
    ///
    /// # Errors
    ///
    /// Returns the union unchanged if it does not hold a `V`.
    fn into_variant(self) -> result::Result<V, Self>;
}

/// Declares an enum over a closed set of types and makes it usable as the item type of a
/// [`TaggedPool`].
///
/// Each variant wraps exactly one type and every type may appear only once.
///
/// # Example
///
/// ```rust
/// use block_pool::{TaggedUnion, Variant, tagged_union};
///
/// tagged_union! {
///     /// Anything our scripting engine can store.
///     #[derive(Debug)]
///     pub enum Value {
///         /// A whole number.
///         Int(i64),
///         /// Some text.
///         Text(String),
///     }
/// }
///
/// let value = Value::wrap(42_i64);
/// assert_eq!(value.variant_name(), "Int");
/// assert_eq!(Variant::<i64>::narrow(&value), Some(&42));
/// assert_eq!(Variant::<String>::narrow(&value), None);
/// ```
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident($ty:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant($ty)
            ),+
        }

        impl $crate::TaggedUnion for $name {
            fn variant_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => ::std::stringify!($variant)),+
                }
            }
        }

        $(
            impl $crate::Variant<$ty> for $name {
                fn wrap(value: $ty) -> Self {
                    Self::$variant(value)
                }

                #[allow(unreachable_patterns, reason = "single-variant unions have no other arm")]
                fn narrow(&self) -> ::std::option::Option<&$ty> {
                    match self {
                        Self::$variant(value) => ::std::option::Option::Some(value),
                        _ => ::std::option::Option::None,
                    }
                }

                #[allow(unreachable_patterns, reason = "single-variant unions have no other arm")]
                fn narrow_mut(&mut self) -> ::std::option::Option<&mut $ty> {
                    match self {
                        Self::$variant(value) => ::std::option::Option::Some(value),
                        _ => ::std::option::Option::None,
                    }
                }

                #[allow(unreachable_patterns, reason = "single-variant unions have no other arm")]
                fn into_variant(self) -> ::std::result::Result<$ty, Self> {
                    match self {
                        Self::$variant(value) => ::std::result::Result::Ok(value),
                        other => ::std::result::Result::Err(other),
                    }
                }
            }
        )+
    };
}

/// A growable pool whose slots each hold one of a closed set of types.
///
/// The item type `U` is an enum declared with [`tagged_union!`][crate::tagged_union]. Items are
/// allocated as one of the member types and accessed through a [`TypedHandle`] that remembers
/// which member type it was allocated as. The pool grows and relocates exactly like a
/// [`GrowablePool`], which it is built on.
///
/// # Variant mismatches
///
/// [`get()`][Self::get] and [`get_mut()`][Self::get_mut] never change what a slot holds; asking
/// for a type the slot does not currently hold fails with [`Error::InvalidVariant`].
///
/// [`get_or_default()`][Self::get_or_default] is the explicit, destructive alternative: if the
/// slot holds another variant, that value is dropped and replaced by the default value of the
/// requested type. It is only available for types that implement [`Default`].
///
/// # Example
///
/// ```rust
/// use block_pool::{TaggedPool, tagged_union};
/// use new_zealand::nz;
///
/// tagged_union! {
///     #[derive(Debug)]
///     enum Item {
///         Count(u32),
///         Name(String),
///     }
/// }
///
/// let mut pool = TaggedPool::<Item>::with_capacity(nz!(4))?;
///
/// let count = pool.allocate(7_u32)?;
/// let name = pool.allocate("seven".to_string())?;
///
/// *pool.get_mut(count)? += 1;
///
/// assert_eq!(*pool.get(count)?, 8);
/// assert_eq!(pool.get(name)?, "seven");
/// # Ok::<(), block_pool::Error>(())
/// ```
pub struct TaggedPool<U: TaggedUnion> {
    pool: GrowablePool<U>,
}

impl<U: TaggedUnion> TaggedPool<U> {
    /// Creates a pool with room for `capacity` items.
    ///
    /// To configure the pool further, build a [`GrowablePool`] and convert it with
    /// [`From`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the storage cannot be reserved.
    pub fn with_capacity(capacity: NonZero<u32>) -> Result<Self> {
        GrowablePool::with_capacity(capacity).map(Self::from)
    }

    /// The number of slots in the pool, occupied or not.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    /// The number of live items in the pool.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.pool.allocated()
    }

    /// Whether the pool holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// How many times the pool has moved its items into a larger buffer.
    #[must_use]
    pub fn relocations(&self) -> u32 {
        self.pool.relocations()
    }

    /// See [`GrowablePool::reserve()`][crate::Pool::reserve].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the required capacity cannot be reserved.
    pub fn reserve(&mut self, additional: u32) -> Result<()> {
        self.pool.reserve(additional)
    }

    /// Stores `value` as the matching variant of `U` and returns a handle typed for `V`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the pool is full and cannot grow.
    pub fn allocate<V>(&mut self, value: V) -> Result<TypedHandle<U, V>>
    where
        U: Variant<V>,
    {
        self.pool
            .allocate_with(|| U::wrap(value))
            .map(TypedHandle::new)
    }

    /// Gets a shared reference to the `V` in the handle's slot.
    ///
    /// # Errors
    ///
    /// Fails like [`Pool::get()`][crate::Pool::get], or with [`Error::InvalidVariant`] if the
    /// slot currently holds another variant.
    pub fn get<V>(&self, handle: TypedHandle<U, V>) -> Result<&V>
    where
        U: Variant<V>,
    {
        let item = self.pool.get(handle.handle)?;

        item.narrow()
            .ok_or_else(|| invalid_variant::<U, V>(handle.index(), item))
    }

    /// Gets an exclusive reference to the `V` in the handle's slot.
    ///
    /// # Errors
    ///
    /// Same as [`get()`][Self::get].
    pub fn get_mut<V>(&mut self, handle: TypedHandle<U, V>) -> Result<&mut V>
    where
        U: Variant<V>,
    {
        let item = self.pool.get_mut(handle.handle)?;

        if item.narrow().is_none() {
            return Err(invalid_variant::<U, V>(handle.index(), item));
        }

        Ok(item
            .narrow_mut()
            .expect("variant was checked above"))
    }

    /// Gets an exclusive reference to the `V` in the handle's slot, replacing whatever the slot
    /// holds with `V::default()` if it is another variant.
    ///
    /// The replaced value is dropped. Handles typed for the replaced variant will fail with
    /// [`Error::InvalidVariant`] from then on.
    ///
    /// # Example
    ///
    /// ```rust
    /// use block_pool::{TaggedPool, TypedHandle, tagged_union};
    /// use new_zealand::nz;
    ///
    /// tagged_union! {
    ///     enum Cell {
    ///         Number(f64),
    ///         Text(String),
    ///     }
    /// }
    ///
    /// let mut pool = TaggedPool::<Cell>::with_capacity(nz!(1))?;
    /// let number = pool.allocate(1.5_f64)?;
    ///
    /// // Reinterpret the same slot as text.
    /// let text: TypedHandle<Cell, String> = number.retype();
    /// pool.get_or_default(text)?.push_str("hello");
    ///
    /// assert_eq!(pool.get(text)?, "hello");
    /// assert!(pool.get(number).is_err());
    /// # Ok::<(), block_pool::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails like [`Pool::get_mut()`][crate::Pool::get_mut] if the handle is not valid.
    pub fn get_or_default<V: Default>(&mut self, handle: TypedHandle<U, V>) -> Result<&mut V>
    where
        U: Variant<V>,
    {
        let item = self.pool.get_mut(handle.handle)?;

        if item.narrow().is_none() {
            trace!(
                index = handle.index(),
                replaced = item.variant_name(),
                expected = type_name::<V>(),
                "replacing tagged slot contents with a default value"
            );

            *item = U::wrap(V::default());
        }

        Ok(item
            .narrow_mut()
            .expect("slot was set to the requested variant above"))
    }

    /// Whether the handle refers to a live item, regardless of which variant it holds.
    #[must_use]
    pub fn is_valid<V>(&self, handle: TypedHandle<U, V>) -> bool {
        self.pool.is_valid(handle.handle)
    }

    /// Whether the handle refers to a live item that currently holds a `V`.
    #[must_use]
    pub fn holds<V>(&self, handle: TypedHandle<U, V>) -> bool
    where
        U: Variant<V>,
    {
        self.get(handle).is_ok()
    }

    /// Drops the item in the handle's slot, whatever variant it holds, and makes the slot
    /// available for reuse. Invalid handles are ignored, as with [`Pool::free()`][crate::Pool::free].
    pub fn free<V>(&mut self, handle: TypedHandle<U, V>) {
        self.pool.free(handle.handle);
    }

    /// Removes the `V` in the handle's slot from the pool and returns it.
    ///
    /// # Errors
    ///
    /// Fails like [`Pool::take()`][crate::Pool::take]. If the slot holds another variant, fails
    /// with [`Error::InvalidVariant`] and leaves the item in the pool.
    pub fn take<V>(&mut self, handle: TypedHandle<U, V>) -> Result<V>
    where
        U: Variant<V>,
    {
        let mismatched = self
            .pool
            .get(handle.handle)
            .ok()
            .filter(|item| item.narrow().is_none());

        if let Some(item) = mismatched {
            return Err(invalid_variant::<U, V>(handle.index(), item));
        }

        let Ok(value) = self.pool.take(handle.handle)?.into_variant() else {
            unreachable!("variant was checked above");
        };

        Ok(value)
    }
}

fn invalid_variant<U: TaggedUnion, V>(index: u32, found: &U) -> Error {
    Error::InvalidVariant {
        index,
        expected: type_name::<V>(),
        found: found.variant_name(),
    }
}

impl<U: TaggedUnion> From<GrowablePool<U>> for TaggedPool<U> {
    /// Wraps an existing pool, for example one created with a custom
    /// [builder][crate::Pool::builder] configuration.
    fn from(pool: GrowablePool<U>) -> Self {
        Self { pool }
    }
}

impl<U: TaggedUnion> fmt::Debug for TaggedPool<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedPool")
            .field("pool", &self.pool)
            .finish()
    }
}

/// A [`Handle`] into a [`TaggedPool`] that accesses its slot as the member type `V`.
///
/// Apart from the type it narrows to, it behaves exactly like a [`Handle`]: it is `Copy`, does
/// not own its item and is checked against the pool on every access.
pub struct TypedHandle<U, V> {
    handle: Handle<U>,

    _variant: PhantomData<fn() -> V>,
}

impl<U, V> TypedHandle<U, V> {
    fn new(handle: Handle<U>) -> Self {
        Self {
            handle,
            _variant: PhantomData,
        }
    }

    /// A handle that refers to nothing.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            handle: Handle::null(),
            _variant: PhantomData,
        }
    }

    /// Whether this is a [null][Self::null] handle.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// The index of the slot this handle refers to.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.handle.index()
    }

    /// A handle to the same slot that accesses it as another member type `W`.
    ///
    /// This changes nothing in the pool; use [`TaggedPool::get_or_default()`] to actually
    /// switch the slot to the new variant.
    #[must_use]
    pub fn retype<W>(self) -> TypedHandle<U, W> {
        TypedHandle::new(self.handle)
    }

    /// The untyped handle to the slot.
    #[must_use]
    pub fn erase(self) -> Handle<U> {
        self.handle
    }
}

impl<U, V> Clone for TypedHandle<U, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U, V> Copy for TypedHandle<U, V> {}

impl<U, V> PartialEq for TypedHandle<U, V> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<U, V> Eq for TypedHandle<U, V> {}

impl<U, V> Hash for TypedHandle<U, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl<U, V> Default for TypedHandle<U, V> {
    fn default() -> Self {
        Self::null()
    }
}

impl<U, V> fmt::Debug for TypedHandle<U, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedHandle")
            .field("variant_type", &format_args!("{}", type_name::<V>()))
            .field("handle", &self.handle)
            .finish()
    }
}
