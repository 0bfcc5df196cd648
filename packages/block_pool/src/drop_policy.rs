/// Determines what happens to items still in a pool when the pool is dropped.
///
/// By default, the pool drops its remaining items along with itself.
///
/// # Examples
///
/// ```
/// use block_pool::{DropPolicy, FixedPool};
/// use new_zealand::nz;
///
/// // The drop policy is set at pool creation time.
/// let pool = FixedPool::<u32>::builder()
///     .capacity(nz!(16))
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build()?;
/// # Ok::<(), block_pool::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool will drop its items when the pool is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The pool will panic if it still contains items when it is dropped.
    ///
    /// Use this to catch leaks in code that is expected to free every allocation it makes,
    /// for example when handles are stored in data structures whose teardown order matters.
    MustNotDropItems,
}
