/// Crate-wide result type.
///
/// Typed failures are `SbomError` values carried inside `anyhow::Error`;
/// use `shared::error::category_of` to recover the category at the boundary.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
