//! Functional programming utilities

/// This functions return `err` if `predicate` is true, otherwise `Ok(())`
pub fn when<W: FnOnce() -> Result<(), E>, E>(predicate: bool, err: W) -> Result<(), E> {
    if predicate {
        err()
    } else {
        Ok(())
    }
}
