use crate::error::Result;
use crate::models::{Card, Category, Color};

/// Lookup interface for authoritative card data.
///
/// Implementations return fully resolved cards (`is_resolved == true`). A
/// name that simply does not exist is `Ok(None)` / absent from the batch, not
/// an error; errors mean the source itself failed.
pub trait CardSource: Send {
    fn lookup_by_name(&self, name: &str) -> Result<Option<Card>>;

    /// Look up several names in one request. `names.len()` never exceeds
    /// [`batch_limit`](Self::batch_limit).
    fn lookup_batch(&self, names: &[String]) -> Result<Vec<Card>>;

    fn search_by_query(&self, query: &str) -> Result<Vec<Card>>;

    /// Candidates for an open `category` slot in a deck of `identity`.
    ///
    /// The default searches for [`Category::search_term`] and leaves identity
    /// filtering to the caller. Roles without a term yield nothing.
    fn search_category(&self, category: Category, _identity: &[Color]) -> Result<Vec<Card>> {
        match category.search_term() {
            Some(term) => self.search_by_query(term),
            None => Ok(Vec::new()),
        }
    }

    /// Largest batch the source accepts per request.
    fn batch_limit(&self) -> usize {
        crate::config::BATCH_LIMIT
    }
}
