use super::error::DomainError;

/// A validated `page`/`limit` pair. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub(crate) fn new(page: i64, limit: i64) -> Result<Self, DomainError> {
        let page = positive("page", page)?;
        let limit = positive("limit", limit)?;
        Ok(Self { page, limit })
    }

    pub(crate) fn page(&self) -> u64 {
        self.page
    }

    pub(crate) fn limit(&self) -> u64 {
        self.limit
    }

    /// Start of the `[(page - 1) * limit, page * limit)` window.
    pub(crate) fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub(crate) fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.limit)
    }

    /// Cuts this page out of an already ordered sequence.
    pub(crate) fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

fn positive(field: &'static str, value: i64) -> Result<u64, DomainError> {
    if value < 1 {
        return Err(DomainError::Validation {
            field,
            message: "must be a positive integer",
        });
    }
    Ok(value as u64)
}
