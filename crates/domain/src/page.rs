use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{InvalidEnumValue, parse_enum};

#[derive(
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

#[derive(
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum OrderBy {
    #[default]
    Id,
    Name,
    EquipmentName,
}

/// Only constructed through [`PageRequest::new`], so page and page size are
/// always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    page: usize,
    page_size: usize,
    pub direction: Direction,
    pub order_by: OrderBy,
}

impl PageRequest {
    pub const DEFAULT_PAGE: usize = 1;
    pub const DEFAULT_PAGE_SIZE: usize = 25;
    pub const MAX_PAGE_SIZE: usize = 25;

    pub fn new(
        page: Option<usize>,
        page_size: Option<usize>,
        direction: Option<&str>,
        order_by: Option<&str>,
    ) -> Result<Self, PageRequestError> {
        let page = page.unwrap_or(Self::DEFAULT_PAGE);

        if page < 1 {
            return Err(PageRequestError::Page(page));
        }

        let page_size = page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);

        if !(1..=Self::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(PageRequestError::PageSize(page_size));
        }

        Ok(Self {
            page,
            page_size,
            direction: direction.map(parse_enum).transpose()?.unwrap_or_default(),
            order_by: order_by.map(parse_enum).transpose()?.unwrap_or_default(),
        })
    }

    pub fn ensure_order_by(&self, allowed: &[OrderBy]) -> Result<(), PageRequestError> {
        if allowed.contains(&self.order_by) {
            Ok(())
        } else {
            Err(PageRequestError::OrderBy(self.order_by))
        }
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the first item on the page, `None` if it is not addressable.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.page.checked_sub(1)?.checked_mul(self.page_size)
    }

    /// Cuts the requested page out of `items`, which must already be ordered.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total_elements = items.len();
        let data = items
            .into_iter()
            .skip(self.offset().unwrap_or(usize::MAX))
            .take(self.page_size)
            .collect();
        Page {
            data,
            page_info: PageInfo {
                size: self.page_size,
                total_elements,
                total_pages: total_elements.div_ceil(self.page_size),
                number: self.page.saturating_sub(1),
            },
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
            direction: Direction::default(),
            order_by: OrderBy::default(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PageRequestError {
    #[error("Page must be 1 or greater ({0} < 1)")]
    Page(usize),
    #[error("Page size must be between 1 and {max} ({0})", max = PageRequest::MAX_PAGE_SIZE)]
    PageSize(usize),
    #[error("Ordering by {0} is not supported")]
    OrderBy(OrderBy),
    #[error(transparent)]
    InvalidValue(#[from] InvalidEnumValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
    /// 0-based page number.
    pub number: usize,
}
