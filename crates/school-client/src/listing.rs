//! Client-side search and pagination over rows that are already loaded.

use crate::models::{Application, BlogPost, Course, Review, User};

/// Text fields a row can be found by.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.username.as_str(),
            self.email.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
        ];
        fields.extend(self.contact_phone());
        fields
    }
}

impl Searchable for Course {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

impl Searchable for Application {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.phone.as_str(),
            self.subject.as_str(),
            self.comment.as_str(),
        ]
    }
}

impl Searchable for Review {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.author.as_str(), self.text.as_str()]
    }
}

impl Searchable for BlogPost {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.excerpt.as_str()];
        fields.extend(self.category_name.as_deref());
        fields
    }
}

/// Rows where any field contains `term`, ignoring case. A blank term keeps everything.
pub fn search<'a, T: Searchable>(rows: &'a [T], term: &str) -> Vec<&'a T> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| {
            row.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

/// One page of a loaded list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a, T> {
    pub items: &'a [T],
    /// 1-based, clamped into range.
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl<T> PageSlice<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Cut `rows` into pages of `per_page`. Out-of-range pages snap to the
/// nearest valid one; an empty list still has one (empty) page.
pub fn paginate<T>(rows: &[T], page: usize, per_page: usize) -> PageSlice<'_, T> {
    let per_page = per_page.max(1);
    let total = rows.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);

    PageSlice {
        items: &rows[start..end],
        page,
        per_page,
        total_pages,
        total,
    }
}
