//! Category listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Chrome;
use crate::state::AppState;
use crate::woo::Category;

/// A top-level category with its children.
#[derive(Clone)]
pub struct CategoryGroup {
    pub category: Category,
    pub children: Vec<Category>,
}

/// Group categories under their parents. Orphans (whose parent is empty and
/// so not returned) are listed as top-level.
fn group_categories(categories: Vec<Category>) -> Vec<CategoryGroup> {
    let (roots, children): (Vec<_>, Vec<_>) = categories.into_iter().partition(|c| {
        c.parent_id.is_none()
    });

    let mut groups: Vec<CategoryGroup> = roots
        .into_iter()
        .map(|category| CategoryGroup {
            category,
            children: Vec::new(),
        })
        .collect();

    for child in children {
        match groups
            .iter_mut()
            .find(|g| Some(g.category.id) == child.parent_id)
        {
            Some(group) => group.children.push(child),
            None => groups.push(CategoryGroup {
                category: child,
                children: Vec::new(),
            }),
        }
    }

    groups
}

/// Categories page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/categories.html")]
pub struct CategoriesTemplate {
    pub chrome: Chrome,
    pub groups: Vec<CategoryGroup>,
}

/// Display all categories.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, chrome: Chrome) -> Result<CategoriesTemplate> {
    let categories = state.woo().get_categories().await?;
    Ok(CategoriesTemplate {
        chrome,
        groups: group_categories(categories),
    })
}

#[cfg(test)]
mod tests {
    use woo_headless_core::CategoryId;

    use super::*;

    fn category(id: i32, parent: Option<i32>) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("Category {id}"),
            slug: format!("category-{id}"),
            description: String::new(),
            count: 1,
            parent_id: parent.map(CategoryId::new),
            image: None,
        }
    }

    #[test]
    fn test_children_grouped_under_parent() {
        let groups = group_categories(vec![
            category(1, None),
            category(2, Some(1)),
            category(3, None),
            category(4, Some(99)),
        ]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category.id, CategoryId::new(1));
        assert_eq!(groups[0].children.len(), 1);
        assert!(groups[1].children.is_empty());
        assert_eq!(groups[2].category.id, CategoryId::new(4));
    }
}
