//! Site chrome operations (`graphql/site.graphql`).

use serde::{Deserialize, Serialize};

use super::{Nodes, graphql_operation};

const DOCUMENT: &str = include_str!("../../../graphql/site.graphql");

graphql_operation!(GetMenu, get_menu, DOCUMENT);
graphql_operation!(GetSiteSettings, get_site_settings, DOCUMENT);

pub mod get_menu {
    use super::{Deserialize, Nodes, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        /// `MenuLocationEnum` value, e.g. `PRIMARY`.
        pub location: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub menu_items: Option<Nodes<MenuItem>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MenuItem {
        pub database_id: i32,
        pub parent_database_id: Option<i32>,
        pub label: Option<String>,
        pub url: Option<String>,
        pub path: Option<String>,
        pub order: Option<i32>,
    }
}

pub mod get_site_settings {
    use super::Deserialize;

    pub type Variables = super::super::NoVariables;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub general_settings: Option<GeneralSettings>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct GeneralSettings {
        pub title: Option<String>,
        pub description: Option<String>,
    }
}
