//! The navigation menu and the dispatch from a menu entry to the page that handles it
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

pub const NOT_IMPLEMENTED_MESSAGE: &str = "Upload UI for this table is not yet implemented.";

/// The tables listed in the navigation menu. The string form is the url slug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter, Serialize)]
#[strum(serialize_all = "kebab-case")]
pub enum TablePage {
    #[default]
    Location,
    RockUnits,
    Measurements,
    Samples,
}

/// The result of selecting an entry in the navigation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRoute {
    Location,
    NotImplemented(TablePage),
}

impl TablePage {
    pub fn label(&self) -> &'static str {
        match self {
            TablePage::Location => "Location",
            TablePage::RockUnits => "Rock Units",
            TablePage::Measurements => "Measurements",
            TablePage::Samples => "Samples",
        }
    }

    pub fn route(&self) -> PageRoute {
        match self {
            TablePage::Location => PageRoute::Location,
            other => PageRoute::NotImplemented(*other),
        }
    }
}

/// A single entry in the navigation menu
#[derive(Debug, Serialize)]
pub struct MenuEntry {
    pub label: &'static str,
    pub slug: String,
    pub selected: bool,
}

/// A utility function for creating the navigation menu with `selected` highlighted
pub fn menu(selected: TablePage) -> Vec<MenuEntry> {
    TablePage::iter()
        .map(|page| MenuEntry {
            label: page.label(),
            slug: page.to_string(),
            selected: page == selected,
        })
        .collect()
}
