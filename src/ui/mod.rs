mod coverage;
mod dashboard;
mod detail_panel;
mod issue_list;
mod layout;
mod notifications;
mod package_list;
mod search_box;
mod status_bar;
pub mod theme;

pub use layout::draw;
