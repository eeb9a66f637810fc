pub mod collection;
pub mod content;
pub mod site_setting;
pub mod submission;
pub mod user;
