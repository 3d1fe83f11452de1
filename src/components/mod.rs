pub mod add_item;
pub mod delete_confirm;
pub mod editable_field;
pub mod editable_tags;
pub mod hooks;
pub mod tag_input;
pub mod ui;
