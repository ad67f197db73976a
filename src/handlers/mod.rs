pub mod admin;
pub mod auth;
pub mod categories;
pub mod contact;
pub mod galleries;
pub mod health;
pub mod images;
pub mod settings;
pub mod site;
