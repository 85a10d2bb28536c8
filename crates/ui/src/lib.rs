pub mod app;
mod composer;
mod layout;
mod lesson_view;
mod theme;
