/// UI module exports
mod bridge;
mod components;
mod editor;
mod snippet_form;
mod snippet_list;

pub mod popup;
