//! Typed shapes for SharePoint REST resources.

pub mod custom_action;

pub use custom_action::{
    ActionRights, ActionScope, CustomAction, CustomActionCollection, CustomActionElements,
};
