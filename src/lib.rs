//! Cross-reference resolution and multi-syntax signature rendering for
//! generated API documentation.
//!
//! Targets (descriptions of documented symbols) live in [`store`]s federated
//! by a [`collection::TargetCollection`]. [`identifier::create_reference`]
//! turns a documentation id into a [`reference::Reference`], and
//! [`render::Renderer`] writes its signature in every configured syntax
//! profile at once. [`links::ExternalLinks`] maps ids to external URLs.

pub mod codec;
pub mod collection;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod identifier;
mod info;
pub mod links;
pub mod loader;
pub mod online;
pub mod reference;
pub mod render;
pub mod store;
pub mod target;
