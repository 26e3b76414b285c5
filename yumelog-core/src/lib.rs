//! # Yumelog Core Library
//!
//! Domain core for the yumelog dream diary: dream and tag persistence,
//! phonetic tag indexing, multi-keyword and tag-intersection search, tag
//! frequency analysis, and overflow fragment sampling.
//!
//! HTTP routing, session authentication, and rendering live in the calling
//! layer; this crate takes a user id the caller has already authenticated
//! and returns plain data results.

pub mod config;
pub mod db;
pub mod diary;
pub mod error;
pub mod frequency;
pub mod overflow;
pub mod pagination;
pub mod reconcile;
pub mod sanitize;
pub mod search;
pub mod yomi;

pub use db::models::{
    Dream, DreamDraft, DreamWithTags, EmotionColor, Tag, TagCategory, TagDescriptor, User,
    YomiIndex,
};
pub use error::{Error, Result};
pub use pagination::Page;
