//! Incremental differential redisplay (§4.5): the concrete [`Redisplay`]
//! collaborator `core-model::EditorCore` drives after every widget
//! dispatch.
//!
//! Unlike the teacher's original full-screen multi-view `RenderEngine` —
//! which owned an absolute `Frame` grid and assumed it could address any
//! screen cell — a readline-style prompt lives inline in a scrolling
//! terminal: it only ever knows its position *relative* to where the
//! prompt started. [`display::Display`] tracks that relative cursor and
//! emits the diff between the previous and current wrapped prompt+buffer
//! text, following the algorithm in §4.5 (common-prefix/suffix line diff,
//! insert/delete-character capability use, last-column wrap resync).

pub mod display;
pub mod writer;

pub use display::Display;
