//! Pipeline stages shared by every generation task.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped (a fake gateway, a fake extractor) without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ [extract] ──▶ prompts ──▶ gateway ──▶ validate
//! (checks)   (pdfium)     (messages)  (HTTP)      (parse + repair)
//! ```
//!
//! 1. [`input`]: reject empty text and non-PDF uploads before any work.
//! 2. [`extract`]: PDF bytes to plain text, in `spawn_blocking`.
//! 3. [`crate::prompts`]: build the role-tagged messages for the task.
//! 4. [`gateway`]: the single chat-completion call; the only stage with
//!    network I/O.
//! 5. [`validate`]: parse the model text once, then apply the task's
//!    structural repairs.

pub mod extract;
pub mod gateway;
pub mod input;
pub mod validate;
