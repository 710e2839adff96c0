//! # vin-editor: editor core for vin
//!
//! Everything that knows what a document, a cursor or a keystroke means.
//! Nothing here touches the terminal directly; [`vin_term`] supplies the
//! byte source and the escape encoders, and the binary owns the session.
//!
//! - **[`buffer`]**: `Row` and `Document`, the line buffer with tab rendering
//! - **[`cursor`]**: clamped buffer position and its motions
//! - **[`mode`]**: `Normal`, `Insert`, `CommandLine`
//! - **[`key`]**: the modal key decoder, bytes to `Action`s
//! - **[`search`]**: literal search and the cyclic match cache
//! - **[`prompt`]**: save-as and search input on the message bar
//! - **[`view`]**: scrolling and whole-frame rendering
//! - **[`options`]**: tunables and the TOML config file
//! - **[`store`]**: reading and writing documents
//! - **[`editor`]**: the controller tying it all together

pub mod buffer;
pub mod cursor;
pub mod editor;
pub mod key;
pub mod mode;
pub mod options;
pub mod prompt;
pub mod search;
pub mod store;
pub mod view;
