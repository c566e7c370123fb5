//!  Storage is organized through [entry_store::JsonEntryStore] and
//!  [session_store::SessionStore]. The basic idea is:
//!   - There is a directory with all the application data.
//!   - The entry list lives in one JSON file and is read and replaced wholesale.
//!   - The running timer session lives in its own file so it survives between
//!     CLI invocations.

pub mod entities;
pub mod entry_store;
pub mod session_store;
