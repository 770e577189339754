//! The public verbs, one per file, composing schema cache, index
//! manager, key codec, and chunked I/O into end-to-end flows.

mod create;
mod delete;
mod find_all;
mod find_many;
mod find_one;
mod purge;
mod restore;
mod update;
