// src/session/mod.rs

//! Interactive execution of a [`Script`](crate::script::Script): one command
//! at a time, with the ability to step back.

mod runner;

pub use runner::Session;
