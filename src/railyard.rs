//! Main module for railyard library functionality

pub mod ast;
pub mod config;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod lexing;
pub mod parsing;
pub mod testing;
pub mod token;
