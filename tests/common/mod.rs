#![allow(dead_code)]

pub mod gguf;
