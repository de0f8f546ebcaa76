pub(crate) mod common;

mod bulk;
mod service;
