pub mod ppdb;
