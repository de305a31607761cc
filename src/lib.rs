pub mod artist;
pub mod choices;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod form;
pub mod listing;
pub mod normalization;
pub mod routes;
pub mod schedule;
pub mod show;
pub mod times;
pub mod urls;
pub mod venue;

/// The primary key of venues, artists and shows.
pub type Id = i32;
