pub mod arrivals;
pub mod config;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod present;
pub mod rank;
pub mod web;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
