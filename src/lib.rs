pub mod answer;
pub mod ask_client;
pub mod config;
pub mod facts;
pub mod html;
pub mod http_client;
pub mod state;
pub mod telemetry;
pub mod worker;
