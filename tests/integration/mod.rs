//! Integration tests against a mock backend and on-disk session records

mod config_test;
mod router_test;
mod session_test;
