#![allow(dead_code, unused_imports)]

pub use sitewatch_test_utils::{builders, fakes, init_tracing, wait_until, with_timeout};
