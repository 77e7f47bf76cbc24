#![cfg(feature = "test-support")]

mod chat_flow_test;
mod common;
mod scroll_mouse_test;
